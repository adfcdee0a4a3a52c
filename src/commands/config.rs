use anyhow::Result;
use colored::Colorize;
use carpricer::config;
use carpricer::predictor::Predictor;
use std::path::Path;
use tracing::info;

/// Execute the config show command
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;

    println!("{}", "Current Configuration:".green().bold());
    println!();

    // Serialize to TOML format
    let toml_string = toml::to_string_pretty(&cfg)?;
    println!("{}", toml_string);

    Ok(())
}

/// Execute the config validate command
///
/// Validates the configuration file and verifies that the model artifact
/// it points at actually loads.
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!("Validating configuration file");

    let cfg = config::load_config(config_path)?;
    let predictor = Predictor::load(&cfg.model.path)
        .map_err(|e| anyhow::anyhow!("model artifact check failed: {}", e))?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!(
        "  {}: {}:{}",
        "Server".cyan(),
        cfg.server.host,
        cfg.server.port
    );
    println!(
        "  {}: {} ({} v{}, {} feature slots)",
        "Model".cyan(),
        cfg.model.path.display(),
        predictor.name(),
        predictor.version(),
        predictor.feature_width()
    );
    let refresh = if cfg.rates.refresh {
        format!("every {}s from {}", cfg.rates.ttl_seconds, cfg.rates.url)
    } else {
        "disabled (static fallback table)".to_string()
    };
    println!("  {}: {}", "Rate refresh".cyan(), refresh);

    info!("Configuration validation successful");
    Ok(())
}
