use anyhow::Result;
use colored::Colorize;
use carpricer::{config, server};
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// This will:
/// 1. Load configuration
/// 2. Apply CLI host/port overrides
/// 3. Start the server (blocks until shutdown)
pub async fn execute(config_path: &Path, host: Option<String>, port: Option<u16>) -> Result<()> {
    println!("{}", "Starting carpricer...".green());

    let mut cfg = config::load_config(config_path)?;

    if let Some(host) = host {
        cfg.server.host = host;
    }
    if let Some(port) = port {
        cfg.server.port = port;
    }

    info!("Starting price predictor server");

    server::start_server(cfg).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    // Note: Full integration testing of the start command requires
    // actual server startup and is better suited for integration tests
}
