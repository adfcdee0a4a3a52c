use anyhow::{Context, Result};
use colored::Colorize;
use carpricer::config;
use carpricer::encoder;
use carpricer::models::car::CarSpecification;
use carpricer::predictor::Predictor;
use carpricer::rates::{self, RateProvider, RateTable};
use std::fs;
use std::path::Path;
use tracing::info;

/// Execute the predict command
///
/// Runs the full pipeline once for a car spec file: validate, encode,
/// predict, convert, print. Live rates are fetched best-effort; a fetch
/// failure falls back to the static table.
pub async fn execute(config_path: &Path, input: &Path, currency: &str) -> Result<()> {
    let cfg = config::load_config(config_path)?;

    let predictor = Predictor::load(&cfg.model.path)
        .map_err(|e| anyhow::anyhow!("failed to load model artifact: {}", e))?;

    let raw = fs::read_to_string(input)
        .with_context(|| format!("cannot read car specification {:?}", input))?;
    let car: CarSpecification =
        serde_json::from_str(&raw).with_context(|| format!("invalid car specification {:?}", input))?;

    car.validate()
        .map_err(|errors| anyhow::anyhow!("invalid car specification:\n  {}", errors.join("\n  ")))?;

    let features = encoder::encode(predictor.schema(), &car)?;
    let price_usd = predictor.predict(&features)?;

    let table = if cfg.rates.refresh {
        let provider = RateProvider::new(cfg.rates.url.clone());
        match provider.fetch().await {
            Ok(live) => RateTable::live(live),
            Err(e) => {
                eprintln!(
                    "{}",
                    format!("Rate fetch failed ({}), using fallback rates", e).yellow()
                );
                RateTable::fallback()
            }
        }
    } else {
        RateTable::fallback()
    };

    let price = table.convert(price_usd, currency)?;

    info!(
        input = %input.display(),
        currency = currency,
        price_usd,
        price,
        "One-shot prediction complete"
    );

    println!();
    println!(
        "{} {}",
        "Predicted price:".bold(),
        rates::display_price(price, currency).green().bold()
    );
    if currency != "USD" {
        println!("  (USD: {})", rates::display_price(price_usd, "USD"));
    }

    Ok(())
}
