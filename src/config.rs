use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub rates: RatesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    /// Path to the serialized model artifact, loaded read-only at startup
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RatesConfig {
    /// Fetch live rates; when false the static fallback table is used
    #[serde(default = "default_true")]
    pub refresh: bool,
    #[serde(default = "default_rates_url")]
    pub url: String,
    /// Seconds between refreshes
    #[serde(default = "default_rates_ttl")]
    pub ttl_seconds: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_model_path() -> PathBuf {
    PathBuf::from("model/price_model.json")
}

fn default_true() -> bool {
    true
}

fn default_rates_url() -> String {
    "https://open.er-api.com/v6/latest/USD".to_string()
}

fn default_rates_ttl() -> u64 {
    3600
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            refresh: default_true(),
            url: default_rates_url(),
            ttl_seconds: default_rates_ttl(),
        }
    }
}

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("CARPRICER").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.host.parse::<std::net::IpAddr>().is_err() {
        anyhow::bail!("server.host is not a valid IP address: {}", cfg.server.host);
    }

    if cfg.model.path.as_os_str().is_empty() {
        anyhow::bail!("model.path cannot be empty");
    }

    if cfg.rates.refresh {
        if cfg.rates.url.is_empty() {
            anyhow::bail!("rates.url cannot be empty when rates.refresh is enabled");
        }
        if cfg.rates.ttl_seconds < 60 {
            anyhow::bail!(
                "rates.ttl_seconds must be at least 60, got {}",
                cfg.rates.ttl_seconds
            );
        }
    }

    Ok(())
}
