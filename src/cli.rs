use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "carpricer", version, about = "Used Car Price Predictor")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the web server (default)
    Start {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured bind port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Predict a price for a car spec file without starting the server
    Predict {
        /// Path to a JSON car specification
        #[arg(short, long)]
        input: PathBuf,

        /// Currency to display the price in
        #[arg(long, default_value = "USD")]
        currency: String,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Validate configuration file and model artifact
    Validate,
}

impl Cli {
    /// Get the command to execute, defaulting to Start if none provided
    pub fn get_command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Start {
            host: None,
            port: None,
        })
    }
}
