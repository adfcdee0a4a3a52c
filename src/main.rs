use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use carpricer::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = cli::Cli::parse();

    // Initialize tracing/logging early
    init_tracing();

    // Dispatch to appropriate command handler
    match args.get_command() {
        cli::Commands::Start { host, port } => {
            commands::start::execute(&args.config, host, port).await?;
        }
        cli::Commands::Predict { input, currency } => {
            commands::predict::execute(&args.config, &input, &currency).await?;
        }
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Version => {
            println!("carpricer v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
