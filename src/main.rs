use clap::Parser;
use swaprouter::cli::{Cli, Commands};
use swaprouter::SwapError;

#[tokio::main]
async fn main() -> Result<(), SwapError> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Load environment configuration
    dotenv::dotenv().ok();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Execute command
    match cli.command {
        Commands::Quote(args) => {
            swaprouter::cli::commands::quote::execute(args).await?;
        }
        Commands::Swap(args) => {
            swaprouter::cli::commands::swap::execute(args).await?;
        }
        Commands::Pools(args) => {
            swaprouter::cli::commands::pools::execute(args).await?;
        }
    }

    Ok(())
}
