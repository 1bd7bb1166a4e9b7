//! relay-bot binary: loads `.env`, parses the CLI and runs the main bot until Ctrl-C.

use anyhow::Result;
use clap::Parser;
use relay_bot::{load_config, run_bot, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => {
            let config = load_config(token)?;
            run_bot(config).await
        }
    }
}
