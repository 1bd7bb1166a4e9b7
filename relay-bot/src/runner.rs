use anyhow::Result;
use relay_core::init_tracing;
use relay_telegram::run_repl;
use std::sync::Arc;
use tracing::{info, instrument};

use crate::components::{build_bot_components, build_handler_chain};
use crate::config::BotConfig;
use crate::handlers::SetupHandler;

/// Main entry: validate config, init logging, build components, run the REPL until Ctrl-C,
/// then halt any running forwarding loop.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    init_tracing(config.log_file())?;

    info!(
        log_file = %config.log_file(),
        allowlist = config.allowed_users().len(),
        "Initializing relay bot"
    );

    let components = build_bot_components(&config)?;
    let setup = Arc::new(SetupHandler::new(
        components.operator_bot.clone(),
        components.connector.clone(),
        components.forwarder.clone(),
    ));
    let handler_chain = build_handler_chain(&config, setup.clone());

    info!("Bot started successfully");
    run_repl(components.teloxide_bot.clone(), handler_chain).await?;

    setup.shutdown().await;
    info!("Relay bot stopped");
    Ok(())
}
