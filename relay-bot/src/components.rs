//! Component factory: builds BotComponents from config. Isolates assembly logic from runner.

use anyhow::Result;
use handler_chain::HandlerChain;
use relay_core::{AccountConnector, Bot as CoreBot};
use relay_telegram::{TelegramBotAdapter, TelegramConnector};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::config::BotConfig;
use crate::forwarder::Forwarder;
use crate::handlers::{AuthHandler, LoggingHandler, SetupHandler};

/// Everything the runner needs besides the chain itself.
pub struct BotComponents {
    /// Main bot, driven by the REPL.
    pub teloxide_bot: teloxide::Bot,
    /// Main bot as seen by handlers (replies to the operator).
    pub operator_bot: Arc<dyn CoreBot>,
    /// Validates monitored-bot tokens against the same API URL as the main bot.
    pub connector: Arc<dyn AccountConnector>,
    pub forwarder: Forwarder,
}

#[instrument(skip(config))]
pub fn build_bot_components(config: &BotConfig) -> Result<BotComponents> {
    let telegram = config.telegram()?;
    let teloxide_bot = telegram.build_bot()?;
    let operator_bot: Arc<dyn CoreBot> = Arc::new(TelegramBotAdapter::new(teloxide_bot.clone()));
    let connector: Arc<dyn AccountConnector> = Arc::new(TelegramConnector::new(telegram)?);
    let forwarder = Forwarder::new(config.forwarding().clone());

    info!(
        api_url = %teloxide_bot.api_url(),
        poll_timeout_secs = config.forwarding().poll_timeout_secs,
        batch_limit = config.forwarding().batch_limit,
        "Bot components built"
    );

    Ok(BotComponents {
        teloxide_bot,
        operator_bot,
        connector,
        forwarder,
    })
}

/// Logging → (Auth, only when ALLOWED_USERS is set) → Setup.
pub fn build_handler_chain(config: &BotConfig, setup: Arc<SetupHandler>) -> HandlerChain {
    let mut chain = HandlerChain::new().add_handler(Arc::new(LoggingHandler));
    if !config.allowed_users().is_empty() {
        info!(count = config.allowed_users().len(), "Operator allowlist enabled");
        chain = chain.add_handler(Arc::new(AuthHandler::new(config.allowed_users().to_vec())));
    }
    chain.add_handler(setup)
}
