//! # relay-telegram
//!
//! Telegram layer of the relay: adapters from teloxide types, the operator-facing
//! [`relay_core::Bot`] implementation, the monitored-account implementation
//! ([`TelegramAccount`], [`TelegramConnector`]), minimal config and the REPL runner.
//! No setup or forwarding logic lives here.

mod account;
mod adapters;
mod bot_adapter;
mod config;
mod runner;

pub use account::{is_plausible_token, TelegramAccount, TelegramConnector};
pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use config::{TelegramConfig, DEFAULT_REQUEST_TIMEOUT};
pub use runner::run_repl;
