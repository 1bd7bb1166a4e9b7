//! # Relay bot application
//!
//! Wires the operator conversation (setup state machine on the main bot) to the forwarding loop
//! (long-polls the monitored bot and forwards every inbound message to one recipient).
//! Core types come from relay-core, the chain from handler-chain, Telegram I/O from relay-telegram.

pub mod cli;
pub mod components;
pub mod config;
pub mod forwarder;
pub mod handlers;
pub mod replies;
pub mod runner;
pub mod session;

pub use cli::{load_config, Cli, Commands};
pub use components::{build_bot_components, build_handler_chain, BotComponents};
pub use config::{BaseConfig, BotConfig, ForwardingConfig};
pub use forwarder::{relay_message, Forwarder, ForwardingHandle, ForwardingStatus};
pub use handlers::{AuthHandler, LoggingHandler, SetupHandler};
pub use runner::run_bot;
pub use session::{Session, SetupState};
