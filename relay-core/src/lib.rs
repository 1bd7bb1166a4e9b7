//! # relay-core
//!
//! Core types and traits for the relay bot: the operator-facing [`Bot`], the watched
//! [`MonitoredAccount`] and its [`AccountConnector`], [`Handler`], message and user types,
//! errors and tracing initialization. Transport-agnostic; used by handler-chain, relay-telegram
//! and relay-bot.

pub mod account;
pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use account::{
    AccountConnector, BotIdentity, ForwardSource, InboundUpdate, LinkedAccount, MonitoredAccount,
    PollRequest,
};
pub use bot::Bot;
pub use error::{HandlerError, RelayError, Result};
pub use logger::init_tracing;
pub use types::{
    Chat, Handler, HandlerResponse, Message, MessageKind, ToCoreMessage, ToCoreUser, User,
};
