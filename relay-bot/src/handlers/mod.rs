//! Handlers of the operator chain: logging, optional allowlist, setup conversation.

mod logging_auth;
mod setup_handler;

pub use logging_auth::{AuthHandler, LoggingHandler};
pub use setup_handler::SetupHandler;
