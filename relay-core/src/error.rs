use thiserror::Error;

/// Top-level error for the relay: platform API, operator transport, handlers.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Reported by the messaging platform (API rejection, network failure, bad response).
    #[error("Platform error: {0}")]
    Platform(String),

    /// Credential rejected before reaching the platform (empty or malformed).
    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Handler error: {0}")]
    Handler(#[from] HandlerError),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl RelayError {
    /// True for errors the platform itself reported; everything else is unexpected.
    pub fn is_platform(&self) -> bool {
        matches!(self, RelayError::Platform(_))
    }
}

/// Errors produced by handlers in the chain.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Unauthorized access")]
    Unauthorized,

    #[error("State error: {0}")]
    State(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;
