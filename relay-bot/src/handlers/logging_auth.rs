//! Operator message logging and the optional operator allowlist.

use async_trait::async_trait;
use relay_core::{Handler, HandlerError, HandlerResponse, Message, Result};
use tracing::{debug, info, instrument, warn};

/// Logs every operator message in before() and the outcome in after(); never stops the chain.
pub struct LoggingHandler;

#[async_trait]
impl Handler for LoggingHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            username = %message.user.username.as_deref().unwrap_or("unknown"),
            kind = %message.kind.as_str(),
            "Operator message"
        );
        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        match response {
            HandlerResponse::Reply(text) => debug!(
                message_id = %message.id,
                reply_len = text.len(),
                "Answered operator"
            ),
            other => debug!(message_id = %message.id, response = ?other, "No reply"),
        }
        Ok(())
    }
}

/// Rejects operators whose user id is not allowlisted. An empty list lets everyone through.
pub struct AuthHandler {
    allowed_users: Vec<i64>,
}

impl AuthHandler {
    pub fn new(allowed_users: Vec<i64>) -> Self {
        Self { allowed_users }
    }

    pub fn is_allowed(&self, user_id: i64) -> bool {
        self.allowed_users.is_empty() || self.allowed_users.contains(&user_id)
    }
}

#[async_trait]
impl Handler for AuthHandler {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        let user_id = message.user.id;
        if self.is_allowed(user_id) {
            Ok(true)
        } else {
            warn!(user_id = user_id, "Operator not in ALLOWED_USERS");
            Err(HandlerError::Unauthorized.into())
        }
    }
}
