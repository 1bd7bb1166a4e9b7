//! Operator-facing bot abstraction.
//!
//! [`Bot`] is the channel through which the operator converses with the relay (the "main"
//! bot). It is transport-agnostic; relay-telegram implements it via teloxide and tests swap in
//! a recording mock.

use crate::error::Result;
use crate::types::{Chat, Message};
use async_trait::async_trait;

/// Sends replies to the operator. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;

    /// Sends a reply into the chat the given message came from.
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        self.send_message(&message.chat, text).await
    }
}
