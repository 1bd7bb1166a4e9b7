//! Monitored account abstraction.
//!
//! The monitored account is the bot whose inbound messages get relayed. [`AccountConnector`]
//! turns a candidate credential into a [`LinkedAccount`]; [`MonitoredAccount`] exposes the
//! three platform calls the relay needs afterwards (probe send, long-poll, forward).

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Display metadata of a monitored bot, fetched once at validation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

impl BotIdentity {
    /// Username without the leading `@`; empty when the platform returned none.
    pub fn username_or_empty(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }
}

/// Where a relayed message came from: enough to ask the platform to forward it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForwardSource {
    pub chat_id: i64,
    pub message_id: i32,
    pub sender_id: Option<i64>,
}

/// One update returned by a poll. `message` is `None` for update kinds that carry no message
/// (edits, callback queries, ...); those still advance the cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    pub update_id: i64,
    pub message: Option<ForwardSource>,
}

/// Parameters of one long-poll call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollRequest {
    /// First update id to return; negative values count back from the newest pending update.
    pub offset: i64,
    pub timeout_secs: u32,
    pub limit: u8,
}

impl PollRequest {
    /// Request for the single newest pending update, without waiting.
    pub fn latest() -> Self {
        Self {
            offset: -1,
            timeout_secs: 0,
            limit: 1,
        }
    }
}

/// Platform calls made through the monitored account's own credential.
#[async_trait]
pub trait MonitoredAccount: Send + Sync {
    /// Sends a text message to `chat_id` (used once, as the reachability probe).
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Long-polls for updates. Updates come back in non-decreasing id order.
    async fn get_updates(&self, request: PollRequest) -> Result<Vec<InboundUpdate>>;

    /// Forwards the source message to `to_chat_id`, preserving sender attribution.
    async fn forward_message(&self, to_chat_id: i64, source: &ForwardSource) -> Result<()>;
}

/// Authenticated handle plus cached identity.
#[derive(Clone)]
pub struct LinkedAccount {
    pub account: Arc<dyn MonitoredAccount>,
    pub identity: BotIdentity,
}

impl fmt::Debug for LinkedAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedAccount")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Validates candidate credentials.
#[async_trait]
pub trait AccountConnector: Send + Sync {
    /// Builds a handle for `credential` and fetches its identity. Platform rejections surface as
    /// [`crate::RelayError::Platform`].
    async fn connect(&self, credential: &str) -> Result<LinkedAccount>;
}
