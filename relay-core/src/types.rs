//! Operator-side types: who wrote, where, what; plus the [`Handler`] hooks the chain drives.

use async_trait::async_trait;

use crate::error::Result;

/// Sender of an operator message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

/// Chat replies go back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chat {
    pub id: i64,
}

/// Whether the controller can read the message at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    /// Stickers, media, service messages: ignored by the controller.
    Other,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Other => "other",
        }
    }
}

/// One operator message as seen by the handler chain. `content` is empty unless `kind` is Text.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    pub content: String,
    pub kind: MessageKind,
}

impl Message {
    pub fn is_text(&self) -> bool {
        self.kind == MessageKind::Text
    }
}

/// Handler result for the chain. `Reply(text)` carries the text sent back to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResponse {
    /// Pass to next handler.
    Continue,
    /// Stop the chain; no response body.
    Stop,
    /// Skip this handler, try next.
    Ignore,
    /// Stop the chain; the handler answered the operator with this text.
    Reply(String),
}

pub trait ToCoreUser: Send + Sync {
    fn to_core(&self) -> User;
}

pub trait ToCoreMessage: Send + Sync {
    fn to_core(&self) -> Message;
}

/// Chain hooks: all `before` → `handle` until Stop/Reply → all `after` in reverse.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Return false to stop the chain.
    async fn before(&self, _message: &Message) -> Result<bool> {
        Ok(true)
    }

    async fn handle(&self, _message: &Message) -> Result<HandlerResponse> {
        Ok(HandlerResponse::Continue)
    }

    /// Sees the response that ended the handle phase.
    async fn after(&self, _message: &Message, _response: &HandlerResponse) -> Result<()> {
        Ok(())
    }
}
