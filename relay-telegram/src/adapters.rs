//! Adapters from Telegram (teloxide) types to relay_core types.

use relay_core::{Chat, Message, MessageKind, ToCoreMessage, ToCoreUser, User};

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
        }
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`]. Channel posts and other
/// sender-less messages map to user id 0.
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        let text = self.0.text();
        Message {
            id: self.0.id.to_string(),
            user: self
                .0
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or(User {
                    id: 0,
                    username: None,
                }),
            chat: Chat {
                id: self.0.chat.id.0,
            },
            content: text.unwrap_or_default().to_string(),
            kind: if text.is_some() {
                MessageKind::Text
            } else {
                MessageKind::Other
            },
        }
    }
}
