//! Wraps teloxide::Bot and implements [`relay_core::Bot`] for the operator conversation.
//! Tests substitute a recording Bot instead.

use async_trait::async_trait;
use relay_core::{Bot as CoreBot, Chat, RelayError, Result};
use teloxide::{prelude::*, types::ChatId};

/// Thin wrapper around the main teloxide::Bot.
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(|e| RelayError::Bot(e.to_string()))?;
        Ok(())
    }
}
