//! Operator bot that records replies instead of calling Telegram.

use async_trait::async_trait;
use relay_core::{Bot, Chat, Result};
use std::sync::Mutex;

#[derive(Default)]
pub struct MockBot {
    replies: Mutex<Vec<(i64, String)>>,
}

impl MockBot {
    pub fn replies(&self) -> Vec<String> {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn last_reply(&self) -> Option<String> {
        self.replies.lock().unwrap().last().map(|(_, text)| text.clone())
    }

    pub fn reply_chats(&self) -> Vec<i64> {
        self.replies.lock().unwrap().iter().map(|(chat, _)| *chat).collect()
    }

    pub fn clear(&self) {
        self.replies.lock().unwrap().clear();
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.replies
            .lock()
            .unwrap()
            .push((chat.id, text.to_string()));
        Ok(())
    }
}
