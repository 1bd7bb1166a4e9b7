//! Monitored account over the Telegram Bot API: [`TelegramConnector`] validates a token via
//! getMe, [`TelegramAccount`] wraps the resulting teloxide::Bot for probe/poll/forward calls.

use async_trait::async_trait;
use relay_core::{
    AccountConnector, BotIdentity, ForwardSource, InboundUpdate, LinkedAccount, MonitoredAccount,
    PollRequest, RelayError, Result,
};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, MessageId, Update, UpdateKind};
use teloxide::RequestError;
use tracing::{debug, instrument, warn};

use crate::config::TelegramConfig;

/// Every teloxide request failure (API rejection, network, bad JSON) is platform-reported.
fn platform_error(err: RequestError) -> RelayError {
    RelayError::Platform(err.to_string())
}

/// Cheap shape check before spending a request: `<digits>:<secret>` with URL-safe characters.
pub fn is_plausible_token(token: &str) -> bool {
    let Some((id, secret)) = token.split_once(':') else {
        return false;
    };
    !id.is_empty()
        && id.chars().all(|c| c.is_ascii_digit())
        && !secret.is_empty()
        && secret
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn inbound_update(update: &Update) -> InboundUpdate {
    let message = match &update.kind {
        UpdateKind::Message(msg) => Some(ForwardSource {
            chat_id: msg.chat.id.0,
            message_id: msg.id.0,
            sender_id: msg.from.as_ref().map(|u| u.id.0 as i64),
        }),
        _ => None,
    };
    InboundUpdate {
        update_id: i64::from(update.id.0),
        message,
    }
}

/// A monitored bot reached through its own token.
pub struct TelegramAccount {
    bot: teloxide::Bot,
}

impl TelegramAccount {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MonitoredAccount for TelegramAccount {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text.to_string())
            .await
            .map_err(platform_error)?;
        Ok(())
    }

    async fn get_updates(&self, request: PollRequest) -> Result<Vec<InboundUpdate>> {
        let offset = i32::try_from(request.offset).map_err(|_| {
            RelayError::Unknown(format!("update offset out of range: {}", request.offset))
        })?;
        let updates = self
            .bot
            .get_updates()
            .offset(offset)
            .timeout(request.timeout_secs)
            .limit(request.limit)
            .await
            .map_err(platform_error)?;
        debug!(offset = offset, count = updates.len(), "Polled monitored account");
        Ok(updates.iter().map(inbound_update).collect())
    }

    async fn forward_message(&self, to_chat_id: i64, source: &ForwardSource) -> Result<()> {
        self.bot
            .forward_message(
                ChatId(to_chat_id),
                ChatId(source.chat_id),
                MessageId(source.message_id),
            )
            .await
            .map_err(platform_error)?;
        Ok(())
    }
}

/// Turns candidate tokens into [`LinkedAccount`]s. Shares one HTTP client across handles.
pub struct TelegramConnector {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramConnector {
    /// Builds a connector using `config`'s API URL and request timeout (its token is unused).
    pub fn new(config: TelegramConfig) -> anyhow::Result<Self> {
        let client = config.http_client()?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl AccountConnector for TelegramConnector {
    #[instrument(skip(self, credential))]
    async fn connect(&self, credential: &str) -> Result<LinkedAccount> {
        let token = credential.trim();
        if !is_plausible_token(token) {
            return Err(RelayError::Credential("malformed bot token".to_string()));
        }

        let bot = self.config.bot_for(token, self.client.clone());
        let me = bot.get_me().await.map_err(|e| {
            warn!(error = %e, "getMe rejected candidate token");
            platform_error(e)
        })?;

        let identity = BotIdentity {
            id: me.user.id.0 as i64,
            first_name: me.user.first_name.clone(),
            username: me.user.username.clone(),
        };
        Ok(LinkedAccount {
            account: Arc::new(TelegramAccount::new(bot)),
            identity,
        })
    }
}
