//! Minimal Telegram connectivity config: token, optional API URL, HTTP request timeout.
//! Shared by the main bot and every monitored-account handle so both honour the same API URL.

use anyhow::{Context, Result};
use reqwest::Url;
use std::time::Duration;

/// Default per-request HTTP timeout. Must exceed the long-poll timeout, otherwise a quiet
/// getUpdates call is cut off by the client before Telegram answers.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(45);

/// Telegram connectivity settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub api_url: Option<Url>,
    pub request_timeout: Duration,
}

impl TelegramConfig {
    /// Builds config with the given token, the public API and the default timeout.
    pub fn with_token(bot_token: String) -> Self {
        Self {
            bot_token,
            api_url: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_api_url(mut self, api_url: Option<Url>) -> Self {
        self.api_url = api_url;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// HTTP client with teloxide's defaults and this config's request timeout.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        teloxide::net::default_reqwest_settings()
            .timeout(self.request_timeout)
            .build()
            .context("Failed to build Telegram HTTP client")
    }

    /// teloxide Bot for an arbitrary token, sharing `client` and this config's API URL.
    pub fn bot_for(&self, token: &str, client: reqwest::Client) -> teloxide::Bot {
        let bot = teloxide::Bot::with_client(token, client);
        match &self.api_url {
            Some(url) => bot.set_api_url(url.clone()),
            None => bot,
        }
    }

    /// teloxide Bot for this config's own token (the main bot).
    pub fn build_bot(&self) -> Result<teloxide::Bot> {
        Ok(self.bot_for(&self.bot_token, self.http_client()?))
    }
}
