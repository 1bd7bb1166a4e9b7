//! BotConfig: BaseConfig + ForwardingConfig. Use load() for env-based loading.

use anyhow::{Context, Result};
use relay_telegram::TelegramConfig;

use super::{BaseConfig, ForwardingConfig};

/// Bot config. Use BotConfig::load() for env-based loading, then validate().
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub base: BaseConfig,
    pub forwarding: ForwardingConfig,
}

impl BotConfig {
    /// Load full config from environment variables. If `token` is provided it overrides BOT_TOKEN.
    pub fn load(token: Option<String>) -> Result<Self> {
        let base = BaseConfig::load(token)?;
        let forwarding = ForwardingConfig::from_env();
        Ok(Self { base, forwarding })
    }

    /// Validate config. Call after load() to fail fast before init.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()
    }

    /// Telegram connectivity for the main bot; monitored accounts reuse its API URL and timeout.
    pub fn telegram(&self) -> Result<TelegramConfig> {
        let api_url = self
            .telegram_api_url()
            .map(|s| s.parse::<reqwest::Url>().context("Invalid TELEGRAM_API_URL"))
            .transpose()?;
        Ok(TelegramConfig::with_token(self.base.bot_token.clone())
            .with_api_url(api_url)
            .with_request_timeout(self.forwarding.request_timeout()))
    }

    pub fn forwarding(&self) -> &ForwardingConfig {
        &self.forwarding
    }

    pub fn bot_token(&self) -> &str {
        &self.base.bot_token
    }
    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }
    pub fn telegram_api_url(&self) -> Option<&str> {
        self.base.telegram_api_url.as_deref()
    }
    pub fn allowed_users(&self) -> &[i64] {
        &self.base.allowed_users
    }
}
