//! Base config: main bot connection, logging, operator allowlist. Loaded from env.

use anyhow::{Context, Result};
use std::env;

/// Base config: Telegram-related, logging and who may operate the bot.
#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// BOT_TOKEN (main bot the operator talks to)
    pub bot_token: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    /// LOG_FILE
    pub log_file: String,
    /// ALLOWED_USERS, comma-separated ids; empty means anyone may operate the bot
    pub allowed_users: Vec<i64>,
}

/// Parses `"1, 2,3"` into ids; blank entries are skipped.
pub(crate) fn parse_allowed_users(raw: &str) -> Result<Vec<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .with_context(|| format!("ALLOWED_USERS entry is not a user id: {}", s))
        })
        .collect()
}

impl BaseConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN").map_err(|_| anyhow::anyhow!("BOT_TOKEN not set"))?,
        };
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let log_file =
            env::var("LOG_FILE").unwrap_or_else(|_| "logs/relay-bot.log".to_string());
        let allowed_users = match env::var("ALLOWED_USERS") {
            Ok(raw) => parse_allowed_users(&raw)?,
            Err(_) => Vec::new(),
        };

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file,
            allowed_users,
        })
    }

    /// Validate config (telegram_api_url must be a valid URL if set; token must not be blank).
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            anyhow::bail!("BOT_TOKEN is empty");
        }
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                anyhow::bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        Ok(())
    }
}
