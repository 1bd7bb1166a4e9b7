//! Forwarding loop cadence: long-poll timeout, batch size, idle delay, error backoff.

use std::env;
use std::time::Duration;

/// Telegram caps getUpdates batches at 100.
const MAX_BATCH_LIMIT: u8 = 100;

/// Slack added on top of the long-poll timeout for the HTTP request timeout.
const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingConfig {
    /// FORWARD_POLL_TIMEOUT_SECS: how long one getUpdates call may wait for news
    pub poll_timeout_secs: u32,
    /// FORWARD_BATCH_LIMIT: max updates per poll, clamped to 1..=100
    pub batch_limit: u8,
    /// FORWARD_IDLE_DELAY_MS: pause after every successful poll
    pub idle_delay: Duration,
    /// FORWARD_ERROR_BACKOFF_MS: pause after a failed poll
    pub error_backoff: Duration,
}

impl Default for ForwardingConfig {
    fn default() -> Self {
        Self {
            poll_timeout_secs: 30,
            batch_limit: MAX_BATCH_LIMIT,
            idle_delay: Duration::from_secs(1),
            error_backoff: Duration::from_secs(5),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl ForwardingConfig {
    /// Load from env; unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let poll_timeout_secs =
            env_parse("FORWARD_POLL_TIMEOUT_SECS").unwrap_or(defaults.poll_timeout_secs);
        let batch_limit = env_parse::<u8>("FORWARD_BATCH_LIMIT")
            .unwrap_or(defaults.batch_limit)
            .clamp(1, MAX_BATCH_LIMIT);
        let idle_delay = env_parse("FORWARD_IDLE_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.idle_delay);
        let error_backoff = env_parse("FORWARD_ERROR_BACKOFF_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.error_backoff);

        Self {
            poll_timeout_secs,
            batch_limit,
            idle_delay,
            error_backoff,
        }
    }

    /// HTTP timeout for monitored-account requests; always longer than the long-poll wait.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.poll_timeout_secs)) + REQUEST_TIMEOUT_SLACK
    }
}
