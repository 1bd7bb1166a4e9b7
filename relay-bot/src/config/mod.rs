//! Bot configuration: BaseConfig (Telegram + log + operator allowlist) + ForwardingConfig
//! (polling cadence of the forwarding loop). Loaded from env.

mod base;
mod bot_config;
mod forwarding;


pub use base::BaseConfig;
pub use bot_config::BotConfig;
pub use forwarding::ForwardingConfig;
