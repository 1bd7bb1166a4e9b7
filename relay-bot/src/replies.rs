//! Texts sent to the operator (and the probe sent to the recipient).

use relay_core::BotIdentity;

pub const WELCOME: &str =
    "🤖 Hi! Send me the token of the bot you want to monitor\nExample: 123456789:ABCdefGHIjklMNOpqrsTUVwxyz";

pub const CHECKING_TOKEN: &str = "🔍 Checking the token...";

pub const INVALID_TOKEN: &str =
    "❌ The token is invalid or the bot is disabled\nCheck the token and try again";

/// Sent to the recipient through the monitored bot to prove it is reachable.
pub const PROBE: &str = "🔗 Bot linked successfully! All new messages will be forwarded to you";

pub const RECIPIENT_NOT_A_NUMBER: &str = "❌ The User ID must be a number\nExample: 123456789";

pub const FORWARDING_STOPPED: &str = "⏹️ Message forwarding stopped\nTo start again, send /start";

pub const FORWARDING_ACTIVE: &str = "🔄 Forwarding is currently active\nTo stop forwarding, send /stop";

pub fn token_accepted(identity: &BotIdentity) -> String {
    format!(
        "✅ Token is valid!\n🤖 Bot username: @{}\n📝 Name: {}\n\nNow send me the User ID that messages should be forwarded to",
        identity.username_or_empty(),
        identity.first_name
    )
}

pub fn forwarding_started(recipient_id: i64, identity: &BotIdentity) -> String {
    format!(
        "✅ User ID saved: {}\n🔄 Forwarding new messages...\n\n📝 Every message that reaches @{} will now be forwarded to you\nTo stop forwarding, send /stop",
        recipient_id,
        identity.username_or_empty()
    )
}

/// `error` is the platform's own description of why the probe failed.
pub fn recipient_unreachable(error: &str) -> String {
    format!(
        "❌ Cannot send messages to this user\nMake sure the user has started a chat with the bot first\nError: {}",
        error
    )
}
