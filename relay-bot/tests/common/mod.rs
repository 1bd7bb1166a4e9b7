//! Shared fixtures: mock operator bot, mock monitored account/connector, a harness that wires
//! them into the real handler chain.

#![allow(dead_code)]

pub mod mock_account;
pub mod mock_bot;

use handler_chain::HandlerChain;
use relay_bot::{
    build_handler_chain, BaseConfig, BotConfig, Forwarder, ForwardingConfig, ForwardingStatus,
    SetupHandler, SetupState,
};
use relay_core::{BotIdentity, Chat, HandlerResponse, Message, MessageKind, User};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub use mock_account::{MockAccount, MockConnector};
pub use mock_bot::MockBot;

pub const OPERATOR_ID: i64 = 42;
pub const VALID_TOKEN: &str = "123456789:ABCdefGHIjklMNOpqrsTUVwxyz";
pub const RECIPIENT_ID: i64 = 555;

const WAIT_LIMIT: Duration = Duration::from_secs(5);

pub fn watcher_identity() -> BotIdentity {
    BotIdentity {
        id: 123456789,
        first_name: "Watcher".to_string(),
        username: Some("watcher_bot".to_string()),
    }
}

/// Fast cadence so loops cycle in milliseconds.
pub fn fast_forwarding() -> ForwardingConfig {
    ForwardingConfig {
        poll_timeout_secs: 0,
        batch_limit: 100,
        idle_delay: Duration::from_millis(5),
        error_backoff: Duration::from_millis(10),
    }
}

pub fn test_config(allowed_users: Vec<i64>) -> BotConfig {
    BotConfig {
        base: BaseConfig {
            bot_token: "1:main".to_string(),
            telegram_api_url: None,
            log_file: "logs/test.log".to_string(),
            allowed_users,
        },
        forwarding: fast_forwarding(),
    }
}

pub fn message_from(user_id: i64, content: &str, kind: MessageKind) -> Message {
    Message {
        id: format!("{}-{}", user_id, content.len()),
        user: User {
            id: user_id,
            username: Some("operator".to_string()),
        },
        chat: Chat { id: user_id },
        content: content.to_string(),
        kind,
    }
}

/// Polls `condition` every few milliseconds; false if it never held within five seconds.
pub async fn wait_until<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    while tokio::time::Instant::now() < deadline {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}

pub struct Harness {
    pub bot: Arc<MockBot>,
    pub account: Arc<MockAccount>,
    pub connector: Arc<MockConnector>,
    pub setup: Arc<SetupHandler>,
    pub chain: HandlerChain,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_allowlist(vec![])
    }

    pub fn with_allowlist(allowed_users: Vec<i64>) -> Self {
        let bot = Arc::new(MockBot::default());
        let account = MockAccount::new();
        let connector = MockConnector::new(VALID_TOKEN, watcher_identity(), account.clone());
        let setup = Arc::new(SetupHandler::new(
            bot.clone(),
            connector.clone(),
            Forwarder::new(fast_forwarding()),
        ));
        let chain = build_handler_chain(&test_config(allowed_users), setup.clone());
        Self {
            bot,
            account,
            connector,
            setup,
            chain,
        }
    }

    /// Sends a text message as the operator through the whole chain.
    pub async fn send(&self, text: &str) -> HandlerResponse {
        self.chain
            .handle(&message_from(OPERATOR_ID, text, MessageKind::Text))
            .await
            .expect("chain must not fail for the operator")
    }

    pub async fn state(&self) -> SetupState {
        self.setup.session().lock().await.state()
    }

    pub async fn status(&self) -> Option<ForwardingStatus> {
        self.setup.session().lock().await.forwarding_status()
    }

    pub fn running_loops(&self) -> usize {
        self.setup.forwarder().running_loops()
    }

    pub async fn wait_for_loops(&self, count: usize) -> bool {
        wait_until(|| async move { self.running_loops() == count }).await
    }

    /// Waits until `count` messages have been forwarded successfully.
    pub async fn wait_for_forwarded(&self, count: usize) -> bool {
        wait_until(|| async move { self.account.forwarded().len() >= count }).await
    }

    /// Waits until the most recently started loop task has exited.
    pub async fn wait_for_finished(&self) -> bool {
        wait_until(|| async move { self.status().await.is_some_and(|s| s.finished) }).await
    }

    pub async fn wait_for_poll(&self, offset: i64) -> bool {
        wait_until(|| async move { self.account.polled_offset(offset) }).await
    }

    /// Walks the setup to `Linked`. The start cursor is resolved before the recipient reply,
    /// so anything pushed afterwards counts as new.
    pub async fn link(&self, recipient_id: i64) {
        self.send(VALID_TOKEN).await;
        self.send(&recipient_id.to_string()).await;
        assert_eq!(self.state().await, SetupState::Linked);
    }
}
