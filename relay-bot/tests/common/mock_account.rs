//! In-memory monitored account with Telegram-like getUpdates offset semantics.

use async_trait::async_trait;
use relay_core::{
    AccountConnector, BotIdentity, ForwardSource, InboundUpdate, LinkedAccount, MonitoredAccount,
    PollRequest, RelayError, Result,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Chat the monitored bot receives messages in.
pub const SOURCE_CHAT_ID: i64 = 9000;
pub const SENDER_ID: i64 = 7;

pub const FORBIDDEN: &str = "Forbidden: bot can't initiate conversation with a user";

#[derive(Default)]
struct AccountState {
    pending: Vec<InboundUpdate>,
    polls: Vec<PollRequest>,
    forwarded: Vec<(i64, ForwardSource)>,
    sent: Vec<(i64, String)>,
    failing_messages: HashSet<i32>,
    unreachable: HashSet<i64>,
    poll_errors: usize,
    unexpected_poll_errors: usize,
}

/// Records every call. Messages pushed with [`MockAccount::push_message`] use the update id as
/// message id, so forwarded ids can be compared with update ids directly.
#[derive(Default)]
pub struct MockAccount {
    state: Mutex<AccountState>,
}

impl MockAccount {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_message(&self, update_id: i64) {
        self.push_update(InboundUpdate {
            update_id,
            message: Some(ForwardSource {
                chat_id: SOURCE_CHAT_ID,
                message_id: update_id as i32,
                sender_id: Some(SENDER_ID),
            }),
        });
    }

    pub fn push_update(&self, update: InboundUpdate) {
        self.state.lock().unwrap().pending.push(update);
    }

    /// forwardMessage fails for this message id.
    pub fn fail_forward(&self, message_id: i32) {
        self.state.lock().unwrap().failing_messages.insert(message_id);
    }

    /// sendMessage to this chat fails with [`FORBIDDEN`].
    pub fn set_unreachable(&self, chat_id: i64) {
        self.state.lock().unwrap().unreachable.insert(chat_id);
    }

    /// The next `count` getUpdates calls fail with a platform error.
    pub fn fail_next_polls(&self, count: usize) {
        self.state.lock().unwrap().poll_errors = count;
    }

    /// The next `count` getUpdates calls fail with an error the platform did not report.
    pub fn fail_next_polls_unexpectedly(&self, count: usize) {
        self.state.lock().unwrap().unexpected_poll_errors = count;
    }

    pub fn polls(&self) -> Vec<PollRequest> {
        self.state.lock().unwrap().polls.clone()
    }

    pub fn polled_offset(&self, offset: i64) -> bool {
        self.polls().iter().any(|p| p.offset == offset)
    }

    /// Message ids forwarded successfully, in order, with their destination.
    pub fn forwarded(&self) -> Vec<(i64, i32)> {
        self.state
            .lock()
            .unwrap()
            .forwarded
            .iter()
            .map(|(to, source)| (*to, source.message_id))
            .collect()
    }

    pub fn sent(&self) -> Vec<(i64, String)> {
        self.state.lock().unwrap().sent.clone()
    }
}

#[async_trait]
impl MonitoredAccount for MockAccount {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.unreachable.contains(&chat_id) {
            return Err(RelayError::Platform(FORBIDDEN.to_string()));
        }
        state.sent.push((chat_id, text.to_string()));
        Ok(())
    }

    async fn get_updates(&self, request: PollRequest) -> Result<Vec<InboundUpdate>> {
        let batch = {
            let mut state = self.state.lock().unwrap();
            state.polls.push(request);
            if state.unexpected_poll_errors > 0 {
                state.unexpected_poll_errors -= 1;
                return Err(RelayError::Unknown("response body truncated".to_string()));
            }
            if state.poll_errors > 0 {
                state.poll_errors -= 1;
                return Err(RelayError::Platform("Bad Gateway".to_string()));
            }

            if request.offset < 0 {
                // Negative offset: keep only the newest -offset updates, forget the rest.
                let keep = request.offset.unsigned_abs() as usize;
                let len = state.pending.len();
                state.pending.drain(..len.saturating_sub(keep));
            } else {
                state.pending.retain(|u| u.update_id >= request.offset);
            }
            state
                .pending
                .iter()
                .take(usize::from(request.limit))
                .cloned()
                .collect::<Vec<_>>()
        };

        if batch.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(batch)
    }

    async fn forward_message(&self, to_chat_id: i64, source: &ForwardSource) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.failing_messages.contains(&source.message_id) {
            return Err(RelayError::Platform(
                "Bad Request: message to forward not found".to_string(),
            ));
        }
        state.forwarded.push((to_chat_id, *source));
        Ok(())
    }
}

/// Accepts exactly one token, byte for byte; everything else is rejected like getMe would.
pub struct MockConnector {
    token: String,
    identity: BotIdentity,
    account: Arc<MockAccount>,
    attempts: AtomicUsize,
}

impl MockConnector {
    pub fn new(token: &str, identity: BotIdentity, account: Arc<MockAccount>) -> Arc<Self> {
        Arc::new(Self {
            token: token.to_string(),
            identity,
            account,
            attempts: AtomicUsize::new(0),
        })
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountConnector for MockConnector {
    async fn connect(&self, credential: &str) -> Result<LinkedAccount> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if credential != self.token {
            return Err(RelayError::Platform("Unauthorized".to_string()));
        }
        Ok(LinkedAccount {
            account: self.account.clone(),
            identity: self.identity.clone(),
        })
    }
}
