//! Forwarding loop: long-polls the monitored account and forwards every inbound message to the
//! recipient.
//!
//! Each loop start gets its own [`ForwardingControl`] (enabled flag + stop token) and
//! [`ForwardingProgress`] (cursor, last seen update, counters), shared between the spawned task
//! and the [`ForwardingHandle`] kept in the session. Stopping is cooperative: the flags are
//! checked once per iteration and delays end early on stop, but an in-flight poll is never
//! interrupted, so the poll timeout bounds stop latency.

use relay_core::{ForwardSource, InboundUpdate, MonitoredAccount, PollRequest};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::config::ForwardingConfig;

/// Sentinel for "no update seen yet" in [`ForwardingProgress::last_seen`].
const NO_UPDATE: i64 = -1;

/// `forwardingEnabled` + `stopSignal` of one loop.
#[derive(Debug)]
pub struct ForwardingControl {
    enabled: AtomicBool,
    stop: CancellationToken,
}

impl ForwardingControl {
    fn new() -> Self {
        Self {
            enabled: AtomicBool::new(true),
            stop: CancellationToken::new(),
        }
    }

    /// Disables forwarding and raises the stop signal. Idempotent.
    pub fn halt(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.stop.cancel();
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// True while the loop should keep polling.
    pub fn is_running(&self) -> bool {
        self.is_enabled() && !self.is_stopped()
    }

    /// Sleeps for `delay`, returning early once stop is raised.
    async fn pause(&self, delay: Duration) {
        tokio::select! {
            _ = self.stop.cancelled() => {}
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// Cursor and counters of one loop, readable while it runs.
#[derive(Debug)]
pub struct ForwardingProgress {
    cursor: AtomicI64,
    last_seen: AtomicI64,
    relayed: AtomicU64,
    failed: AtomicU64,
}

impl ForwardingProgress {
    fn new() -> Self {
        Self {
            cursor: AtomicI64::new(0),
            last_seen: AtomicI64::new(NO_UPDATE),
            relayed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    fn advance(&self, update_id: i64, cursor: i64) {
        self.last_seen.store(update_id, Ordering::SeqCst);
        self.cursor.store(cursor, Ordering::SeqCst);
    }
}

/// Snapshot of a loop for status checks and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardingStatus {
    pub recipient_id: i64,
    pub enabled: bool,
    pub stopped: bool,
    pub finished: bool,
    /// Offset the next poll will use.
    pub cursor: i64,
    pub last_seen_update_id: Option<i64>,
    pub relayed: u64,
    pub failed: u64,
}

/// Owner-side view of a spawned loop.
#[derive(Debug)]
pub struct ForwardingHandle {
    recipient_id: i64,
    control: Arc<ForwardingControl>,
    progress: Arc<ForwardingProgress>,
    task: JoinHandle<()>,
}

impl ForwardingHandle {
    pub fn recipient_id(&self) -> i64 {
        self.recipient_id
    }

    /// Disables forwarding and raises stop; the task exits at its next check.
    pub fn halt(&self) {
        self.control.halt();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn status(&self) -> ForwardingStatus {
        let last_seen = self.progress.last_seen.load(Ordering::SeqCst);
        ForwardingStatus {
            recipient_id: self.recipient_id,
            enabled: self.control.is_enabled(),
            stopped: self.control.is_stopped(),
            finished: self.is_finished(),
            cursor: self.progress.cursor.load(Ordering::SeqCst),
            last_seen_update_id: (last_seen != NO_UPDATE).then_some(last_seen),
            relayed: self.progress.relayed.load(Ordering::SeqCst),
            failed: self.progress.failed.load(Ordering::SeqCst),
        }
    }

    /// Waits for the task to exit. Does not halt it.
    pub async fn wait(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, recipient_id = self.recipient_id, "Forwarding task ended abnormally");
        }
    }
}

/// Counts loops currently inside their polling phase.
struct RunningGuard(Arc<AtomicUsize>);

impl RunningGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Spawns forwarding loops. Cloning shares the running-loop counter.
#[derive(Clone)]
pub struct Forwarder {
    config: ForwardingConfig,
    running: Arc<AtomicUsize>,
}

impl Forwarder {
    pub fn new(config: ForwardingConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of loops currently polling (at most one when driven by the session).
    pub fn running_loops(&self) -> usize {
        self.running.load(Ordering::SeqCst)
    }

    /// Starts a loop relaying from `account` to `recipient_id`. If `previous` is given it is
    /// halted and awaited first, so two loops never poll the same account at once. The start
    /// cursor is resolved before returning: anything the account receives after this call is
    /// relayed. If resolving fails, the spawned loop keeps retrying it with backoff.
    pub async fn start(
        &self,
        account: Arc<dyn MonitoredAccount>,
        recipient_id: i64,
        previous: Option<ForwardingHandle>,
    ) -> ForwardingHandle {
        if let Some(previous) = previous {
            previous.halt();
            debug!(
                previous_recipient = previous.recipient_id(),
                "Waiting for previous forwarding loop to exit"
            );
            previous.wait().await;
        }

        let control = Arc::new(ForwardingControl::new());
        let progress = Arc::new(ForwardingProgress::new());
        let initial_cursor = match account.get_updates(PollRequest::latest()).await {
            Ok(updates) => Some(skip_backlog(&progress, &updates)),
            Err(e) => {
                warn!(error = %e, "Could not resolve start cursor, loop will retry");
                None
            }
        };

        let forwarding_loop = ForwardingLoop {
            account,
            recipient_id,
            initial_cursor,
            config: self.config.clone(),
            control: control.clone(),
            progress: progress.clone(),
            running: self.running.clone(),
        };
        let task = tokio::spawn(forwarding_loop.run());

        ForwardingHandle {
            recipient_id,
            control,
            progress,
            task,
        }
    }
}

/// Cursor just past the newest pending update, so only updates arriving later are relayed.
fn skip_backlog(progress: &ForwardingProgress, updates: &[InboundUpdate]) -> i64 {
    match updates.last() {
        Some(latest) => {
            info!(
                skipped_through = latest.update_id,
                "Skipping updates received before the link"
            );
            let cursor = latest.update_id + 1;
            progress.advance(latest.update_id, cursor);
            cursor
        }
        None => 0,
    }
}

struct ForwardingLoop {
    account: Arc<dyn MonitoredAccount>,
    recipient_id: i64,
    initial_cursor: Option<i64>,
    config: ForwardingConfig,
    control: Arc<ForwardingControl>,
    progress: Arc<ForwardingProgress>,
    running: Arc<AtomicUsize>,
}

impl ForwardingLoop {
    #[instrument(skip(self), fields(recipient_id = self.recipient_id))]
    async fn run(self) {
        let _running = RunningGuard::enter(&self.running);
        info!("Forwarding loop started");

        let resolved = match self.initial_cursor {
            Some(cursor) => Some(cursor),
            None => self.start_cursor().await,
        };
        let Some(mut cursor) = resolved else {
            info!("Forwarding loop stopped before first poll");
            return;
        };

        while self.control.is_running() {
            let request = PollRequest {
                offset: cursor,
                timeout_secs: self.config.poll_timeout_secs,
                limit: self.config.batch_limit,
            };
            match self.account.get_updates(request).await {
                Ok(updates) => {
                    if !self.control.is_running() {
                        debug!(count = updates.len(), "Stop raised during poll, batch dropped");
                        break;
                    }
                    if !updates.is_empty() {
                        info!(count = updates.len(), "New updates on monitored account");
                    }
                    for update in updates {
                        cursor = update.update_id + 1;
                        self.progress.advance(update.update_id, cursor);
                        if let Some(source) = update.message {
                            info!(
                                update_id = update.update_id,
                                from = ?source.sender_id,
                                chat_id = source.chat_id,
                                "Relaying message"
                            );
                            let counter = if relay_message(
                                self.account.as_ref(),
                                self.recipient_id,
                                &source,
                            )
                            .await
                            {
                                &self.progress.relayed
                            } else {
                                &self.progress.failed
                            };
                            counter.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                    self.control.pause(self.config.idle_delay).await;
                }
                Err(e) if e.is_platform() => {
                    warn!(error = %e, "Platform error while polling, backing off");
                    self.control.pause(self.config.error_backoff).await;
                }
                Err(e) => {
                    error!(error = %e, "Unexpected error while polling, backing off");
                    self.control.pause(self.config.error_backoff).await;
                }
            }
        }

        info!(
            cursor = cursor,
            relayed = self.progress.relayed.load(Ordering::SeqCst),
            failed = self.progress.failed.load(Ordering::SeqCst),
            "Forwarding loop stopped"
        );
    }

    /// Retries start cursor resolution with backoff; `None` if stopped meanwhile.
    async fn start_cursor(&self) -> Option<i64> {
        while self.control.is_running() {
            match self.account.get_updates(PollRequest::latest()).await {
                Ok(updates) => return Some(skip_backlog(&self.progress, &updates)),
                Err(e) => {
                    warn!(error = %e, "Could not resolve start cursor, backing off");
                    self.control.pause(self.config.error_backoff).await;
                }
            }
        }
        None
    }
}

/// Forwards one message verbatim. Failures are logged and reported as `false`, never raised.
#[instrument(skip(account, source), fields(chat_id = source.chat_id, message_id = source.message_id))]
pub async fn relay_message(
    account: &dyn MonitoredAccount,
    recipient_id: i64,
    source: &ForwardSource,
) -> bool {
    match account.forward_message(recipient_id, source).await {
        Ok(()) => {
            info!(recipient_id = recipient_id, "Message forwarded");
            true
        }
        Err(e) => {
            error!(recipient_id = recipient_id, error = %e, "Failed to forward message");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halt_is_idempotent() {
        let control = ForwardingControl::new();
        assert!(control.is_running());

        control.halt();
        control.halt();

        assert!(!control.is_enabled());
        assert!(control.is_stopped());
        assert!(!control.is_running());
    }

    #[tokio::test]
    async fn test_pause_returns_early_on_stop() {
        let control = Arc::new(ForwardingControl::new());
        let halter = control.clone();
        tokio::spawn(async move { halter.halt() });

        tokio::time::timeout(Duration::from_secs(5), control.pause(Duration::from_secs(3600)))
            .await
            .expect("pause should end when stop is raised");
    }

    #[test]
    fn test_skip_backlog_moves_past_newest_update() {
        let progress = ForwardingProgress::new();
        assert_eq!(skip_backlog(&progress, &[]), 0);
        assert_eq!(progress.last_seen.load(Ordering::SeqCst), NO_UPDATE);

        let backlog = [
            InboundUpdate {
                update_id: 50,
                message: None,
            },
            InboundUpdate {
                update_id: 51,
                message: None,
            },
        ];
        assert_eq!(skip_backlog(&progress, &backlog), 52);
        assert_eq!(progress.cursor.load(Ordering::SeqCst), 52);
        assert_eq!(progress.last_seen.load(Ordering::SeqCst), 51);
    }

    #[test]
    fn test_running_guard_counts() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let _a = RunningGuard::enter(&counter);
            let _b = RunningGuard::enter(&counter);
            assert_eq!(counter.load(Ordering::SeqCst), 2);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
