//! The single operator session: setup state, linked account, recipient and the running loop.

use relay_core::{BotIdentity, HandlerError, LinkedAccount};

use crate::forwarder::{Forwarder, ForwardingHandle, ForwardingStatus};

/// Setup phase of the operator conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SetupState {
    /// Waiting for the monitored bot's token. Initial state; entered again on /start and /stop.
    #[default]
    AwaitingCredential,
    /// Token validated; waiting for the recipient user id.
    AwaitingRecipient,
    /// Recipient reachable; the forwarding loop is running.
    Linked,
}

/// Session record. One per process, owned by the setup handler.
#[derive(Debug, Default)]
pub struct Session {
    state: SetupState,
    linked: Option<LinkedAccount>,
    recipient_id: Option<i64>,
    forwarding: Option<ForwardingHandle>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SetupState {
        self.state
    }

    /// Identity cached when the credential was validated.
    pub fn identity(&self) -> Option<&BotIdentity> {
        self.linked.as_ref().map(|linked| &linked.identity)
    }

    /// Last recipient that passed the probe. Kept across restarts until replaced.
    pub fn recipient_id(&self) -> Option<i64> {
        self.recipient_id
    }

    pub fn linked_account(&self) -> Option<&LinkedAccount> {
        self.linked.as_ref()
    }

    /// Handle of the most recently started loop (possibly halted already).
    pub fn forwarding(&self) -> Option<&ForwardingHandle> {
        self.forwarding.as_ref()
    }

    pub fn forwarding_status(&self) -> Option<ForwardingStatus> {
        self.forwarding.as_ref().map(ForwardingHandle::status)
    }

    /// Disables forwarding and raises stop on the current loop, if any. The handle is kept so
    /// the next loop can wait for this one to exit.
    pub fn halt_forwarding(&self) {
        if let Some(handle) = &self.forwarding {
            handle.halt();
        }
    }

    /// Back to the first step: halts forwarding and forgets the linked account.
    pub fn reset(&mut self) {
        self.halt_forwarding();
        self.linked = None;
        self.state = SetupState::AwaitingCredential;
    }

    /// Stores a validated account and moves on to asking for the recipient.
    pub fn link_account(&mut self, linked: LinkedAccount) {
        self.linked = Some(linked);
        self.state = SetupState::AwaitingRecipient;
    }

    /// Records the recipient and starts a new forwarding loop for the linked account. Any
    /// previous loop is halted and awaited first. Returns once the start cursor is resolved.
    pub async fn begin_forwarding(
        &mut self,
        recipient_id: i64,
        forwarder: &Forwarder,
    ) -> Result<&ForwardingHandle, HandlerError> {
        if self.state != SetupState::AwaitingRecipient {
            return Err(HandlerError::State(format!(
                "cannot start forwarding in state {:?}",
                self.state
            )));
        }
        let account = self
            .linked
            .as_ref()
            .map(|linked| linked.account.clone())
            .ok_or_else(|| HandlerError::State("no linked account".to_string()))?;

        let previous = self.forwarding.take();
        self.recipient_id = Some(recipient_id);
        self.state = SetupState::Linked;
        Ok(self
            .forwarding
            .insert(forwarder.start(account, recipient_id, previous).await))
    }
}
