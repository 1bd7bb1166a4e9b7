//! # Setup handler
//!
//! Drives the operator conversation: token → recipient id → linked. Owns the [`Session`] and
//! starts or halts the forwarding loop on the way.

use async_trait::async_trait;
use relay_core::{
    AccountConnector, Bot, Handler, HandlerError, HandlerResponse, Message, MonitoredAccount,
    RelayError, Result,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, instrument, warn};

use crate::forwarder::Forwarder;
use crate::replies;
use crate::session::{Session, SetupState};

/// What an operator text means in the current state.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum OperatorInput<'a> {
    /// `/start` in any state.
    Restart,
    /// `/stop` (any ASCII case) while linked.
    Stop,
    /// Input for the current step (token, recipient id, or anything while linked).
    Text(&'a str),
    /// Some other command; no reply.
    Ignore,
}

/// Commands are matched on the first word, with an optional `@botname` suffix removed.
pub(crate) fn classify(text: &str, state: SetupState) -> OperatorInput<'_> {
    let text = text.trim();
    let Some(command) = text.split_whitespace().next().filter(|w| w.starts_with('/')) else {
        return OperatorInput::Text(text);
    };
    let name = command[1..]
        .split('@')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    match name.as_str() {
        "start" => OperatorInput::Restart,
        "stop" if state == SetupState::Linked && text.eq_ignore_ascii_case("/stop") => {
            OperatorInput::Stop
        }
        "stop" => OperatorInput::Text(text),
        _ => OperatorInput::Ignore,
    }
}

/// Handler for the setup conversation. Put it last in the chain.
pub struct SetupHandler {
    bot: Arc<dyn Bot>,
    connector: Arc<dyn AccountConnector>,
    forwarder: Forwarder,
    session: Arc<Mutex<Session>>,
}

impl SetupHandler {
    /// `bot` answers the operator; `connector` validates monitored-bot tokens.
    pub fn new(bot: Arc<dyn Bot>, connector: Arc<dyn AccountConnector>, forwarder: Forwarder) -> Self {
        Self {
            bot,
            connector,
            forwarder,
            session: Arc::new(Mutex::new(Session::new())),
        }
    }

    /// Shared session (used by the runner on shutdown and by tests for assertions).
    pub fn session(&self) -> Arc<Mutex<Session>> {
        self.session.clone()
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }

    /// Halts the running loop, if any. Called once the REPL has returned.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        let session = self.session.lock().await;
        if let Some(status) = session.forwarding_status() {
            info!(
                recipient_id = status.recipient_id,
                relayed = status.relayed,
                failed = status.failed,
                "Halting forwarding on shutdown"
            );
        }
        session.halt_forwarding();
    }

    async fn reply(&self, message: &Message, text: String) -> Result<HandlerResponse> {
        self.bot.reply_to(message, &text).await?;
        Ok(HandlerResponse::Reply(text))
    }

    async fn restart(&self, session: &mut Session, message: &Message) -> Result<HandlerResponse> {
        info!(user_id = message.user.id, "step: setup restarted");
        session.reset();
        self.reply(message, replies::WELCOME.to_string()).await
    }

    async fn stop(&self, session: &mut Session, message: &Message) -> Result<HandlerResponse> {
        info!(
            user_id = message.user.id,
            recipient_id = ?session.recipient_id(),
            "step: forwarding stopped by operator"
        );
        session.reset();
        self.reply(message, replies::FORWARDING_STOPPED.to_string()).await
    }

    async fn accept_credential(
        &self,
        session: &mut Session,
        message: &Message,
        credential: &str,
    ) -> Result<HandlerResponse> {
        if let Err(e) = self.bot.reply_to(message, replies::CHECKING_TOKEN).await {
            warn!(error = %e, "Failed to send checking notice");
        }

        match self.connector.connect(credential).await {
            Ok(linked) => {
                info!(
                    bot_id = linked.identity.id,
                    username = %linked.identity.username_or_empty(),
                    "step: token accepted"
                );
                let text = replies::token_accepted(&linked.identity);
                session.link_account(linked);
                self.reply(message, text).await
            }
            Err(e) => {
                warn!(error = %e, "Token rejected");
                self.reply(message, replies::INVALID_TOKEN.to_string()).await
            }
        }
    }

    async fn accept_recipient(
        &self,
        session: &mut Session,
        message: &Message,
        text: &str,
    ) -> Result<HandlerResponse> {
        let Ok(recipient_id) = text.trim().parse::<i64>() else {
            info!(input = %text, "Recipient id is not a number");
            return self
                .reply(message, replies::RECIPIENT_NOT_A_NUMBER.to_string())
                .await;
        };
        let linked = session
            .linked_account()
            .cloned()
            .ok_or_else(|| HandlerError::State("awaiting recipient without an account".to_string()))?;

        if let Err(e) = linked.account.send_message(recipient_id, replies::PROBE).await {
            warn!(recipient_id = recipient_id, error = %e, "Recipient unreachable");
            let detail = match &e {
                RelayError::Platform(detail) => detail.clone(),
                other => other.to_string(),
            };
            return self
                .reply(message, replies::recipient_unreachable(&detail))
                .await;
        }

        session.begin_forwarding(recipient_id, &self.forwarder).await?;
        info!(
            recipient_id = recipient_id,
            username = %linked.identity.username_or_empty(),
            "step: linked, forwarding started"
        );
        self.reply(message, replies::forwarding_started(recipient_id, &linked.identity))
            .await
    }
}

#[async_trait]
impl Handler for SetupHandler {
    #[instrument(skip(self, message), fields(user_id = message.user.id))]
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if !message.is_text() {
            return Ok(HandlerResponse::Ignore);
        }

        let mut session = self.session.lock().await;
        let state = session.state();
        let response = match classify(&message.content, state) {
            OperatorInput::Ignore => Ok(HandlerResponse::Ignore),
            OperatorInput::Restart => self.restart(&mut session, message).await,
            OperatorInput::Stop => self.stop(&mut session, message).await,
            OperatorInput::Text(text) => match state {
                SetupState::AwaitingCredential => {
                    self.accept_credential(&mut session, message, text).await
                }
                SetupState::AwaitingRecipient => {
                    self.accept_recipient(&mut session, message, text).await
                }
                SetupState::Linked => {
                    self.reply(message, replies::FORWARDING_ACTIVE.to_string())
                        .await
                }
            },
        };

        if let Err(e) = &response {
            error!(error = %e, state = ?state, "Setup step failed");
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_restarts_in_every_state() {
        for state in [
            SetupState::AwaitingCredential,
            SetupState::AwaitingRecipient,
            SetupState::Linked,
        ] {
            assert_eq!(classify("/start", state), OperatorInput::Restart);
            assert_eq!(classify("/START@relay_bot", state), OperatorInput::Restart);
        }
    }

    #[test]
    fn test_stop_ignores_case_when_linked() {
        assert_eq!(classify("/stop", SetupState::Linked), OperatorInput::Stop);
        assert_eq!(classify("  /STOP ", SetupState::Linked), OperatorInput::Stop);
        assert_eq!(classify("/Stop", SetupState::Linked), OperatorInput::Stop);
    }

    #[test]
    fn test_stop_is_text_before_linking() {
        assert_eq!(
            classify("/stop", SetupState::AwaitingCredential),
            OperatorInput::Text("/stop")
        );
        assert_eq!(
            classify("/stop", SetupState::AwaitingRecipient),
            OperatorInput::Text("/stop")
        );
    }

    #[test]
    fn test_stop_with_arguments_is_text_when_linked() {
        assert_eq!(
            classify("/stop now", SetupState::Linked),
            OperatorInput::Text("/stop now")
        );
    }

    #[test]
    fn test_other_commands_are_ignored() {
        assert_eq!(
            classify("/help", SetupState::AwaitingCredential),
            OperatorInput::Ignore
        );
        assert_eq!(classify("/status", SetupState::Linked), OperatorInput::Ignore);
    }

    #[test]
    fn test_plain_text_is_trimmed() {
        assert_eq!(
            classify("  123:abc \n", SetupState::AwaitingCredential),
            OperatorInput::Text("123:abc")
        );
        assert_eq!(classify("hello", SetupState::Linked), OperatorInput::Text("hello"));
    }
}
