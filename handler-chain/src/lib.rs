//! # Handler chain
//!
//! Runs a sequence of handlers for each operator message. Every handler has optional
//! before/handle/after: all `before` run in order (any `false` stops the chain), then `handle`
//! runs until one returns Stop or Reply, then every `after` runs in reverse order.

use relay_core::{Handler, HandlerResponse, Message, Result};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Chain of handlers: before (all) → handle (until Stop/Reply) → after (reverse).
#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Vec<Arc<dyn Handler>>,
}

/// Short label for logging a response without its body.
fn response_kind(response: &HandlerResponse) -> &'static str {
    match response {
        HandlerResponse::Continue => "Continue",
        HandlerResponse::Stop => "Stop",
        HandlerResponse::Ignore => "Ignore",
        HandlerResponse::Reply(_) => "Reply",
    }
}

impl HandlerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a handler.
    pub fn add_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Number of handlers in the chain.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Runs all before → handle until Stop/Reply → all after in reverse. Returns the response
    /// that ended the handle phase, or Continue when no handler claimed the message.
    #[instrument(skip(self, message), fields(user_id = message.user.id, chat_id = message.chat.id))]
    pub async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        info!(message_id = %message.id, "step: handler_chain started");

        for h in &self.handlers {
            let name = std::any::type_name_of_val(h.as_ref());
            if !h.before(message).await? {
                info!(handler = %name, "step: before returned false, chain stopped");
                return Ok(HandlerResponse::Stop);
            }
            debug!(handler = %name, "step: handler before done");
        }

        let mut final_response = HandlerResponse::Continue;
        for h in &self.handlers {
            let name = std::any::type_name_of_val(h.as_ref());
            let response = h.handle(message).await?;
            info!(
                handler = %name,
                response_type = %response_kind(&response),
                "step: handler handle done"
            );
            if matches!(response, HandlerResponse::Stop | HandlerResponse::Reply(_)) {
                final_response = response;
                break;
            }
        }

        for h in self.handlers.iter().rev() {
            h.after(message, &final_response).await?;
        }

        info!(
            message_id = %message.id,
            response_type = %response_kind(&final_response),
            "step: handler_chain finished"
        );
        Ok(final_response)
    }
}

// Integration tests live in tests/handler_chain_test.rs
