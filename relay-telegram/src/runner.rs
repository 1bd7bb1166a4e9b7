//! REPL runner: converts teloxide messages to core::Message and passes them to the HandlerChain.
//! Messages are handled inline, so operator input is processed strictly in arrival order.

use anyhow::Result;
use handler_chain::HandlerChain;
use relay_core::ToCoreMessage;
use teloxide::prelude::*;
use tracing::{error, info, instrument};

use super::adapters::TelegramMessageWrapper;

/// Runs the REPL on the main bot until the process receives Ctrl-C.
/// Each message is converted to core::Message and awaited through `chain.handle`.
#[instrument(skip(bot, handler_chain))]
pub async fn run_repl(bot: teloxide::Bot, handler_chain: HandlerChain) -> Result<()> {
    match bot.get_me().await {
        Ok(me) => info!(
            username = %me.user.username.as_deref().unwrap_or("unknown"),
            "Main bot connected"
        ),
        Err(e) => error!(error = %e, "getMe failed for main bot; starting REPL anyway"),
    }

    teloxide::repl(
        bot,
        move |_bot: Bot, msg: teloxide::types::Message| {
            let chain = handler_chain.clone();

            async move {
                let core_msg = TelegramMessageWrapper(&msg).to_core();
                info!(
                    user_id = core_msg.user.id,
                    chat_id = core_msg.chat.id,
                    kind = %core_msg.kind.as_str(),
                    "Received operator message"
                );

                if let Err(e) = chain.handle(&core_msg).await {
                    error!(error = %e, user_id = core_msg.user.id, "Handler chain failed");
                }

                Ok(())
            }
        },
    )
    .await;

    info!("REPL stopped");
    Ok(())
}
