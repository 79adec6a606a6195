//! Telegram delivery and admin command listener.
//!
//! Announcements go out through [`TelegramDispatcher`]. Admin commands are
//! read with a long-polling [`teloxide::repl`] and answered in the chat that
//! sent them.

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tracing::{error, info, warn};

use crate::command::{CommandHandler, bot_commands};
use crate::dispatch::Dispatcher;
use crate::types::Announcement;

/// Sends announcements as plain-text Telegram messages.
#[derive(Clone)]
pub struct TelegramDispatcher {
    bot: Bot,
}

impl TelegramDispatcher {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Dispatcher for TelegramDispatcher {
    async fn send(&self, announcement: &Announcement) -> Result<()> {
        let chat_id = ChatId(announcement.destination.chat_id());
        self.bot
            .send_message(chat_id, announcement.text.as_str())
            .await
            .map_err(|e| anyhow::anyhow!("failed to send to chat {}: {e}", chat_id.0))?;
        Ok(())
    }
}

/// Whether commands from `incoming` should be handled.
///
/// Without a configured admin chat every chat is accepted.
pub fn is_authorized_chat(incoming: i64, admin_chat: Option<i64>) -> bool {
    match admin_chat {
        None => true,
        Some(allowed) if allowed == incoming => true,
        Some(_) => {
            warn!(chat_id = incoming, "Ignoring command from unauthorized chat");
            false
        }
    }
}

/// Listen for admin commands until the process stops.
pub async fn run_command_listener(bot: Bot, handler: CommandHandler, admin_chat: Option<i64>) {
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "Failed to register bot commands with Telegram");
    }

    info!(?admin_chat, "Telegram command listener started");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let handler = handler.clone();
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };
            if !is_authorized_chat(msg.chat.id.0, admin_chat) {
                return respond(());
            }

            if let Some(pages) = handler.respond(text).await {
                for page in pages {
                    if let Err(e) = bot.send_message(msg.chat.id, page).await {
                        error!(error = %e, "Failed to send command response");
                        break;
                    }
                }
            }

            respond(())
        }
    })
    .await;
}

/// Register commands for the chat's "/" menu.
async fn register_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}
