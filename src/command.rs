//! Admin commands issued from the chat surface.

use std::sync::Arc;

use tracing::{info, warn};

use crate::LIST_PAGE_SIZE;
use crate::api::MflClient;
use crate::context::BotContext;
use crate::directory::{load_franchises, load_players};
use crate::error::CommandError;
use crate::format::paginate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Help,
    SetUser { franchise: String, user: String },
    ListUsers,
    ClearUser { franchise: String },
    ReloadUsers,
    VacantUsers,
    Franchises,
    Reload,
}

/// Parse a chat message into an admin command.
pub fn parse_command(text: &str) -> Result<AdminCommand, CommandError> {
    let mut parts = text.split_whitespace();
    let Some(raw_command) = parts.next() else {
        return Err(CommandError::NotACommand);
    };
    if !raw_command.starts_with('/') {
        return Err(CommandError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head)
        .to_ascii_lowercase();

    match command.as_str() {
        "/start" | "/help" => Ok(AdminCommand::Help),
        "/setuser" => {
            let franchise = parts
                .next()
                .ok_or(CommandError::MissingArgument("franchiseId"))?;
            let user = parts.next().ok_or(CommandError::MissingArgument("user"))?;
            Ok(AdminCommand::SetUser {
                franchise: normalize_franchise_id(franchise),
                user: user.to_string(),
            })
        }
        "/listusers" => Ok(AdminCommand::ListUsers),
        "/clearuser" => {
            let franchise = parts
                .next()
                .ok_or(CommandError::MissingArgument("franchiseId"))?;
            Ok(AdminCommand::ClearUser {
                franchise: normalize_franchise_id(franchise),
            })
        }
        "/reloadusers" => Ok(AdminCommand::ReloadUsers),
        "/vacantusers" => Ok(AdminCommand::VacantUsers),
        "/franchises" => Ok(AdminCommand::Franchises),
        "/reload" => Ok(AdminCommand::Reload),
        _ => Err(CommandError::UnknownCommand(command)),
    }
}

/// Numeric franchise IDs are zero-padded to four digits (`3` → `0003`).
pub fn normalize_franchise_id(raw: &str) -> String {
    let raw = raw.trim();
    if !raw.is_empty() && raw.len() < 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        format!("{raw:0>4}")
    } else {
        raw.to_string()
    }
}

/// Help text returned by `/start` and `/help`.
pub const fn command_help() -> &'static str {
    "📋 Commands\n\n\
    /setuser <franchiseId> <user> - Map a franchise to a chat user\n\
    /clearuser <franchiseId> - Remove a franchise's mapping\n\
    /listusers - Show all mappings\n\
    /vacantusers - Franchises with no mapped user\n\
    /reloadusers - Reload mappings from disk\n\
    /franchises - List franchise IDs and names\n\
    /reload - Refetch franchise and player names"
}

/// `(command, description)` pairs for the chat's command menu.
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("setuser", "Map a franchise to a chat user"),
        ("clearuser", "Remove a franchise's mapping"),
        ("listusers", "Show all mappings"),
        ("vacantusers", "Franchises with no mapped user"),
        ("reloadusers", "Reload mappings from disk"),
        ("franchises", "List franchise IDs and names"),
        ("reload", "Refetch franchise and player names"),
        ("help", "Show all commands"),
    ]
}

/// Executes admin commands against the shared context.
#[derive(Clone)]
pub struct CommandHandler {
    ctx: Arc<BotContext>,
    client: Arc<MflClient>,
}

impl CommandHandler {
    pub fn new(ctx: Arc<BotContext>, client: Arc<MflClient>) -> Self {
        Self { ctx, client }
    }

    /// Replies for a chat message, or `None` if it is not a command.
    pub async fn respond(&self, text: &str) -> Option<Vec<String>> {
        match parse_command(text) {
            Ok(command) => Some(self.execute(command).await),
            Err(CommandError::NotACommand) => None,
            Err(err) => Some(vec![format!("⚠️ Invalid command: {err}\n\n{}", command_help())]),
        }
    }

    /// Run a command. Errors are rendered into the reply.
    pub async fn execute(&self, command: AdminCommand) -> Vec<String> {
        let result = match command {
            AdminCommand::Help => Ok(vec![command_help().to_string()]),
            AdminCommand::SetUser { franchise, user } => self.set_user(&franchise, &user),
            AdminCommand::ClearUser { franchise } => self.clear_user(&franchise),
            AdminCommand::ListUsers => Ok(self.list_users()),
            AdminCommand::ReloadUsers => self.reload_users(),
            AdminCommand::VacantUsers => Ok(self.vacant_users()),
            AdminCommand::Franchises => Ok(self.franchise_list()),
            AdminCommand::Reload => Ok(self.reload().await),
        };
        result.unwrap_or_else(|err| vec![format!("⚠️ {err}")])
    }

    fn set_user(&self, franchise: &str, user: &str) -> Result<Vec<String>, CommandError> {
        let franchises = self.ctx.franchises();
        let previous = self.ctx.users().set(franchise, user, &franchises)?;
        let name = franchises.display_name(franchise);
        info!(franchise, user, "User mapping set");
        Ok(vec![match previous {
            Some(prev) => format!("✅ {franchise} {name}: {user} (was {prev})"),
            None => format!("✅ {franchise} {name}: {user}"),
        }])
    }

    fn list_users(&self) -> Vec<String> {
        let franchises = self.ctx.franchises();
        self.ctx.users().list_pages(&franchises)
    }

    fn clear_user(&self, franchise: &str) -> Result<Vec<String>, CommandError> {
        let removed = self.ctx.users().clear(franchise)?;
        Ok(vec![match removed {
            Some(user) => {
                info!(franchise, "User mapping cleared");
                format!("🗑️ Cleared {franchise} (was {user})")
            }
            None => format!("{franchise} has no mapped user"),
        }])
    }

    fn reload_users(&self) -> Result<Vec<String>, CommandError> {
        let count = self.ctx.users().reload()?;
        Ok(vec![format!("🔄 Reloaded {count} user mapping(s)")])
    }

    fn vacant_users(&self) -> Vec<String> {
        let franchises = self.ctx.franchises();
        let users = self.ctx.users();
        let lines: Vec<String> = users
            .vacant(&franchises)
            .into_iter()
            .map(|(id, name)| format!("{id} {name}"))
            .collect();
        paginate("🪑 Franchises without a user", &lines, LIST_PAGE_SIZE)
    }

    fn franchise_list(&self) -> Vec<String> {
        let lines: Vec<String> = self
            .ctx
            .franchises()
            .sorted()
            .into_iter()
            .map(|(id, name)| format!("{id} {name}"))
            .collect();
        paginate("🏟️ Franchises", &lines, LIST_PAGE_SIZE)
    }

    async fn reload(&self) -> Vec<String> {
        let franchises = load_franchises(&self.ctx, &self.client).await;
        let players = load_players(&self.ctx, &self.client).await;
        let describe = |what: &str, result: anyhow::Result<usize>| match result {
            Ok(n) => format!("🔄 Loaded {n} {what}"),
            Err(e) => {
                warn!("{e:#}");
                format!("⚠️ {what}: {e:#} (kept previous data)")
            }
        };
        vec![format!(
            "{}\n{}",
            describe("franchises", franchises),
            describe("players", players)
        )]
    }
}
