use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::MFL_DEFAULT_HOST;

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Environment variable that supplies (or overrides) the bot token.
pub const BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";

/// Top-level application config deserialized from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub league: LeagueConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    pub channels: ChannelsConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// League being followed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueConfig {
    pub id: String,
    pub season: u16,
    #[serde(default = "default_host")]
    pub host: String,
    /// Required by the provider for private leagues.
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_host() -> String {
    MFL_DEFAULT_HOST.to_string()
}

/// Chat credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    /// When set, admin commands are only accepted from this chat.
    #[serde(default)]
    pub admin_chat_id: Option<i64>,
}

/// Destination chats for announcements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelsConfig {
    pub transactions: i64,
    #[serde(default)]
    pub add_drop: Option<i64>,
    #[serde(default)]
    pub draft: Option<i64>,
    #[serde(default)]
    pub rookie: Option<i64>,
}

impl ChannelsConfig {
    pub fn add_drop(&self) -> i64 {
        self.add_drop.unwrap_or(self.transactions)
    }

    /// Rookie channel wins when configured, then draft, then transactions.
    pub fn draft(&self) -> i64 {
        self.rookie.or(self.draft).unwrap_or(self.transactions)
    }
}

/// Runtime settings. Intervals are in seconds; `0` disables that poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_trades_interval")]
    pub trades_poll_secs: u64,
    #[serde(default = "default_add_drop_interval")]
    pub add_drop_poll_secs: u64,
    #[serde(default = "default_roster_interval")]
    pub roster_moves_poll_secs: u64,
    #[serde(default = "default_draft_interval")]
    pub draft_poll_secs: u64,
    #[serde(default)]
    pub jitter_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Mark a fresh feed's history as seen instead of announcing it.
    #[serde(default = "default_true")]
    pub seed_on_start: bool,
}

fn default_trades_interval() -> u64 {
    60
}

fn default_add_drop_interval() -> u64 {
    60
}

fn default_roster_interval() -> u64 {
    300
}

fn default_draft_interval() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    15
}

fn default_true() -> bool {
    true
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            trades_poll_secs: default_trades_interval(),
            add_drop_poll_secs: default_add_drop_interval(),
            roster_moves_poll_secs: default_roster_interval(),
            draft_poll_secs: default_draft_interval(),
            jitter_secs: 0,
            request_timeout_secs: default_request_timeout(),
            seed_on_start: true,
        }
    }
}

impl SettingsConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_secs(self.jitter_secs)
    }
}

/// Where persistent state lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_user_map_path")]
    pub user_map_path: PathBuf,
    /// Directory for per-feed seen-ID files. In-memory only when unset.
    #[serde(default)]
    pub seen_dir: Option<PathBuf>,
}

fn default_user_map_path() -> PathBuf {
    PathBuf::from("user_map.json")
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            user_map_path: default_user_map_path(),
            seen_dir: None,
        }
    }
}

impl StorageConfig {
    /// Ledger file for one feed, if ledgers are persisted.
    pub fn seen_path(&self, feed: &str) -> Option<PathBuf> {
        self.seen_dir
            .as_ref()
            .map(|dir| dir.join(format!("{feed}.json")))
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Parse and validate TOML contents.
    pub fn parse(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.league.id.trim().is_empty() {
            anyhow::bail!("league.id must not be empty");
        }
        if self.league.season < 2000 {
            anyhow::bail!("league.season looks wrong: {}", self.league.season);
        }
        if self.settings.request_timeout_secs == 0 {
            anyhow::bail!("settings.request_timeout_secs must be positive");
        }
        Ok(())
    }

    /// Bot token from the environment, falling back to the config file.
    pub fn bot_token(&self) -> Option<String> {
        std::env::var(BOT_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| self.telegram.bot_token.clone())
    }
}
