pub mod api;
pub mod asset;
pub mod command;
pub mod config;
pub mod context;
pub mod directory;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod ledger;
pub mod persist;
pub mod poller;
pub mod scheduler;
pub mod telegram;
pub mod types;
pub mod usermap;

/// Default MyFantasyLeague host serving the export API.
pub const MFL_DEFAULT_HOST: &str = "https://www43.myfantasyleague.com";

/// Maximum number of entries rendered into one chat message by list commands.
pub const LIST_PAGE_SIZE: usize = 25;

/// Line appended after every trade announcement.
pub const SEPARATOR: &str = "──────────────────────";
