use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use teloxide::Bot;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use mfl_announcer::api::MflClient;
use mfl_announcer::command::CommandHandler;
use mfl_announcer::config::{AppConfig, CONFIG_PATH, StorageConfig};
use mfl_announcer::context::BotContext;
use mfl_announcer::directory::load_reference_data;
use mfl_announcer::dispatch::{Dispatcher, StdoutDispatcher};
use mfl_announcer::ledger::SeenLedger;
use mfl_announcer::poller::{DraftFeed, Feed, Poller, TransactionFeed};
use mfl_announcer::scheduler::Ticker;
use mfl_announcer::telegram::{TelegramDispatcher, run_command_listener};
use mfl_announcer::usermap::UserMap;

#[derive(Parser)]
#[command(name = "announcer", about = "MyFantasyLeague league activity announcer")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Print announcements to stdout instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Do not start the admin command listener
    #[arg(long)]
    no_commands: bool,
}

/// Everything a poller needs besides its feed.
struct PollerDeps {
    ctx: Arc<BotContext>,
    dispatcher: Arc<dyn Dispatcher>,
    shutdown: watch::Receiver<bool>,
    jitter: Duration,
    seed_on_start: bool,
}

fn spawn_poller<F: Feed + 'static>(
    feed: F,
    interval_secs: u64,
    storage: &StorageConfig,
    deps: &PollerDeps,
) -> Result<Option<JoinHandle<()>>> {
    let name = feed.name();
    if interval_secs == 0 {
        info!(feed = name, "Poller disabled");
        return Ok(None);
    }

    let ledger = match storage.seen_path(name) {
        Some(path) => SeenLedger::open(path)?,
        None => SeenLedger::in_memory(),
    };
    let poller = Poller::new(feed, ledger, deps.ctx.clone(), deps.dispatcher.clone())
        .seed_on_first_fetch(deps.seed_on_start);
    let ticker = Ticker::new(Duration::from_secs(interval_secs), deps.shutdown.clone())
        .with_jitter(deps.jitter);

    Ok(Some(tokio::spawn(poller.run(ticker))))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Load config
    let config = AppConfig::load(&args.config)?;
    info!("Loaded config from {}", args.config.display());

    let bot = match config.bot_token() {
        Some(token) => Some(Bot::new(token)),
        None if args.dry_run => None,
        None => anyhow::bail!(
            "No bot token: set {} or telegram.bot_token",
            mfl_announcer::config::BOT_TOKEN_ENV
        ),
    };

    let mode = if args.dry_run { "dry-run" } else { "live" };
    info!(
        "Starting announcer ({mode}) for league {} season {}",
        config.league.id, config.league.season
    );

    let client = Arc::new(MflClient::new(
        &config.league,
        config.settings.request_timeout(),
    )?);
    let users = UserMap::open(&config.storage.user_map_path).with_context(|| {
        format!(
            "failed to load user map {}",
            config.storage.user_map_path.display()
        )
    })?;
    info!("Loaded {} user mapping(s)", users.len());
    let ctx = Arc::new(BotContext::new(config.league.season, users));

    load_reference_data(&ctx, &client).await;

    let dispatcher: Arc<dyn Dispatcher> = match (&bot, args.dry_run) {
        (Some(bot), false) => Arc::new(TelegramDispatcher::new(bot.clone())),
        _ => Arc::new(StdoutDispatcher),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let deps = PollerDeps {
        ctx: ctx.clone(),
        dispatcher,
        shutdown: shutdown_rx,
        jitter: config.settings.jitter(),
        seed_on_start: config.settings.seed_on_start,
    };

    let settings = &config.settings;
    let channels = &config.channels;
    let storage = &config.storage;
    let handles: Vec<JoinHandle<()>> = [
        spawn_poller(
            TransactionFeed::trades(client.clone(), channels.transactions),
            settings.trades_poll_secs,
            storage,
            &deps,
        )?,
        spawn_poller(
            TransactionFeed::add_drop(client.clone(), channels.add_drop()),
            settings.add_drop_poll_secs,
            storage,
            &deps,
        )?,
        spawn_poller(
            TransactionFeed::roster_moves(client.clone(), channels.add_drop()),
            settings.roster_moves_poll_secs,
            storage,
            &deps,
        )?,
        spawn_poller(
            DraftFeed::new(client.clone(), channels.draft()),
            settings.draft_poll_secs,
            storage,
            &deps,
        )?,
    ]
    .into_iter()
    .flatten()
    .collect();

    if handles.is_empty() {
        warn!("Every poller is disabled; only admin commands will be served");
    }

    let listener = match bot {
        Some(bot) if !args.dry_run && !args.no_commands => {
            let handler = CommandHandler::new(ctx.clone(), client.clone());
            let admin_chat = config.telegram.admin_chat_id;
            Some(tokio::spawn(run_command_listener(bot, handler, admin_chat)))
        }
        _ => None,
    };

    info!("Running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("Shutting down...");

    shutdown_tx.send_replace(true);
    futures_util::future::join_all(handles).await;
    if let Some(listener) = listener {
        listener.abort();
    }

    info!("Stopped");
    Ok(())
}
