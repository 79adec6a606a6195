//! Feed pollers: fetch, filter through the ledger, format, dispatch, sleep.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::api::MflClient;
use crate::context::BotContext;
use crate::dispatch::Dispatcher;
use crate::format::{render_draft_pick, render_on_clock_notice, render_transaction, upcoming_picks};
use crate::ledger::SeenLedger;
use crate::scheduler::Ticker;
use crate::types::{Announcement, DraftPick, Transaction, TransactionKind};

/// One provider feed as seen by a [`Poller`].
#[async_trait]
pub trait Feed: Send + Sync {
    type Event: Send + Sync;

    /// Short name used in logs and as the ledger file stem.
    fn name(&self) -> &'static str;

    /// Fetch the feed and decode it into events in provider order.
    /// Malformed entries are logged and left out.
    async fn fetch(&self) -> Result<Vec<Self::Event>>;

    /// Dedup key. `None` means the event is not announceable yet.
    fn event_id<'e>(&self, event: &'e Self::Event) -> Option<&'e str>;

    /// Announcements for `events[index]`; the whole batch is passed for
    /// formats that depend on neighbouring events.
    fn render(&self, ctx: &BotContext, events: &[Self::Event], index: usize) -> Vec<Announcement>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Fetching,
    Processing,
    Sleeping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Fetch failed; the ledger is unchanged and the cycle is retried next tick.
    FetchFailed,
    /// First fetch of a fresh ledger: this many IDs were recorded silently.
    Seeded(usize),
    /// This many new events were dispatched.
    Announced(usize),
}

/// Drives one feed. Owns that feed's ledger.
pub struct Poller<F: Feed> {
    feed: F,
    ledger: SeenLedger,
    ctx: Arc<BotContext>,
    dispatcher: Arc<dyn Dispatcher>,
    state: PollState,
    seed_pending: bool,
}

impl<F: Feed> Poller<F> {
    pub fn new(
        feed: F,
        ledger: SeenLedger,
        ctx: Arc<BotContext>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        Self {
            feed,
            ledger,
            ctx,
            dispatcher,
            state: PollState::Idle,
            seed_pending: false,
        }
    }

    /// When enabled and the ledger starts empty, the first successful fetch
    /// only records IDs so a fresh deployment does not replay history.
    pub fn seed_on_first_fetch(mut self, enabled: bool) -> Self {
        self.seed_pending = enabled && self.ledger.is_empty();
        self
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    pub fn ledger(&self) -> &SeenLedger {
        &self.ledger
    }

    /// Run one Fetching → Processing → Sleeping pass.
    pub async fn poll_cycle(&mut self) -> CycleOutcome {
        let name = self.feed.name();

        self.state = PollState::Fetching;
        let events = match self.feed.fetch().await {
            Ok(events) => events,
            Err(e) => {
                warn!(feed = name, "Fetch failed: {e:#}");
                self.state = PollState::Sleeping;
                return CycleOutcome::FetchFailed;
            }
        };

        self.state = PollState::Processing;
        let mut fresh = Vec::new();
        for (i, event) in events.iter().enumerate() {
            let Some(id) = self.feed.event_id(event) else {
                continue;
            };
            if self.ledger.has_seen(id) {
                continue;
            }
            self.ledger.mark_seen(id);
            fresh.push(i);
        }

        // Marked before dispatch: a crash after this point loses announcements
        // rather than repeating them.
        if let Err(e) = self.ledger.persist() {
            warn!(feed = name, "Failed to persist ledger: {e:#}");
        }

        if self.seed_pending {
            self.seed_pending = false;
            info!(feed = name, "Seeded ledger with {} existing event(s)", fresh.len());
            self.state = PollState::Sleeping;
            return CycleOutcome::Seeded(fresh.len());
        }

        if fresh.is_empty() {
            debug!(feed = name, "No new events ({} fetched)", events.len());
        }

        for &i in &fresh {
            let announcements = self.feed.render(&self.ctx, &events, i);
            for announcement in &announcements {
                if let Err(e) = self.dispatcher.send(announcement).await {
                    warn!(
                        feed = name,
                        chat_id = announcement.destination.chat_id(),
                        "Failed to send announcement: {e:#}"
                    );
                }
            }
        }

        if !fresh.is_empty() {
            info!(feed = name, "Announced {} new event(s)", fresh.len());
        }
        self.state = PollState::Sleeping;
        CycleOutcome::Announced(fresh.len())
    }

    /// Poll until the ticker reports shutdown. The first cycle runs immediately.
    pub async fn run(mut self, mut ticker: Ticker) {
        let name = self.feed.name();
        info!(
            feed = name,
            seen = self.ledger.len(),
            "Poller started (interval: {:?})",
            ticker.next_delay()
        );
        loop {
            self.state = PollState::Idle;
            self.poll_cycle().await;
            if !ticker.wait().await {
                break;
            }
        }
        info!(feed = name, "Poller stopped");
    }
}

// ── Transactions ───────────────────────────────────────────────────

/// Transactions of the given kinds, announced to one channel.
pub struct TransactionFeed {
    client: Arc<MflClient>,
    name: &'static str,
    kinds: &'static [TransactionKind],
    channel: i64,
}

impl TransactionFeed {
    pub fn new(
        client: Arc<MflClient>,
        name: &'static str,
        kinds: &'static [TransactionKind],
        channel: i64,
    ) -> Self {
        Self {
            client,
            name,
            kinds,
            channel,
        }
    }

    pub fn trades(client: Arc<MflClient>, channel: i64) -> Self {
        Self::new(client, "trades", &[TransactionKind::Trade], channel)
    }

    pub fn add_drop(client: Arc<MflClient>, channel: i64) -> Self {
        Self::new(
            client,
            "add_drop",
            &[TransactionKind::FreeAgent, TransactionKind::AuctionWin],
            channel,
        )
    }

    pub fn roster_moves(client: Arc<MflClient>, channel: i64) -> Self {
        Self::new(
            client,
            "roster_moves",
            &[TransactionKind::Taxi, TransactionKind::InjuredReserve],
            channel,
        )
    }
}

/// Decode raw entries, keeping those whose kind is in `kinds`.
pub fn select_transactions(
    feed: &str,
    raws: &[crate::api::RawTransaction],
    kinds: &[TransactionKind],
) -> Vec<Transaction> {
    raws.iter()
        .filter_map(|raw| match Transaction::from_raw(raw) {
            Ok(Some(tx)) => kinds.contains(&tx.kind()).then_some(tx),
            Ok(None) => None,
            Err(e) => {
                warn!(
                    feed,
                    kind = raw.kind.as_str(),
                    timestamp = raw.timestamp.as_deref().unwrap_or_default(),
                    "Skipping malformed transaction: {e}"
                );
                None
            }
        })
        .collect()
}

/// Channel announcement for one transaction.
pub fn transaction_announcement(ctx: &BotContext, tx: &Transaction, channel: i64) -> Announcement {
    let text = ctx.render(|fmt, _| render_transaction(tx, fmt));
    Announcement::channel(channel, text)
}

#[async_trait]
impl Feed for TransactionFeed {
    type Event = Transaction;

    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(&self) -> Result<Vec<Transaction>> {
        let raws = self.client.fetch_transactions().await?;
        Ok(select_transactions(self.name, &raws, self.kinds))
    }

    fn event_id<'e>(&self, event: &'e Transaction) -> Option<&'e str> {
        Some(event.timestamp())
    }

    fn render(&self, ctx: &BotContext, events: &[Transaction], index: usize) -> Vec<Announcement> {
        vec![transaction_announcement(ctx, &events[index], self.channel)]
    }
}

// ── Draft ──────────────────────────────────────────────────────────

/// Draft picks, announced to the draft channel.
pub struct DraftFeed {
    client: Arc<MflClient>,
    channel: i64,
}

impl DraftFeed {
    pub fn new(client: Arc<MflClient>, channel: i64) -> Self {
        Self { client, channel }
    }
}

/// Channel announcement for `picks[index]`, plus a direct message to the
/// owner now on the clock when that slot is still open and the owner's chat
/// ID is known.
pub fn draft_announcements(
    ctx: &BotContext,
    picks: &[DraftPick],
    index: usize,
    channel: i64,
) -> Vec<Announcement> {
    ctx.render(|fmt, users| {
        let franchises = fmt.franchises;
        let text = render_draft_pick(picks, index, fmt, |id| users.mention(id, franchises));
        let mut out = vec![Announcement::channel(channel, text)];

        if let (Some(next), _) = upcoming_picks(picks, index) {
            if !next.is_made() {
                if let Some(user) = users.user_chat_id(&next.franchise) {
                    out.push(Announcement::user(user, render_on_clock_notice(next, fmt)));
                }
            }
        }
        out
    })
}

#[async_trait]
impl Feed for DraftFeed {
    type Event = DraftPick;

    fn name(&self) -> &'static str {
        "draft"
    }

    async fn fetch(&self) -> Result<Vec<DraftPick>> {
        let units = self.client.fetch_draft_results().await?;
        let mut picks = Vec::new();
        for (unit, draft_unit) in units.iter().enumerate() {
            for raw in &draft_unit.draft_pick {
                match DraftPick::from_raw(raw, unit) {
                    Ok(pick) => picks.push(pick),
                    Err(e) => warn!(feed = "draft", "Skipping malformed draft pick: {e}"),
                }
            }
        }
        Ok(picks)
    }

    fn event_id<'e>(&self, event: &'e DraftPick) -> Option<&'e str> {
        event.event_id()
    }

    fn render(&self, ctx: &BotContext, events: &[DraftPick], index: usize) -> Vec<Announcement> {
        draft_announcements(ctx, events, index, self.channel)
    }
}
