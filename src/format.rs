//! Announcement text for transactions and draft picks.

use chrono::DateTime;

use crate::SEPARATOR;
use crate::asset::AssetFormatter;
use crate::types::{
    Acquisition, AuctionWin, DraftPick, FreeAgentMove, InjuredReserveMove, TaxiMove, Trade,
    Transaction,
};

/// Render a unix-seconds timestamp as `YYYY-MM-DD HH:MM UTC`.
pub fn format_timestamp(ts: &str) -> Option<String> {
    let secs: i64 = ts.trim().parse().ok()?;
    let dt = DateTime::from_timestamp(secs, 0)?;
    Some(dt.format("%Y-%m-%d %H:%M UTC").to_string())
}

fn push_time(lines: &mut Vec<String>, ts: &str) {
    if let Some(when) = format_timestamp(ts) {
        lines.push(format!("🕒 {when}"));
    }
}

pub fn render_transaction(tx: &Transaction, fmt: &AssetFormatter<'_>) -> String {
    match tx {
        Transaction::Trade(t) => render_trade(t, fmt),
        Transaction::FreeAgent(t) => render_free_agent(t, fmt),
        Transaction::AuctionWin(t) => render_auction(t, fmt),
        Transaction::Taxi(t) => render_taxi(t, fmt),
        Transaction::InjuredReserve(t) => render_injured_reserve(t, fmt),
    }
}

/// Both sides' assets, then the note, then the offer message, then the separator.
pub fn render_trade(trade: &Trade, fmt: &AssetFormatter<'_>) -> String {
    let mut lines = vec!["🚨 TRADE ALERT 🚨".to_string()];
    push_time(&mut lines, &trade.timestamp);

    if !trade.franchise_gave_up.is_empty() {
        lines.push(format!(
            "{} traded: {}",
            fmt.franchise_name(&trade.franchise),
            fmt.format_list(&trade.franchise_gave_up)
        ));
    }
    if !trade.counterparty_gave_up.is_empty() {
        lines.push(format!(
            "{} traded: {}",
            fmt.franchise_name(&trade.counterparty),
            fmt.format_list(&trade.counterparty_gave_up)
        ));
    }
    if let Some(note) = &trade.note {
        lines.push(format!("📝 Note: {note}"));
    }
    if let Some(message) = &trade.offer_message {
        lines.push(format!(
            "📬 Optional Message to Include With Trade Offer Email:\n> {message}"
        ));
    }
    lines.push(SEPARATOR.to_string());
    lines.join("\n")
}

pub fn render_free_agent(fa: &FreeAgentMove, fmt: &AssetFormatter<'_>) -> String {
    let title = match fa.method {
        Acquisition::FreeAgent => "📝 FREE AGENT MOVE",
        Acquisition::Waiver => "📋 WAIVER CLAIM",
        Acquisition::BlindBid => "💸 BLIND BID WAIVER",
    };
    let mut lines = vec![format!("{title}: {}", fmt.franchise_name(&fa.franchise))];
    push_time(&mut lines, &fa.timestamp);

    if !fa.added.is_empty() {
        let bid = fa
            .bid
            .map(|b| format!(" (bid ${b:.2})"))
            .unwrap_or_default();
        lines.push(format!("➕ Added: {}{bid}", fmt.format_list(&fa.added)));
    }
    if !fa.dropped.is_empty() {
        lines.push(format!("➖ Dropped: {}", fmt.format_list(&fa.dropped)));
    }
    lines.join("\n")
}

pub fn render_auction(win: &AuctionWin, fmt: &AssetFormatter<'_>) -> String {
    let mut lines = vec![format!(
        "🔨 AUCTION WON: {}",
        fmt.franchise_name(&win.franchise)
    )];
    push_time(&mut lines, &win.timestamp);
    let price = win
        .amount
        .map(|a| format!(" for ${a:.2}"))
        .unwrap_or_default();
    lines.push(format!("🏆 {}{price}", fmt.format(&win.player)));
    lines.join("\n")
}

pub fn render_taxi(taxi: &TaxiMove, fmt: &AssetFormatter<'_>) -> String {
    let mut lines = vec![format!(
        "🚕 TAXI SQUAD MOVE: {}",
        fmt.franchise_name(&taxi.franchise)
    )];
    push_time(&mut lines, &taxi.timestamp);
    if !taxi.promoted.is_empty() {
        lines.push(format!(
            "⬆️ Promoted from taxi: {}",
            fmt.format_list(&taxi.promoted)
        ));
    }
    if !taxi.demoted.is_empty() {
        lines.push(format!(
            "⬇️ Demoted to taxi: {}",
            fmt.format_list(&taxi.demoted)
        ));
    }
    lines.join("\n")
}

pub fn render_injured_reserve(ir: &InjuredReserveMove, fmt: &AssetFormatter<'_>) -> String {
    let mut lines = vec![format!(
        "🏥 INJURED RESERVE MOVE: {}",
        fmt.franchise_name(&ir.franchise)
    )];
    push_time(&mut lines, &ir.timestamp);
    if !ir.deactivated.is_empty() {
        lines.push(format!("🩹 Placed on IR: {}", fmt.format_list(&ir.deactivated)));
    }
    if !ir.activated.is_empty() {
        lines.push(format!(
            "✅ Activated from IR: {}",
            fmt.format_list(&ir.activated)
        ));
    }
    lines.join("\n")
}

/// The two slots after `index` in the same draft unit: on the clock, on deck.
pub fn upcoming_picks(
    picks: &[DraftPick],
    index: usize,
) -> (Option<&DraftPick>, Option<&DraftPick>) {
    let Some(current) = picks.get(index) else {
        return (None, None);
    };
    let mut following = picks[index + 1..]
        .iter()
        .filter(|p| p.unit == current.unit);
    (following.next(), following.next())
}

/// Announcement for `picks[index]`. `mention` resolves a franchise ID to the
/// name (or chat mention) shown on the clock / on deck lines.
pub fn render_draft_pick(
    picks: &[DraftPick],
    index: usize,
    fmt: &AssetFormatter<'_>,
    mention: impl Fn(&str) -> String,
) -> String {
    let pick = &picks[index];
    let player = pick
        .player
        .as_deref()
        .map(|p| fmt.format(p))
        .unwrap_or_else(|| "(no selection)".to_string());

    let mut lines = vec![
        format!(
            "🏈 DRAFT PICK: Round {}, Pick {} ({}.{:02})",
            pick.round, pick.pick, pick.round, pick.pick
        ),
        format!("{} selects {player}", fmt.franchise_name(&pick.franchise)),
    ];
    if let Some(comments) = &pick.comments {
        lines.push(format!("💬 {comments}"));
    }

    let (on_clock, on_deck) = upcoming_picks(picks, index);
    if let Some(next) = on_clock {
        lines.push(format!("⏰ Now on the clock: {}", mention(&next.franchise)));
    }
    if let Some(deck) = on_deck {
        lines.push(format!("👀 Next, on deck: {}", mention(&deck.franchise)));
    }
    lines.join("\n")
}

/// Direct message for the owner of the franchise now on the clock.
pub fn render_on_clock_notice(next: &DraftPick, fmt: &AssetFormatter<'_>) -> String {
    format!(
        "⏰ You're on the clock! {} holds Round {}, Pick {}.",
        fmt.franchise_name(&next.franchise),
        next.round,
        next.pick
    )
}

/// Split `lines` into messages of at most `per_page` entries under `title`.
pub fn paginate(title: &str, lines: &[String], per_page: usize) -> Vec<String> {
    if lines.is_empty() {
        return vec![format!("{title}: none")];
    }
    let chunks: Vec<&[String]> = lines.chunks(per_page.max(1)).collect();
    let total = chunks.len();
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let header = if total > 1 {
                format!("{title} ({}/{total})", i + 1)
            } else {
                title.to_string()
            };
            format!("{header}\n{}", chunk.join("\n"))
        })
        .collect()
}
