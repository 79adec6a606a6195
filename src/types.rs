use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::{RawDraftPick, RawTransaction};
use crate::error::ParseError;

/// Where an announcement goes. Both are Telegram chat IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Destination {
    Channel(i64),
    User(i64),
}

impl Destination {
    pub fn chat_id(&self) -> i64 {
        match self {
            Destination::Channel(id) | Destination::User(id) => *id,
        }
    }
}

/// A formatted message ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Announcement {
    pub destination: Destination,
    pub text: String,
}

impl Announcement {
    pub fn channel(id: i64, text: impl Into<String>) -> Self {
        Self {
            destination: Destination::Channel(id),
            text: text.into(),
        }
    }

    pub fn user(id: i64, text: impl Into<String>) -> Self {
        Self {
            destination: Destination::User(id),
            text: text.into(),
        }
    }
}

// ── Transactions ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Trade,
    FreeAgent,
    AuctionWin,
    Taxi,
    InjuredReserve,
}

/// How a free-agent style move was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    FreeAgent,
    Waiver,
    BlindBid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub timestamp: String,
    pub franchise: String,
    pub counterparty: String,
    pub franchise_gave_up: Vec<String>,
    pub counterparty_gave_up: Vec<String>,
    pub note: Option<String>,
    pub offer_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FreeAgentMove {
    pub timestamp: String,
    pub franchise: String,
    pub method: Acquisition,
    pub added: Vec<String>,
    pub dropped: Vec<String>,
    pub bid: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuctionWin {
    pub timestamp: String,
    pub franchise: String,
    pub player: String,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaxiMove {
    pub timestamp: String,
    pub franchise: String,
    pub promoted: Vec<String>,
    pub demoted: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InjuredReserveMove {
    pub timestamp: String,
    pub franchise: String,
    pub activated: Vec<String>,
    pub deactivated: Vec<String>,
}

/// A league transaction. The timestamp doubles as the event ID.
#[derive(Debug, Clone, PartialEq)]
pub enum Transaction {
    Trade(Trade),
    FreeAgent(FreeAgentMove),
    AuctionWin(AuctionWin),
    Taxi(TaxiMove),
    InjuredReserve(InjuredReserveMove),
}

impl Transaction {
    pub fn timestamp(&self) -> &str {
        match self {
            Transaction::Trade(t) => &t.timestamp,
            Transaction::FreeAgent(t) => &t.timestamp,
            Transaction::AuctionWin(t) => &t.timestamp,
            Transaction::Taxi(t) => &t.timestamp,
            Transaction::InjuredReserve(t) => &t.timestamp,
        }
    }

    pub fn franchise(&self) -> &str {
        match self {
            Transaction::Trade(t) => &t.franchise,
            Transaction::FreeAgent(t) => &t.franchise,
            Transaction::AuctionWin(t) => &t.franchise,
            Transaction::Taxi(t) => &t.franchise,
            Transaction::InjuredReserve(t) => &t.franchise,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Trade(_) => TransactionKind::Trade,
            Transaction::FreeAgent(_) => TransactionKind::FreeAgent,
            Transaction::AuctionWin(_) => TransactionKind::AuctionWin,
            Transaction::Taxi(_) => TransactionKind::Taxi,
            Transaction::InjuredReserve(_) => TransactionKind::InjuredReserve,
        }
    }

    /// Classify a raw feed entry. Unrecognized types yield `Ok(None)`.
    pub fn from_raw(raw: &RawTransaction) -> Result<Option<Self>, ParseError> {
        let method = match raw.kind.as_str() {
            "TRADE" => return parse_trade(raw).map(|t| Some(Transaction::Trade(t))),
            "AUCTION_WON" => {
                return parse_auction(raw).map(|t| Some(Transaction::AuctionWin(t)));
            }
            "TAXI" => {
                return Ok(Some(Transaction::Taxi(TaxiMove {
                    timestamp: required(&raw.timestamp, "timestamp")?,
                    franchise: required(&raw.franchise, "franchise")?,
                    promoted: split_list(raw.promoted.as_deref()),
                    demoted: split_list(raw.demoted.as_deref()),
                })));
            }
            "IR" => {
                return Ok(Some(Transaction::InjuredReserve(InjuredReserveMove {
                    timestamp: required(&raw.timestamp, "timestamp")?,
                    franchise: required(&raw.franchise, "franchise")?,
                    activated: split_list(raw.activated.as_deref()),
                    deactivated: split_list(raw.deactivated.as_deref()),
                })));
            }
            "FREE_AGENT" => Acquisition::FreeAgent,
            "WAIVER" => Acquisition::Waiver,
            "BBID_WAIVER" => Acquisition::BlindBid,
            _ => return Ok(None),
        };
        parse_free_agent(raw, method).map(|t| Some(Transaction::FreeAgent(t)))
    }
}

fn parse_trade(raw: &RawTransaction) -> Result<Trade, ParseError> {
    Ok(Trade {
        timestamp: required(&raw.timestamp, "timestamp")?,
        franchise: required(&raw.franchise, "franchise")?,
        counterparty: required(&raw.franchise2, "franchise2")?,
        franchise_gave_up: split_list(raw.franchise1_gave_up.as_deref()),
        counterparty_gave_up: split_list(raw.franchise2_gave_up.as_deref()),
        note: non_blank(raw.comments.as_deref()),
        offer_message: non_blank(raw.message.as_deref()),
    })
}

/// `added,..|dropped,..`, or `added,..|<bid>|dropped,..` for blind bids.
fn parse_free_agent(
    raw: &RawTransaction,
    method: Acquisition,
) -> Result<FreeAgentMove, ParseError> {
    let timestamp = required(&raw.timestamp, "timestamp")?;
    let franchise = required(&raw.franchise, "franchise")?;
    let payload = raw.transaction.as_deref().unwrap_or_default();
    let segments: Vec<&str> = payload.split('|').collect();

    let (added, bid, dropped) = match segments.as_slice() {
        [added, bid, dropped, ..] => (*added, parse_amount(bid, "bid")?, *dropped),
        [added, dropped] => (*added, None, *dropped),
        [added] => (*added, None, ""),
        [] => ("", None, ""),
    };

    Ok(FreeAgentMove {
        timestamp,
        franchise,
        method,
        added: split_list(Some(added)),
        dropped: split_list(Some(dropped)),
        bid,
    })
}

/// `<player>|<amount>|`
fn parse_auction(raw: &RawTransaction) -> Result<AuctionWin, ParseError> {
    let timestamp = required(&raw.timestamp, "timestamp")?;
    let franchise = required(&raw.franchise, "franchise")?;
    let payload = raw.transaction.as_deref().unwrap_or_default();
    let mut segments = payload.split('|');
    let player = segments
        .next()
        .map(|p| p.trim().trim_end_matches(','))
        .filter(|p| !p.is_empty())
        .ok_or(ParseError::MissingField("transaction"))?
        .to_string();
    let amount = match segments.next() {
        Some(a) => parse_amount(a, "amount")?,
        None => None,
    };
    Ok(AuctionWin {
        timestamp,
        franchise,
        player,
        amount,
    })
}

fn parse_amount(raw: &str, field: &'static str) -> Result<Option<Decimal>, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<Decimal>()
        .map(Some)
        .map_err(|_| ParseError::InvalidNumber {
            field,
            value: raw.to_string(),
        })
}

// ── Draft ──────────────────────────────────────────────────────────

/// One slot in the draft order. Only made picks have a timestamp and player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftPick {
    pub timestamp: Option<String>,
    pub franchise: String,
    pub player: Option<String>,
    pub round: u32,
    pub pick: u32,
    pub comments: Option<String>,
    /// Index of the draft unit (division) this slot belongs to.
    pub unit: usize,
}

impl DraftPick {
    pub fn from_raw(raw: &RawDraftPick, unit: usize) -> Result<Self, ParseError> {
        Ok(Self {
            timestamp: non_blank(raw.timestamp.as_deref()),
            franchise: required(&raw.franchise, "franchise")?,
            player: non_blank(raw.player.as_deref()),
            round: parse_number(raw.round.as_deref(), "round")?,
            pick: parse_number(raw.pick.as_deref(), "pick")?,
            comments: non_blank(raw.comments.as_deref()),
            unit,
        })
    }

    /// The event ID of a made pick.
    pub fn event_id(&self) -> Option<&str> {
        match (&self.timestamp, &self.player) {
            (Some(ts), Some(_)) => Some(ts),
            _ => None,
        }
    }

    pub fn is_made(&self) -> bool {
        self.event_id().is_some()
    }
}

fn parse_number(raw: Option<&str>, field: &'static str) -> Result<u32, ParseError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingField(field))?;
    raw.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

// ── Helpers ────────────────────────────────────────────────────────

fn required(value: &Option<String>, field: &'static str) -> Result<String, ParseError> {
    non_blank(value.as_deref()).ok_or(ParseError::MissingField(field))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Split a provider comma list (`"a,b,"`) into its non-empty items.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn raw(kind: &str) -> RawTransaction {
        RawTransaction {
            kind: kind.to_string(),
            timestamp: Some("1700000000".to_string()),
            franchise: Some("0001".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn split_list_drops_trailing_comma() {
        assert_eq!(split_list(Some("DP_00_05,1234,")), vec!["DP_00_05", "1234"]);
        assert!(split_list(Some(",")).is_empty());
        assert!(split_list(None).is_empty());
    }

    #[test]
    fn trade_parsed() {
        let mut r = raw("TRADE");
        r.franchise2 = Some("0002".to_string());
        r.franchise1_gave_up = Some("DP_00_00,".to_string());
        r.franchise2_gave_up = Some("1234,".to_string());
        r.comments = Some("  no contingencies ".to_string());
        r.message = Some("".to_string());

        let Some(Transaction::Trade(trade)) = Transaction::from_raw(&r).unwrap() else {
            panic!("expected trade");
        };
        assert_eq!(trade.counterparty, "0002");
        assert_eq!(trade.franchise_gave_up, vec!["DP_00_00"]);
        assert_eq!(trade.counterparty_gave_up, vec!["1234"]);
        assert_eq!(trade.note.as_deref(), Some("no contingencies"));
        assert!(trade.offer_message.is_none());
    }

    #[test]
    fn trade_without_counterparty_is_malformed() {
        let r = raw("TRADE");
        assert_eq!(
            Transaction::from_raw(&r),
            Err(ParseError::MissingField("franchise2"))
        );
    }

    #[test]
    fn unknown_type_ignored() {
        assert_eq!(Transaction::from_raw(&raw("SURVIVOR_PICK")), Ok(None));
    }

    #[test]
    fn missing_timestamp_is_malformed() {
        let mut r = raw("TAXI");
        r.timestamp = None;
        assert_eq!(
            Transaction::from_raw(&r),
            Err(ParseError::MissingField("timestamp"))
        );
    }

    #[test]
    fn free_agent_add_and_drop() {
        let mut r = raw("FREE_AGENT");
        r.transaction = Some("13604,|10697,".to_string());
        let Some(Transaction::FreeAgent(fa)) = Transaction::from_raw(&r).unwrap() else {
            panic!("expected free agent move");
        };
        assert_eq!(fa.method, Acquisition::FreeAgent);
        assert_eq!(fa.added, vec!["13604"]);
        assert_eq!(fa.dropped, vec!["10697"]);
        assert!(fa.bid.is_none());
    }

    #[test]
    fn free_agent_drop_only() {
        let mut r = raw("FREE_AGENT");
        r.transaction = Some("|10697,".to_string());
        let Some(Transaction::FreeAgent(fa)) = Transaction::from_raw(&r).unwrap() else {
            panic!("expected free agent move");
        };
        assert!(fa.added.is_empty());
        assert_eq!(fa.dropped, vec!["10697"]);
    }

    #[test]
    fn blind_bid_carries_amount() {
        let mut r = raw("BBID_WAIVER");
        r.transaction = Some("13604,|12.50|10697,".to_string());
        let Some(Transaction::FreeAgent(fa)) = Transaction::from_raw(&r).unwrap() else {
            panic!("expected blind bid");
        };
        assert_eq!(fa.method, Acquisition::BlindBid);
        assert_eq!(fa.bid, Some(dec!(12.50)));
        assert_eq!(fa.dropped, vec!["10697"]);
    }

    #[test]
    fn blind_bid_with_garbage_amount_is_malformed() {
        let mut r = raw("BBID_WAIVER");
        r.transaction = Some("13604,|lots|".to_string());
        assert!(matches!(
            Transaction::from_raw(&r),
            Err(ParseError::InvalidNumber { field: "bid", .. })
        ));
    }

    #[test]
    fn auction_won() {
        let mut r = raw("AUCTION_WON");
        r.transaction = Some("14113|5.00|".to_string());
        let Some(Transaction::AuctionWin(win)) = Transaction::from_raw(&r).unwrap() else {
            panic!("expected auction win");
        };
        assert_eq!(win.player, "14113");
        assert_eq!(win.amount, Some(dec!(5.00)));
    }

    #[test]
    fn taxi_and_ir_lists() {
        let mut taxi = raw("TAXI");
        taxi.promoted = Some("1111,".to_string());
        taxi.demoted = Some("2222,3333,".to_string());
        let Some(Transaction::Taxi(t)) = Transaction::from_raw(&taxi).unwrap() else {
            panic!("expected taxi move");
        };
        assert_eq!(t.promoted, vec!["1111"]);
        assert_eq!(t.demoted, vec!["2222", "3333"]);

        let mut ir = raw("IR");
        ir.deactivated = Some("4444,".to_string());
        let Some(Transaction::InjuredReserve(m)) = Transaction::from_raw(&ir).unwrap() else {
            panic!("expected IR move");
        };
        assert!(m.activated.is_empty());
        assert_eq!(m.deactivated, vec!["4444"]);
        assert_eq!(
            Transaction::InjuredReserve(m).kind(),
            TransactionKind::InjuredReserve
        );
    }

    #[test]
    fn draft_pick_made_and_unmade() {
        let made = DraftPick::from_raw(
            &RawDraftPick {
                timestamp: Some("1700000000".to_string()),
                franchise: Some("0001".to_string()),
                round: Some("01".to_string()),
                pick: Some("06".to_string()),
                player: Some("1234".to_string()),
                comments: Some(String::new()),
            },
            0,
        )
        .unwrap();
        assert_eq!(made.round, 1);
        assert_eq!(made.pick, 6);
        assert_eq!(made.event_id(), Some("1700000000"));
        assert!(made.comments.is_none());

        let unmade = DraftPick::from_raw(
            &RawDraftPick {
                timestamp: Some(String::new()),
                franchise: Some("0002".to_string()),
                round: Some("01".to_string()),
                pick: Some("07".to_string()),
                player: Some(String::new()),
                comments: None,
            },
            0,
        )
        .unwrap();
        assert!(!unmade.is_made());
    }

    #[test]
    fn draft_pick_bad_round() {
        let err = DraftPick::from_raw(
            &RawDraftPick {
                franchise: Some("0001".to_string()),
                round: Some("first".to_string()),
                pick: Some("01".to_string()),
                ..Default::default()
            },
            0,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                field: "round",
                value: "first".to_string()
            }
        );
    }

    #[test]
    fn destination_serializes_tagged() {
        let json = serde_json::to_string(&Announcement::channel(-100, "hi")).unwrap();
        assert_eq!(
            json,
            r#"{"destination":{"kind":"channel","id":-100},"text":"hi"}"#
        );
    }
}
