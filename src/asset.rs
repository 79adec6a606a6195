//! Decoding of the provider's opaque asset tokens.
//!
//! Trade payloads list what each side gave up as comma-separated tokens:
//! `DP_<round>_<pick>` for a current-season draft pick (both zero-based),
//! `FP_<franchise>_<year>_<round>` for a future pick, and bare numeric
//! player IDs. Tokens are classified once into an [`AssetRef`] and rendered
//! through an [`AssetFormatter`].

use std::str::FromStr;

use crate::directory::{FranchiseDirectory, PlayerDirectory};

/// A classified asset token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetRef<'a> {
    /// Current-season pick, zero-based round and pick.
    DraftPick { round: u32, pick: u32 },
    /// Future pick, one-based round.
    FuturePick {
        franchise: &'a str,
        year: u16,
        round: u32,
    },
    Player(&'a str),
    /// `DP_` prefix with unparseable numbers.
    MalformedDraftPick(&'a str),
    /// `FP_` prefix with missing or unparseable groups.
    MalformedFuturePick(&'a str),
    Opaque(&'a str),
}

/// Classify a raw token. Surrounding whitespace is ignored when matching a
/// known shape; an opaque token is kept exactly as given.
pub fn classify(raw: &str) -> AssetRef<'_> {
    let token = raw.trim();

    if let Some(rest) = token.strip_prefix("DP_") {
        return match parse_draft_pick(rest) {
            Some((round, pick)) => AssetRef::DraftPick { round, pick },
            None => AssetRef::MalformedDraftPick(token),
        };
    }

    if let Some(rest) = token.strip_prefix("FP_") {
        return match parse_future_pick(rest) {
            Some((franchise, year, round)) => AssetRef::FuturePick {
                franchise,
                year,
                round,
            },
            None => AssetRef::MalformedFuturePick(token),
        };
    }

    if is_digits(token) {
        return AssetRef::Player(token);
    }

    AssetRef::Opaque(raw)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Plain decimal digits only; `str::parse` alone would also take a `+` sign.
fn parse_digits<T: FromStr>(s: &str) -> Option<T> {
    is_digits(s).then(|| s.parse().ok())?
}

fn parse_draft_pick(rest: &str) -> Option<(u32, u32)> {
    let (round, pick) = rest.split_once('_')?;
    Some((parse_digits(round)?, parse_digits(pick)?))
}

fn parse_future_pick(rest: &str) -> Option<(&str, u16, u32)> {
    let mut parts = rest.splitn(3, '_');
    let franchise = parts.next().filter(|f| !f.is_empty())?;
    let year = parse_digits(parts.next()?)?;
    let round = parse_digits(parts.next()?)?;
    Some((franchise, year, round))
}

/// `1st`, `2nd`, `3rd`, everything else `<n>th`.
///
/// Only 1, 2 and 3 are special-cased: `21` renders as `21th`.
pub fn ordinal(n: u32) -> String {
    let suffix = match n {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Renders asset tokens against a snapshot of the reference directories.
#[derive(Clone, Copy)]
pub struct AssetFormatter<'a> {
    pub season: u16,
    pub franchises: &'a FranchiseDirectory,
    pub players: &'a PlayerDirectory,
}

impl<'a> AssetFormatter<'a> {
    pub fn new(
        season: u16,
        franchises: &'a FranchiseDirectory,
        players: &'a PlayerDirectory,
    ) -> Self {
        Self {
            season,
            franchises,
            players,
        }
    }

    pub fn franchise_name(&self, id: &str) -> String {
        self.franchises.display_name(id)
    }

    pub fn player_name(&self, id: &str) -> String {
        self.players.display_name(id)
    }

    /// Human-readable label for one token. Never fails.
    pub fn format(&self, token: &str) -> String {
        match classify(token) {
            AssetRef::DraftPick { round, pick } => format!(
                "{} {} Round Pick (Pick {})",
                self.season,
                ordinal(round.saturating_add(1)),
                pick.saturating_add(1)
            ),
            AssetRef::FuturePick {
                franchise,
                year,
                round,
            } => format!(
                "{year} {} Round Pick (from {})",
                ordinal(round),
                self.franchise_name(franchise)
            ),
            AssetRef::Player(id) => self.player_name(id),
            AssetRef::MalformedDraftPick(raw) => format!("Draft Pick ({raw})"),
            AssetRef::MalformedFuturePick(raw) => format!("Future Draft Pick ({raw})"),
            AssetRef::Opaque(raw) => raw.to_string(),
        }
    }

    /// Format every token and join with `, `.
    pub fn format_list(&self, tokens: &[String]) -> String {
        tokens
            .iter()
            .map(|t| self.format(t))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs() -> (FranchiseDirectory, PlayerDirectory) {
        let mut franchises = FranchiseDirectory::new();
        franchises.insert("0002", "Blitz Brigade");
        let mut players = PlayerDirectory::new();
        players.insert("1234", "Patrick Mahomes");
        (franchises, players)
    }

    // ── classify ───────────────────────────────────────────────────

    #[test]
    fn classify_shapes() {
        assert_eq!(
            classify("DP_00_05"),
            AssetRef::DraftPick { round: 0, pick: 5 }
        );
        assert_eq!(
            classify("FP_0002_2026_3"),
            AssetRef::FuturePick {
                franchise: "0002",
                year: 2026,
                round: 3
            }
        );
        assert_eq!(classify("4321"), AssetRef::Player("4321"));
        assert_eq!(
            classify("some_other_string"),
            AssetRef::Opaque("some_other_string")
        );
    }

    #[test]
    fn classify_malformed_picks() {
        assert_eq!(
            classify("DP_xx_05"),
            AssetRef::MalformedDraftPick("DP_xx_05")
        );
        assert_eq!(classify("DP_03"), AssetRef::MalformedDraftPick("DP_03"));
        assert_eq!(
            classify("FP_0002_20x6_3"),
            AssetRef::MalformedFuturePick("FP_0002_20x6_3")
        );
        assert_eq!(
            classify("FP_0002_2026"),
            AssetRef::MalformedFuturePick("FP_0002_2026")
        );
    }

    #[test]
    fn classify_trims_whitespace() {
        assert_eq!(classify(" 1234 "), AssetRef::Player("1234"));
        assert_eq!(classify(" x "), AssetRef::Opaque(" x "));
    }

    #[test]
    fn classify_rejects_signed_groups() {
        assert_eq!(
            classify("DP_+0_+5"),
            AssetRef::MalformedDraftPick("DP_+0_+5")
        );
        assert_eq!(
            classify("FP_0002_+2026_3"),
            AssetRef::MalformedFuturePick("FP_0002_+2026_3")
        );
        assert_eq!(classify("+1234"), AssetRef::Opaque("+1234"));
    }

    // ── ordinal ────────────────────────────────────────────────────

    #[test]
    fn ordinal_suffixes() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21th");
    }

    // ── format ─────────────────────────────────────────────────────

    #[test]
    fn format_current_season_pick() {
        let (f, p) = dirs();
        let fmt = AssetFormatter::new(2025, &f, &p);
        assert_eq!(fmt.format("DP_00_05"), "2025 1st Round Pick (Pick 6)");
        assert_eq!(fmt.format("DP_02_11"), "2025 3rd Round Pick (Pick 12)");
    }

    #[test]
    fn format_future_pick_known_and_unknown_team() {
        let (f, p) = dirs();
        let fmt = AssetFormatter::new(2025, &f, &p);
        assert_eq!(
            fmt.format("FP_0002_2026_3"),
            "2026 3rd Round Pick (from Blitz Brigade)"
        );
        assert_eq!(
            fmt.format("FP_0009_2027_1"),
            "2027 1st Round Pick (from Team 0009)"
        );
    }

    #[test]
    fn format_players() {
        let (f, p) = dirs();
        let fmt = AssetFormatter::new(2025, &f, &p);
        assert_eq!(fmt.format("1234"), "Patrick Mahomes");
        assert_eq!(fmt.format("4321"), "Player #4321");
    }

    #[test]
    fn format_opaque_verbatim() {
        let (f, p) = dirs();
        let fmt = AssetFormatter::new(2025, &f, &p);
        assert_eq!(fmt.format("some_other_string"), "some_other_string");
        assert_eq!(fmt.format(" spaced out "), " spaced out ");
    }

    #[test]
    fn format_signed_pick_degrades() {
        let (f, p) = dirs();
        let fmt = AssetFormatter::new(2025, &f, &p);
        assert_eq!(fmt.format("DP_+0_+5"), "Draft Pick (DP_+0_+5)");
    }

    #[test]
    fn format_malformed_degrades_with_label() {
        let (f, p) = dirs();
        let fmt = AssetFormatter::new(2025, &f, &p);
        assert_eq!(fmt.format("DP_xx_05"), "Draft Pick (DP_xx_05)");
        assert_eq!(
            fmt.format("FP_0002_year_3"),
            "Future Draft Pick (FP_0002_year_3)"
        );
    }

    #[test]
    fn format_huge_round_does_not_overflow() {
        let (f, p) = dirs();
        let fmt = AssetFormatter::new(2025, &f, &p);
        let label = fmt.format(&format!("DP_{}_{}", u32::MAX, u32::MAX));
        assert!(label.starts_with("2025 "));
    }

    #[test]
    fn format_list_joins() {
        let (f, p) = dirs();
        let fmt = AssetFormatter::new(2025, &f, &p);
        let tokens = vec!["1234".to_string(), "DP_01_00".to_string()];
        assert_eq!(
            fmt.format_list(&tokens),
            "Patrick Mahomes, 2025 2nd Round Pick (Pick 1)"
        );
    }
}
