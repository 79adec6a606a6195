//! MyFantasyLeague export API client and wire types.
//!
//! Every feed is fetched as JSON (`JSON=1`). Scalars arrive as strings. A
//! one-element list arrives as a bare object and an empty list may be missing,
//! which [`lenient_list`] absorbs. A list entry that does not decode is
//! logged and skipped; its siblings are kept.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};
use url::Url;

use crate::config::LeagueConfig;

/// Provider feeds addressable through the export endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedType {
    Transactions,
    DraftResults,
    League,
    Players,
    Injuries,
}

impl FeedType {
    pub const ALL: [FeedType; 5] = [
        FeedType::League,
        FeedType::Players,
        FeedType::Transactions,
        FeedType::DraftResults,
        FeedType::Injuries,
    ];

    /// Value of the `TYPE` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedType::Transactions => "transactions",
            FeedType::DraftResults => "draftResults",
            FeedType::League => "league",
            FeedType::Players => "players",
            FeedType::Injuries => "injuries",
        }
    }
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Decode a list that may arrive as a bare object, one entry at a time.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = match OneOrMany::<serde_json::Value>::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    };
    let entry = std::any::type_name::<T>().rsplit("::").next().unwrap_or("entry");
    Ok(values
        .into_iter()
        .enumerate()
        .filter_map(|(i, value)| match serde_json::from_value(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(entry, index = i, "Skipping malformed list entry: {e}");
                None
            }
        })
        .collect())
}

#[derive(Debug, Deserialize)]
pub struct LeagueExport {
    pub league: League,
}

#[derive(Debug, Default, Deserialize)]
pub struct League {
    #[serde(default)]
    pub franchises: Franchises,
}

#[derive(Debug, Default, Deserialize)]
pub struct Franchises {
    #[serde(default, deserialize_with = "lenient_list")]
    pub franchise: Vec<RawFranchise>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFranchise {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct PlayersExport {
    pub players: Players,
}

#[derive(Debug, Default, Deserialize)]
pub struct Players {
    #[serde(default, deserialize_with = "lenient_list")]
    pub player: Vec<RawPlayer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlayer {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct TransactionsExport {
    pub transactions: Transactions,
}

#[derive(Debug, Default, Deserialize)]
pub struct Transactions {
    #[serde(default, deserialize_with = "lenient_list")]
    pub transaction: Vec<RawTransaction>,
}

/// One entry of the transactions feed. Which fields are present depends on `kind`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTransaction {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub franchise: Option<String>,
    #[serde(default)]
    pub franchise2: Option<String>,
    #[serde(default)]
    pub franchise1_gave_up: Option<String>,
    #[serde(default)]
    pub franchise2_gave_up: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// `added|dropped` style payload for waiver, free-agent and auction moves.
    #[serde(default)]
    pub transaction: Option<String>,
    #[serde(default)]
    pub promoted: Option<String>,
    #[serde(default)]
    pub demoted: Option<String>,
    #[serde(default)]
    pub activated: Option<String>,
    #[serde(default)]
    pub deactivated: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DraftResultsExport {
    #[serde(rename = "draftResults")]
    pub draft_results: DraftResults,
}

#[derive(Debug, Default, Deserialize)]
pub struct DraftResults {
    #[serde(rename = "draftUnit", default, deserialize_with = "lenient_list")]
    pub draft_unit: Vec<DraftUnit>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DraftUnit {
    #[serde(rename = "draftPick", default, deserialize_with = "lenient_list")]
    pub draft_pick: Vec<RawDraftPick>,
}

/// One slot of the draft order. Unmade picks carry an empty `timestamp` and `player`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDraftPick {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub franchise: Option<String>,
    #[serde(default)]
    pub round: Option<String>,
    #[serde(default)]
    pub pick: Option<String>,
    #[serde(default)]
    pub player: Option<String>,
    #[serde(default)]
    pub comments: Option<String>,
}

// ── Client ─────────────────────────────────────────────────────────

/// Client for one league's export endpoint.
pub struct MflClient {
    http: reqwest::Client,
    host: String,
    league_id: String,
    season: u16,
    api_key: Option<String>,
}

impl MflClient {
    pub fn new(league: &LeagueConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mfl-announcer/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            host: league.host.trim_end_matches('/').to_string(),
            league_id: league.id.clone(),
            season: league.season,
            api_key: league.api_key.clone(),
        })
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    /// `<host>/<season>/export?TYPE=<feed>&L=<league>&JSON=1[&APIKEY=..]`
    pub fn export_url(&self, feed: FeedType) -> Result<Url> {
        let mut url = Url::parse(&format!("{}/{}/export", self.host, self.season))
            .with_context(|| format!("invalid provider host {}", self.host))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("TYPE", feed.as_str())
                .append_pair("L", &self.league_id)
                .append_pair("JSON", "1");
            if let Some(key) = &self.api_key {
                query.append_pair("APIKEY", key);
            }
        }
        Ok(url)
    }

    async fn fetch_body(&self, feed: FeedType) -> Result<String> {
        let url = self.export_url(feed)?;
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("{} request failed", feed.as_str()))?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("{} request returned HTTP {status}", feed.as_str());
        }
        let body = resp
            .text()
            .await
            .with_context(|| format!("failed to read {} response", feed.as_str()))?;
        debug!("Fetched {} ({} bytes)", feed.as_str(), body.len());
        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(&self, feed: FeedType) -> Result<T> {
        let body = self.fetch_body(feed).await?;
        serde_json::from_str(&body)
            .with_context(|| format!("unexpected {} payload", feed.as_str()))
    }

    /// Raw JSON body of any feed, for probing payload shapes.
    pub async fn fetch_raw(&self, feed: FeedType) -> Result<serde_json::Value> {
        self.fetch(feed).await
    }

    pub async fn fetch_league(&self) -> Result<League> {
        let export: LeagueExport = self.fetch(FeedType::League).await?;
        Ok(export.league)
    }

    pub async fn fetch_players(&self) -> Result<Vec<RawPlayer>> {
        let export: PlayersExport = self.fetch(FeedType::Players).await?;
        Ok(export.players.player)
    }

    /// Recent transactions, in the order the provider lists them.
    pub async fn fetch_transactions(&self) -> Result<Vec<RawTransaction>> {
        let export: TransactionsExport = self.fetch(FeedType::Transactions).await?;
        debug!(
            "Fetched {} transaction(s)",
            export.transactions.transaction.len()
        );
        Ok(export.transactions.transaction)
    }

    pub async fn fetch_draft_results(&self) -> Result<Vec<DraftUnit>> {
        let export: DraftResultsExport = self.fetch(FeedType::DraftResults).await?;
        Ok(export.draft_results.draft_unit)
    }
}
