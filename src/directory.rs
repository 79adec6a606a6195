use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::{MflClient, RawFranchise, RawPlayer};
use crate::context::BotContext;

/// Franchise ID → display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FranchiseDirectory {
    names: HashMap<String, String>,
}

impl FranchiseDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(franchises: &[RawFranchise]) -> Self {
        let mut dir = Self::new();
        for f in franchises {
            if f.id.trim().is_empty() {
                continue;
            }
            dir.insert(f.id.trim(), f.name.trim());
        }
        dir
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.names.contains_key(id)
    }

    /// Name for display, falling back to `Team <id>` for unknown franchises.
    pub fn display_name(&self, id: &str) -> String {
        match self.get(id) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Team {id}"),
        }
    }

    /// All entries ordered by franchise ID.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .names
            .iter()
            .map(|(id, name)| (id.as_str(), name.as_str()))
            .collect();
        entries.sort_unstable();
        entries
    }

    /// Overlay `other` onto this directory. Existing IDs take the new name.
    pub fn merge(&mut self, other: FranchiseDirectory) {
        self.names.extend(other.names);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Player ID → display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerDirectory {
    names: HashMap<String, String>,
}

impl PlayerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(players: &[RawPlayer]) -> Self {
        let mut dir = Self::new();
        for p in players {
            if p.id.trim().is_empty() {
                continue;
            }
            dir.insert(p.id.trim(), display_player_name(&p.name));
        }
        dir
    }

    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Name for display, falling back to `Player #<id>` for unknown players.
    pub fn display_name(&self, id: &str) -> String {
        match self.get(id) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Player #{id}"),
        }
    }

    pub fn merge(&mut self, other: PlayerDirectory) {
        self.names.extend(other.names);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Provider names arrive as `Last, First`; show them as `First Last`.
fn display_player_name(raw: &str) -> String {
    match raw.split_once(", ") {
        Some((last, first)) if !first.trim().is_empty() => {
            format!("{} {}", first.trim(), last.trim())
        }
        _ => raw.trim().to_string(),
    }
}

/// Fetch the league's franchises and merge them into the shared directory.
///
/// On failure the existing directory is left untouched.
pub async fn load_franchises(ctx: &BotContext, client: &MflClient) -> Result<usize> {
    let league = client
        .fetch_league()
        .await
        .context("failed to fetch league franchises")?;
    let dir = FranchiseDirectory::from_raw(&league.franchises.franchise);
    let count = dir.len();
    ctx.merge_franchises(dir);
    info!("Loaded {count} franchise(s)");
    Ok(count)
}

/// Fetch the provider's player list and merge it into the shared directory.
///
/// On failure the existing directory is left untouched.
pub async fn load_players(ctx: &BotContext, client: &MflClient) -> Result<usize> {
    let players = client
        .fetch_players()
        .await
        .context("failed to fetch players")?;
    let dir = PlayerDirectory::from_raw(&players);
    let count = dir.len();
    ctx.merge_players(dir);
    info!("Loaded {count} player(s)");
    Ok(count)
}

/// Load both directories, logging (not propagating) individual failures.
pub async fn load_reference_data(ctx: &BotContext, client: &MflClient) {
    if let Err(e) = load_franchises(ctx, client).await {
        warn!("{e:#}");
    }
    if let Err(e) = load_players(ctx, client).await {
        warn!("{e:#}");
    }
}
