use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::persist;

/// Event IDs already announced on one feed.
///
/// The set only grows. When backed by a file, the file holds every ID seen by
/// any previous run, and [`SeenLedger::persist`] rewrites it with the union.
#[derive(Debug, Default)]
pub struct SeenLedger {
    seen: HashSet<String>,
    path: Option<PathBuf>,
    dirty: bool,
}

impl SeenLedger {
    /// A ledger that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed ledger, loading previously seen IDs if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let seen = match persist::read_optional(&path)
            .with_context(|| format!("failed to read {}", path.display()))?
        {
            Some(contents) => {
                let ids: Vec<String> = serde_json::from_str(&contents)
                    .with_context(|| format!("failed to parse {}", path.display()))?;
                ids.into_iter().collect()
            }
            None => HashSet::new(),
        };
        debug!("Loaded {} seen ID(s) from {}", seen.len(), path.display());
        Ok(Self {
            seen,
            path: Some(path),
            dirty: false,
        })
    }

    pub fn has_seen(&self, event_id: &str) -> bool {
        self.seen.contains(event_id)
    }

    /// Record an ID. Returns `true` if it was not already present.
    pub fn mark_seen(&mut self, event_id: &str) -> bool {
        let inserted = self.seen.insert(event_id.to_string());
        self.dirty |= inserted;
        inserted
    }

    /// Flush new IDs to the backing file. A no-op for in-memory ledgers and
    /// when nothing changed; a failed write stays pending for the next call.
    pub fn persist(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }
        let mut ids: Vec<&String> = self.seen.iter().collect();
        ids.sort_unstable();
        persist::write_json(path, &ids)
            .with_context(|| format!("failed to write {}", path.display()))?;
        self.dirty = false;
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marked_ids_stay_seen() {
        let mut ledger = SeenLedger::in_memory();
        assert!(!ledger.has_seen("1700000000"));
        assert!(ledger.mark_seen("1700000000"));
        assert!(ledger.has_seen("1700000000"));
        assert!(!ledger.mark_seen("1700000000"));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn in_memory_persist_is_noop() {
        let mut ledger = SeenLedger::in_memory();
        ledger.mark_seen("1");
        ledger.persist().unwrap();
        assert!(ledger.path().is_none());
    }

    #[test]
    fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = SeenLedger::open(dir.path().join("trades.json")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn survives_restart_as_union() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.json");

        let mut first = SeenLedger::open(&path).unwrap();
        first.mark_seen("100");
        first.mark_seen("200");
        first.persist().unwrap();

        let mut second = SeenLedger::open(&path).unwrap();
        assert!(second.has_seen("100"));
        second.mark_seen("300");
        second.persist().unwrap();

        let third = SeenLedger::open(&path).unwrap();
        assert_eq!(third.len(), 3);
        assert!(third.has_seen("100") && third.has_seen("200") && third.has_seen("300"));
    }

    #[test]
    fn failed_write_retried_on_next_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trades.json");
        let mut ledger = SeenLedger::open(&path).unwrap();

        // A directory in place of the file makes the rename fail.
        std::fs::create_dir(&path).unwrap();
        ledger.mark_seen("100");
        ledger.mark_seen("200");
        assert!(ledger.persist().is_err());
        assert!(ledger.has_seen("100"));

        std::fs::remove_dir(&path).unwrap();
        ledger.mark_seen("300");
        ledger.persist().unwrap();

        let reopened = SeenLedger::open(&path).unwrap();
        assert_eq!(reopened.len(), 3);
        assert!(reopened.has_seen("100") && reopened.has_seen("200") && reopened.has_seen("300"));
    }

    #[test]
    fn pending_write_flushed_without_new_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        let mut ledger = SeenLedger::open(&path).unwrap();

        std::fs::create_dir(&path).unwrap();
        ledger.mark_seen("100");
        assert!(ledger.persist().is_err());

        std::fs::remove_dir(&path).unwrap();
        ledger.persist().unwrap();
        assert!(SeenLedger::open(&path).unwrap().has_seen("100"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = SeenLedger::open(&path).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse"));
    }
}
