use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::LIST_PAGE_SIZE;
use crate::directory::FranchiseDirectory;
use crate::error::UserMapError;
use crate::format::paginate;
use crate::persist;

/// Franchise ID → chat user, persisted after every mutation.
///
/// A user value is either a username (`@alice` or `alice`) or a numeric chat
/// user ID. Mutations are all-or-nothing: the in-memory map only changes once
/// the new contents are on disk.
#[derive(Debug, Default)]
pub struct UserMap {
    entries: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl UserMap {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the map at `path`. A missing file yields an empty map.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, UserMapError> {
        let path = path.into();
        let entries = read_entries(&path)?;
        Ok(Self {
            entries,
            path: Some(path),
        })
    }

    pub fn get(&self, franchise: &str) -> Option<&str> {
        self.entries.get(franchise).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Map a franchise to a user. Returns the previous user, if any.
    pub fn set(
        &mut self,
        franchise: &str,
        user: &str,
        directory: &FranchiseDirectory,
    ) -> Result<Option<String>, UserMapError> {
        if !directory.contains(franchise) {
            return Err(UserMapError::UnknownFranchise(franchise.to_string()));
        }
        let mut next = self.entries.clone();
        let previous = next.insert(franchise.to_string(), user.to_string());
        self.commit(next)?;
        Ok(previous)
    }

    /// Remove a franchise's mapping. Returns the removed user, if any.
    pub fn clear(&mut self, franchise: &str) -> Result<Option<String>, UserMapError> {
        if !self.entries.contains_key(franchise) {
            return Ok(None);
        }
        let mut next = self.entries.clone();
        let removed = next.remove(franchise);
        self.commit(next)?;
        Ok(removed)
    }

    /// Replace the in-memory map with the file contents.
    pub fn reload(&mut self) -> Result<usize, UserMapError> {
        let path = self.path.as_ref().ok_or(UserMapError::NotPersisted)?;
        let entries = read_entries(path)?;
        self.entries = entries;
        info!("Reloaded {} user mapping(s)", self.entries.len());
        Ok(self.entries.len())
    }

    fn commit(&mut self, next: BTreeMap<String, String>) -> Result<(), UserMapError> {
        if let Some(path) = &self.path {
            persist::write_json(path, &next).map_err(|source| UserMapError::Write {
                path: path.clone(),
                source,
            })?;
        }
        self.entries = next;
        Ok(())
    }

    /// `franchise → user` lines, at most [`LIST_PAGE_SIZE`] per message.
    pub fn list_pages(&self, directory: &FranchiseDirectory) -> Vec<String> {
        let lines: Vec<String> = self
            .entries
            .iter()
            .map(|(id, user)| format!("{id} {}: {user}", directory.display_name(id)))
            .collect();
        paginate("👥 User mappings", &lines, LIST_PAGE_SIZE)
    }

    /// Known franchises with no mapped user, ordered by ID.
    pub fn vacant<'d>(&self, directory: &'d FranchiseDirectory) -> Vec<(&'d str, &'d str)> {
        directory
            .sorted()
            .into_iter()
            .filter(|(id, _)| !self.entries.contains_key(*id))
            .collect()
    }

    /// How to refer to a franchise in an announcement.
    ///
    /// Usernames become `Name (@user)`; unmapped franchises and numeric user
    /// IDs, which plain text cannot mention, fall back to the display name.
    pub fn mention(&self, franchise: &str, directory: &FranchiseDirectory) -> String {
        let name = directory.display_name(franchise);
        match self.get(franchise).map(str::trim) {
            Some(user) if !user.is_empty() && !is_numeric(user) => {
                let handle = user.trim_start_matches('@');
                format!("{name} (@{handle})")
            }
            _ => name,
        }
    }

    /// Chat ID for direct messages, if the mapped user is numeric.
    pub fn user_chat_id(&self, franchise: &str) -> Option<i64> {
        self.get(franchise)?.trim().parse().ok()
    }
}

fn is_numeric(s: &str) -> bool {
    s.parse::<i64>().is_ok()
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, UserMapError> {
    let contents = persist::read_optional(path).map_err(|source| UserMapError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    match contents {
        Some(contents) => {
            serde_json::from_str(&contents).map_err(|source| UserMapError::Parse {
                path: path.to_path_buf(),
                source,
            })
        }
        None => Ok(BTreeMap::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> FranchiseDirectory {
        let mut dir = FranchiseDirectory::new();
        dir.insert("0001", "Gridiron Gang");
        dir.insert("0002", "Blitz Brigade");
        dir.insert("0003", "Sunday Funday");
        dir
    }

    #[test]
    fn set_rejects_unknown_franchise() {
        let mut map = UserMap::in_memory();
        let err = map.set("0099", "@alice", &directory()).unwrap_err();
        assert!(matches!(err, UserMapError::UnknownFranchise(id) if id == "0099"));
        assert!(map.is_empty());
    }

    #[test]
    fn set_persists_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_map.json");
        let mut map = UserMap::open(&path).unwrap();
        assert_eq!(map.set("0001", "@alice", &directory()).unwrap(), None);
        assert_eq!(
            map.set("0001", "@bob", &directory()).unwrap().as_deref(),
            Some("@alice")
        );

        let reopened = UserMap::open(&path).unwrap();
        assert_eq!(reopened.get("0001"), Some("@bob"));
    }

    #[test]
    fn failed_write_leaves_map_untouched() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in place of the file makes the rename fail.
        let path = dir.path().join("user_map.json");
        std::fs::create_dir(&path).unwrap();
        let mut map = UserMap {
            entries: BTreeMap::new(),
            path: Some(path),
        };
        assert!(matches!(
            map.set("0001", "@alice", &directory()),
            Err(UserMapError::Write { .. })
        ));
        assert!(map.get("0001").is_none());
    }

    #[test]
    fn clear_unmapped_is_noop() {
        let mut map = UserMap::in_memory();
        assert_eq!(map.clear("0001").unwrap(), None);
        map.set("0001", "@alice", &directory()).unwrap();
        assert_eq!(map.clear("0001").unwrap().as_deref(), Some("@alice"));
        assert!(map.is_empty());
    }

    #[test]
    fn reload_replaces_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_map.json");
        let mut map = UserMap::open(&path).unwrap();
        map.set("0001", "@alice", &directory()).unwrap();

        std::fs::write(&path, r#"{"0002": "@carol"}"#).unwrap();
        assert_eq!(map.reload().unwrap(), 1);
        assert!(map.get("0001").is_none());
        assert_eq!(map.get("0002"), Some("@carol"));
    }

    #[test]
    fn reload_failure_keeps_previous_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_map.json");
        let mut map = UserMap::open(&path).unwrap();
        map.set("0001", "@alice", &directory()).unwrap();

        std::fs::write(&path, "garbage").unwrap();
        assert!(matches!(map.reload(), Err(UserMapError::Parse { .. })));
        assert_eq!(map.get("0001"), Some("@alice"));
    }

    #[test]
    fn reload_without_file_errors() {
        let mut map = UserMap::in_memory();
        assert!(matches!(map.reload(), Err(UserMapError::NotPersisted)));
    }

    #[test]
    fn vacant_lists_unmapped() {
        let mut map = UserMap::in_memory();
        map.set("0002", "@bob", &directory()).unwrap();
        let dir = directory();
        let vacant: Vec<&str> = map.vacant(&dir).into_iter().map(|(id, _)| id).collect();
        assert_eq!(vacant, vec!["0001", "0003"]);
    }

    #[test]
    fn mention_variants() {
        let dir = directory();
        let mut map = UserMap::in_memory();
        map.set("0001", "@alice", &dir).unwrap();
        map.set("0002", "bob", &dir).unwrap();
        map.set("0003", "123456789", &dir).unwrap();

        assert_eq!(map.mention("0001", &dir), "Gridiron Gang (@alice)");
        assert_eq!(map.mention("0002", &dir), "Blitz Brigade (@bob)");
        assert_eq!(map.mention("0003", &dir), "Sunday Funday");
        assert_eq!(map.mention("0004", &dir), "Team 0004");
        assert_eq!(map.user_chat_id("0003"), Some(123456789));
        assert_eq!(map.user_chat_id("0001"), None);
    }

    #[test]
    fn list_pages_batches_of_25() {
        let mut dir = FranchiseDirectory::new();
        let mut map = UserMap::in_memory();
        for i in 1..=30 {
            let id = format!("{i:04}");
            dir.insert(id.clone(), format!("Team Name {i}"));
            map.set(&id, &format!("@user{i}"), &dir).unwrap();
        }
        let pages = map.list_pages(&dir);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].lines().filter(|l| l.contains(": @user")).count(), 25);
        assert_eq!(pages[1].lines().filter(|l| l.contains(": @user")).count(), 5);
    }
}
