//! Small JSON files backing the ledgers and the user map.

use std::io::{self, ErrorKind};
use std::path::Path;

use serde::Serialize;

/// Read a file, returning `None` when it does not exist yet.
pub fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Serialize `value` as pretty JSON and replace `path` with it.
///
/// Writes to a sibling temp file first and renames it over the target, so a
/// crash mid-write leaves the previous contents intact.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let contents = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_optional(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("seen.json");
        write_json(&path, &vec!["1", "2"]).unwrap();
        let contents = read_optional(&path).unwrap().unwrap();
        let back: Vec<String> = serde_json::from_str(&contents).unwrap();
        assert_eq!(back, vec!["1", "2"]);
        assert!(!path.with_extension("json.tmp").exists());
    }
}
