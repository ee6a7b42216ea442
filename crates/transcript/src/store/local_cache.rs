//! Locally cached transcripts for playground/offline pages
//!
//! Playground pages never hit the network; they read a JSON blob of
//! rows keyed by subject id. One file per subject:
//!
//! ```text
//! cache/
//!   flow-1.json
//!   session_2.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::{MessageRow, SubjectId};

/// File-backed cache of transcript rows, one JSON blob per subject id
pub struct LocalTranscriptCache {
    root: PathBuf,
}

impl LocalTranscriptCache {
    /// Open (creating if needed) a cache rooted at the given directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).context("Failed to create transcript cache directory")?;
        Ok(Self { root })
    }

    /// Open the cache at the default location (~/.cache/flowdeck/transcripts)
    pub fn open_default() -> Result<Self> {
        let root = config::cache_dir()
            .context("Could not determine cache directory")?
            .join("transcripts");
        Self::new(root)
    }

    fn blob_path(&self, id: &SubjectId) -> PathBuf {
        self.root.join(format!("{}.json", safe_file_stem(id.as_str())))
    }

    /// Load the cached rows for a subject; a missing blob reads as empty
    pub fn load(&self, id: &SubjectId) -> Result<Vec<MessageRow>> {
        let path = self.blob_path(id);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cached transcript: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse cached transcript: {}", path.display()))
    }

    /// Replace the cached rows for a subject
    pub fn save(&self, id: &SubjectId, rows: &[MessageRow]) -> Result<()> {
        let path = self.blob_path(id);
        let content = serde_json::to_string_pretty(rows)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write cached transcript: {}", path.display()))
    }

    /// Remove the cached rows for a subject, if present
    pub fn remove(&self, id: &SubjectId) -> Result<()> {
        let path = self.blob_path(id);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove cached transcript: {}", path.display()))?;
        }
        Ok(())
    }
}

/// Map a subject id onto a safe file stem
fn safe_file_stem(id: &str) -> String {
    id.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> MessageRow {
        MessageRow::from_value(value).unwrap()
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalTranscriptCache::new(dir.path()).unwrap();
        let id = SubjectId::new("flow-1");

        let rows = vec![row(json!({"text": "hi", "user_id": "p1"}))];
        cache.save(&id, &rows).unwrap();
        assert_eq!(cache.load(&id).unwrap(), rows);
    }

    #[test]
    fn test_missing_blob_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalTranscriptCache::new(dir.path()).unwrap();
        assert!(cache.load(&SubjectId::new("unknown")).unwrap().is_empty());
    }

    #[test]
    fn test_remove() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalTranscriptCache::new(dir.path()).unwrap();
        let id = SubjectId::new("flow-1");

        cache.save(&id, &[row(json!({"a": 1}))]).unwrap();
        cache.remove(&id).unwrap();
        assert!(cache.load(&id).unwrap().is_empty());
        // Removing again is a no-op.
        cache.remove(&id).unwrap();
    }

    #[test]
    fn test_unsafe_ids_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalTranscriptCache::new(dir.path()).unwrap();
        let id = SubjectId::new("../escape/attempt");

        cache.save(&id, &[row(json!({"a": 1}))]).unwrap();
        assert_eq!(cache.load(&id).unwrap().len(), 1);
        // The blob landed inside the cache root, not outside it.
        assert!(dir.path().join("___escape_attempt.json").exists());
    }
}
