//! In-memory transcript store

use anyhow::Result;
use std::sync::RwLock;

use super::TranscriptStore;
use crate::models::MessageRow;

/// In-memory implementation of [`TranscriptStore`]
///
/// A single RwLock-protected snapshot; the default store for both the
/// application and tests.
#[derive(Default)]
pub struct InMemoryTranscriptStore {
    rows: RwLock<Vec<MessageRow>>,
}

impl InMemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TranscriptStore for InMemoryTranscriptStore {
    fn set_messages(&self, rows: Vec<MessageRow>) -> Result<()> {
        *self.rows.write().unwrap() = rows;
        Ok(())
    }

    fn messages(&self) -> Result<Vec<MessageRow>> {
        Ok(self.rows.read().unwrap().clone())
    }

    fn clear(&self) -> Result<()> {
        self.rows.write().unwrap().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> MessageRow {
        MessageRow::from_value(value).unwrap()
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let store = InMemoryTranscriptStore::new();
        store
            .set_messages(vec![row(json!({"a": 1})), row(json!({"b": 2}))])
            .unwrap();
        store.set_messages(vec![row(json!({"c": 3}))]).unwrap();

        let rows = store.messages().unwrap();
        assert_eq!(rows, vec![row(json!({"c": 3}))]);
    }

    #[test]
    fn test_clear() {
        let store = InMemoryTranscriptStore::new();
        store.set_messages(vec![row(json!({"a": 1}))]).unwrap();
        store.clear().unwrap();
        assert!(store.messages().unwrap().is_empty());
    }

    #[test]
    fn test_empty_by_default() {
        assert!(InMemoryTranscriptStore::new().messages().unwrap().is_empty());
    }
}
