//! Transcript store trait definition

use anyhow::Result;

use crate::models::MessageRow;

/// Shared store of the most recently fetched transcript rows
///
/// The store is overwritten wholesale on every successful cycle; there
/// is no merge path, so readers always observe a complete snapshot.
pub trait TranscriptStore: Send + Sync {
    /// Replace the stored rows with a new snapshot
    fn set_messages(&self, rows: Vec<MessageRow>) -> Result<()>;

    /// Current snapshot of stored rows
    fn messages(&self) -> Result<Vec<MessageRow>>;

    /// Drop all stored rows
    fn clear(&self) -> Result<()>;
}
