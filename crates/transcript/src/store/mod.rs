//! Shared transcript state and the playground-local cache

mod local_cache;
mod memory;
mod traits;

pub use local_cache::LocalTranscriptCache;
pub use memory::InMemoryTranscriptStore;
pub use traits::TranscriptStore;
