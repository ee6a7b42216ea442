//! Transcript crate - client-side sync for flow message transcripts
//!
//! This crate keeps a chat/message transcript view synchronized with a
//! Flowdeck backend:
//! - Domain models (SubjectId, MessageRow, ColumnDef)
//! - HTTP client boundary and consumption-only auth context
//! - Column inference and principal-scoped row filtering
//! - Shared transcript store abstractions (in-memory, local cache)
//! - Single-slot polling coordinator and the message sync session
//!
//! This crate has zero UI dependencies; rendering, routing and token
//! issuance live elsewhere.

pub mod api;
pub mod columns;
pub mod config;
pub mod models;
pub mod poll;
pub mod sanitize;
pub mod scope;
pub mod store;

pub use api::{
    normalize_session_id, AuthContext, HttpTranscriptClient, MessageFetcher, MessagesQuery,
    FLOW_ID_PARAM, MAX_SESSION_AGE_HOURS, MESSAGES_PATH, SESSION_ID_PARAM,
};
pub use columns::extract_columns_from_rows;
pub use config::BackendConfig;
pub use models::{ColumnDef, MergeMode, MessageRow, SubjectId, USER_ID_FIELD};
pub use poll::{
    GetMessages, MessageSyncSession, MessagesResponse, OnSuccess, PollRequest,
    PollingCoordinator, PollingJob, RequestInFlightError, StopPredicate, TickFn,
    DEFAULT_REQUEST_KEY, POLLING_INTERVAL,
};
pub use sanitize::{contains_sensitive_info, sanitize_message};
pub use scope::{filter_rows_for_user, user_scoped_params};
pub use store::{InMemoryTranscriptStore, LocalTranscriptCache, TranscriptStore};
