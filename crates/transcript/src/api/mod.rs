//! Network boundary: auth context, query building and the HTTP client

mod auth;
mod client;
mod query;

pub use auth::{AuthContext, MAX_SESSION_AGE_HOURS};
pub use client::{HttpTranscriptClient, MessageFetcher, MESSAGES_PATH};
pub use query::{normalize_session_id, MessagesQuery, FLOW_ID_PARAM, SESSION_ID_PARAM};
