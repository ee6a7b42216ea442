//! Messages endpoint HTTP client
//!
//! Uses synchronous HTTP (ureq) to be executor-agnostic. The fetch
//! seam is a trait so sessions can be driven against fakes in tests
//! and so alternative transports stay possible.

use anyhow::{Context, Result};
use serde::Deserialize;

use super::{AuthContext, MessagesQuery};
use crate::config::BackendConfig;
use crate::models::MessageRow;
use crate::sanitize::sanitize_message;

/// Messages endpoint path on the backend
pub const MESSAGES_PATH: &str = "/api/v1/monitor/messages";

/// Network boundary for one transcript read
pub trait MessageFetcher: Send + Sync {
    /// Issue one messages read with the given query parameters
    fn fetch_messages(&self, query: &MessagesQuery) -> Result<Vec<MessageRow>>;
}

/// Wire shape of the messages endpoint response
#[derive(Deserialize)]
struct MessagesEnvelope {
    #[serde(default)]
    data: Vec<MessageRow>,
}

/// ureq-backed client for the messages endpoint
pub struct HttpTranscriptClient {
    base_url: String,
    auth: AuthContext,
}

impl HttpTranscriptClient {
    pub fn new(base_url: impl Into<String>, auth: AuthContext) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, auth }
    }

    pub fn from_config(config: &BackendConfig, mut auth: AuthContext) -> Self {
        if auth.api_key.is_none() {
            auth.api_key = config.api_key.clone();
        }
        Self::new(config.base_url.clone(), auth)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn messages_url(&self, query: &MessagesQuery) -> String {
        let mut url = format!("{}{}", self.base_url, MESSAGES_PATH);
        let query_string = query.query_string();
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }
        url
    }
}

impl MessageFetcher for HttpTranscriptClient {
    fn fetch_messages(&self, query: &MessagesQuery) -> Result<Vec<MessageRow>> {
        let url = self.messages_url(query);

        let mut request = ureq::get(&url);
        if let Some(token) = self.auth.stored_token() {
            request = request.header("Authorization", &format!("Bearer {}", token));
        }
        if let Some(api_key) = &self.auth.api_key {
            request = request.header("x-api-key", api_key);
        }

        let mut response = request
            .call()
            .map_err(|e| {
                log::warn!(
                    "Messages request failed: {}",
                    sanitize_message(&e.to_string())
                );
                e
            })
            .context("Failed to send messages request")?;

        let envelope: MessagesEnvelope = response
            .body_mut()
            .read_json()
            .context("Failed to parse messages response")?;

        Ok(envelope.data)
    }
}
