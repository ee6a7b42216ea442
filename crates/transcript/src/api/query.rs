//! Query-parameter assembly for the messages endpoint
//!
//! Parameters come from three places, merged in order: the optional
//! flow id derived from the polling subject, caller-supplied params
//! (with any `session_id` normalized first), and principal-scoping
//! params injected from the auth context.

use std::collections::BTreeMap;

use crate::api::AuthContext;
use crate::models::SubjectId;
use crate::scope::user_scoped_params;

pub const FLOW_ID_PARAM: &str = "flow_id";
pub const SESSION_ID_PARAM: &str = "session_id";

/// Normalize a session id to its canonical (decoded) form
///
/// Session ids sometimes arrive already percent-encoded. Decoding here
/// and encoding exactly once at render time keeps the wire form stable
/// no matter how the id was supplied.
pub fn normalize_session_id(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Merged, deterministic parameter set for one messages request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagesQuery {
    params: BTreeMap<String, String>,
}

impl MessagesQuery {
    /// Build the parameter set for a request
    pub fn build(
        flow_id: Option<&SubjectId>,
        caller_params: &BTreeMap<String, String>,
        auth: &AuthContext,
    ) -> Self {
        let mut params = BTreeMap::new();

        if let Some(id) = flow_id {
            params.insert(FLOW_ID_PARAM.to_string(), id.as_str().to_string());
        }

        for (key, value) in caller_params {
            let value = if key == SESSION_ID_PARAM {
                normalize_session_id(value)
            } else {
                value.clone()
            };
            params.insert(key.clone(), value);
        }

        user_scoped_params(&mut params, auth);

        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Render the urlencoded query string (no leading `?`)
    pub fn query_string(&self) -> String {
        self.params
            .iter()
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}
