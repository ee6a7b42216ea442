//! Consumption-only view of the authentication store
//!
//! Token issuance, refresh and validation live elsewhere; this client
//! only consumes the current auth state as a gate for issuing requests
//! and for principal-scoping the results.

use chrono::{DateTime, Duration, Utc};

/// A stored session older than this is treated as logged out
pub const MAX_SESSION_AGE_HOURS: i64 = 24;

/// Snapshot of the auth state relevant to transcript requests
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    /// Access token sent as a bearer header
    pub access_token: Option<String>,
    /// Deployment API key sent as `x-api-key`
    pub api_key: Option<String>,
    /// Principal the transcript view belongs to
    pub current_user_id: Option<String>,
    /// Playground/offline pages read the local cache instead of the network
    pub playground_page: bool,
    /// When the current session was established
    pub authenticated_at: Option<DateTime<Utc>>,
}

impl AuthContext {
    /// Context with no credentials at all
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for an authenticated principal, stamped now
    pub fn authenticated(
        access_token: impl Into<String>,
        current_user_id: impl Into<String>,
    ) -> Self {
        Self {
            access_token: Some(access_token.into()),
            current_user_id: Some(current_user_id.into()),
            authenticated_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    /// Context for a playground/offline page (no network access)
    pub fn playground() -> Self {
        Self {
            playground_page: true,
            ..Self::default()
        }
    }

    /// Attach a deployment API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// The access token, if the stored session is still valid
    ///
    /// A token without a session timestamp, or with one older than
    /// [`MAX_SESSION_AGE_HOURS`], is treated as absent.
    pub fn stored_token(&self) -> Option<&str> {
        let token = self.access_token.as_deref()?;
        let authenticated_at = self.authenticated_at?;
        if Utc::now() - authenticated_at < Duration::hours(MAX_SESSION_AGE_HOURS) {
            Some(token)
        } else {
            None
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.stored_token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_is_not_authenticated() {
        assert!(!AuthContext::anonymous().is_authenticated());
    }

    #[test]
    fn test_fresh_session_is_authenticated() {
        let auth = AuthContext::authenticated("tok", "p1");
        assert!(auth.is_authenticated());
        assert_eq!(auth.stored_token(), Some("tok"));
    }

    #[test]
    fn test_expired_session_is_not_authenticated() {
        let mut auth = AuthContext::authenticated("tok", "p1");
        auth.authenticated_at = Some(Utc::now() - Duration::hours(MAX_SESSION_AGE_HOURS + 1));
        assert!(!auth.is_authenticated());
        assert_eq!(auth.stored_token(), None);
    }

    #[test]
    fn test_token_without_timestamp_is_invalid() {
        let auth = AuthContext {
            access_token: Some("tok".to_string()),
            ..AuthContext::default()
        };
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn test_playground_flag() {
        let auth = AuthContext::playground();
        assert!(auth.playground_page);
        assert!(!auth.is_authenticated());
    }
}
