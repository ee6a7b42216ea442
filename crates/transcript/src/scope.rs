//! Principal scoping for transcript requests
//!
//! The backend is expected to scope results to the requesting principal,
//! but the client injects the scoping parameter itself and re-filters
//! returned rows as a second line of defense.

use std::collections::BTreeMap;

use crate::api::AuthContext;
use crate::models::{MessageRow, USER_ID_FIELD};

/// Inject principal-scoping parameters into an outgoing query
///
/// A caller-supplied `user_id` parameter is left untouched.
pub fn user_scoped_params(params: &mut BTreeMap<String, String>, auth: &AuthContext) {
    if let Some(user_id) = &auth.current_user_id {
        params
            .entry(USER_ID_FIELD.to_string())
            .or_insert_with(|| user_id.clone());
    }
}

/// Drop rows attributed to a principal other than the current one
///
/// Rows without an attribution field are kept (system rows cannot be
/// attributed). When no principal is known the rows pass through
/// unchanged.
pub fn filter_rows_for_user(rows: Vec<MessageRow>, auth: &AuthContext) -> Vec<MessageRow> {
    let Some(current_user) = &auth.current_user_id else {
        return rows;
    };

    let before = rows.len();
    let rows: Vec<MessageRow> = rows
        .into_iter()
        .filter(|row| match row.user_id() {
            Some(user_id) => user_id == current_user,
            None => true,
        })
        .collect();

    if rows.len() < before {
        log::debug!(
            "Filtered {} row(s) not belonging to the current principal",
            before - rows.len()
        );
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> MessageRow {
        MessageRow::from_value(value).unwrap()
    }

    fn auth_for(user_id: &str) -> AuthContext {
        AuthContext {
            current_user_id: Some(user_id.to_string()),
            ..AuthContext::default()
        }
    }

    #[test]
    fn test_filter_keeps_only_current_principal() {
        let rows = vec![
            row(json!({"text": "mine", "user_id": "p1"})),
            row(json!({"text": "theirs", "user_id": "p2"})),
            row(json!({"text": "also mine", "user_id": "p1"})),
        ];

        let filtered = filter_rows_for_user(rows, &auth_for("p1"));
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|r| r.user_id() == Some("p1")));
    }

    #[test]
    fn test_filter_keeps_unattributed_rows() {
        let rows = vec![
            row(json!({"text": "system"})),
            row(json!({"text": "theirs", "user_id": "p2"})),
        ];

        let filtered = filter_rows_for_user(rows, &auth_for("p1"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].get("text"), Some(&json!("system")));
    }

    #[test]
    fn test_filter_without_principal_is_passthrough() {
        let rows = vec![
            row(json!({"user_id": "p1"})),
            row(json!({"user_id": "p2"})),
        ];

        let filtered = filter_rows_for_user(rows.clone(), &AuthContext::default());
        assert_eq!(filtered, rows);
    }

    #[test]
    fn test_scoped_params_injects_user_id() {
        let mut params = BTreeMap::new();
        user_scoped_params(&mut params, &auth_for("p1"));
        assert_eq!(params.get(USER_ID_FIELD).map(String::as_str), Some("p1"));
    }

    #[test]
    fn test_scoped_params_keeps_explicit_value() {
        let mut params = BTreeMap::new();
        params.insert(USER_ID_FIELD.to_string(), "explicit".to_string());
        user_scoped_params(&mut params, &auth_for("p1"));
        assert_eq!(
            params.get(USER_ID_FIELD).map(String::as_str),
            Some("explicit")
        );
    }

    #[test]
    fn test_scoped_params_noop_without_principal() {
        let mut params = BTreeMap::new();
        user_scoped_params(&mut params, &AuthContext::default());
        assert!(params.is_empty());
    }
}
