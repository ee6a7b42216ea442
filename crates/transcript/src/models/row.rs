//! Opaque message row records
//!
//! Rows come from the backend as JSON objects whose shape may vary
//! between ticks (sparse fields can appear late). The client treats
//! them as opaque apart from the principal-attribution field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field used to attribute a row to a principal
pub const USER_ID_FIELD: &str = "user_id";

/// A single transcript row as returned by the backend
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageRow(Map<String, Value>);

impl MessageRow {
    /// Create an empty row
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a row from a JSON value; non-objects yield `None`
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Get a field value by name
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Set a field value, replacing any existing value
    pub fn set(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    /// Iterate field names in insertion order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Whether the row carries the given field
    pub fn has_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// The principal this row is attributed to, if any
    pub fn user_id(&self) -> Option<&str> {
        self.0.get(USER_ID_FIELD).and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for MessageRow {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
