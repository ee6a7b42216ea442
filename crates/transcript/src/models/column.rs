//! Grid column definitions derived from row shape

use serde::{Deserialize, Serialize};

/// How columns are merged across rows of differing shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Every field seen in any row
    #[default]
    Union,
    /// Only fields present in every row
    Intersection,
}

/// A column (or, with `children`, a column group) for the transcript grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Row field backing this column
    pub field: String,
    /// Display name shown in the column header
    pub header_name: String,
    /// Child columns when this entry is a group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ColumnDef>>,
}

impl ColumnDef {
    /// Derive a column from a row field name
    ///
    /// The header name is the field name with underscores turned into
    /// spaces and each word capitalized ("session_id" -> "Session Id").
    pub fn from_field(field: impl Into<String>) -> Self {
        let field = field.into();
        let header_name = prettify_field(&field);
        Self {
            field,
            header_name,
            children: None,
        }
    }

}

fn prettify_field(field: &str) -> String {
    field
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_field_prettifies_header() {
        let col = ColumnDef::from_field("session_id");
        assert_eq!(col.field, "session_id");
        assert_eq!(col.header_name, "Session Id");
        assert!(col.children.is_none());
    }

    #[test]
    fn test_from_field_single_word() {
        assert_eq!(ColumnDef::from_field("text").header_name, "Text");
    }

    #[test]
    fn test_column_group_deserializes() {
        // Persisted grid layouts may carry grouped columns.
        let group: ColumnDef = serde_json::from_str(
            r#"{
                "field": "",
                "header_name": "Meta",
                "children": [{ "field": "flow_id", "header_name": "Flow Id" }]
            }"#,
        )
        .unwrap();
        let children = group.children.as_ref().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].field, "flow_id");
        assert!(children[0].children.is_none());
    }

    #[test]
    fn test_merge_mode_serde() {
        assert_eq!(
            serde_json::to_string(&MergeMode::Intersection).unwrap(),
            "\"intersection\""
        );
        let mode: MergeMode = serde_json::from_str("\"union\"").unwrap();
        assert_eq!(mode, MergeMode::Union);
    }
}
