//! Column inference from observed row shape
//!
//! Column definitions are recomputed on every cycle because row shape
//! can change between ticks (sparse fields appearing late).

use crate::models::{ColumnDef, MergeMode, MessageRow};

/// Derive column definitions from a set of rows
///
/// `Union` keeps every field seen in any row (first-seen order), minus
/// any field named in `excluded_fields`. `Intersection` keeps only the
/// fields present in every row, in first-row order.
pub fn extract_columns_from_rows(
    rows: &[MessageRow],
    mode: MergeMode,
    excluded_fields: &[String],
) -> Vec<ColumnDef> {
    let fields = match mode {
        MergeMode::Union => union_fields(rows, excluded_fields),
        MergeMode::Intersection => intersection_fields(rows),
    };

    fields.into_iter().map(ColumnDef::from_field).collect()
}

fn union_fields(rows: &[MessageRow], excluded_fields: &[String]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    for row in rows {
        for field in row.field_names() {
            if excluded_fields.iter().any(|e| e == field) {
                continue;
            }
            if !fields.iter().any(|f| f == field) {
                fields.push(field.to_string());
            }
        }
    }
    fields
}

fn intersection_fields(rows: &[MessageRow]) -> Vec<String> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };

    first
        .field_names()
        .filter(|&field| rows.iter().all(|row| row.has_field(field)))
        .map(str::to_string)
        .collect()
}
