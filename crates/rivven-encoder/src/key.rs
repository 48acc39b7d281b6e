//! Primary-key derivation for partitioning and deduplication
//!
//! Keys are built from primary-key columns in schema order. Each part is
//! written as `<decimal length><text>`, so `("ab", "c")` and `("a", "bc")`
//! produce `2ab1c` and `1a2bc`. The result is opaque and never parsed back.

use crate::event::CommonFormatEvent;
use crate::schema::TableSchema;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt::Write;

/// Text form of a field value used in keys.
///
/// Strings contribute their raw content; every other value its JSON text.
pub fn key_part(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

fn push_part(key: &mut String, part: &str) {
    // Writing into a String cannot fail.
    let _ = write!(key, "{}{}", part.len(), part);
}

/// Derive a row key from the primary-key columns of `schema`.
///
/// With `row == None` the column names are used instead of values, which
/// keys schema-only descriptors.
///
/// A row must be positionally aligned with `schema`. Passing a row of a
/// different length is a caller error: debug builds panic, release builds
/// skip the missing positions and produce a key that collides with a
/// shorter primary key.
pub fn derive_row_key(schema: &TableSchema, row: Option<&[Value]>) -> String {
    if let Some(row) = row {
        debug_assert_eq!(row.len(), schema.column_count(), "row does not match schema");
    }
    let mut key = String::new();
    for (i, column) in schema.primary_key_columns() {
        match row {
            None => push_part(&mut key, &column.name),
            Some(row) => {
                if let Some(value) = row.get(i) {
                    push_part(&mut key, &key_part(value));
                }
            }
        }
    }
    key
}

/// Derive a key from the key values already carried by an event.
pub fn derive_event_key(event: &CommonFormatEvent) -> String {
    let mut key = String::new();
    for value in &event.key {
        push_part(&mut key, &key_part(value));
    }
    key
}

/// Primary-key values of `row` in schema order.
///
/// This is the key list stored in events converted from rows, so that
/// `derive_event_key` on the event equals `derive_row_key` on the row.
/// The same alignment rule as [`derive_row_key`] applies.
pub fn row_key_values(schema: &TableSchema, row: &[Value]) -> Vec<Value> {
    debug_assert_eq!(row.len(), schema.column_count(), "row does not match schema");
    schema
        .primary_key_columns()
        .filter_map(|(i, _)| row.get(i).cloned())
        .collect()
}

/// Primary-key column names in schema order, as key values.
pub fn schema_key_values(schema: &TableSchema) -> Vec<Value> {
    schema
        .primary_key_columns()
        .map(|(_, c)| Value::String(c.name.clone()))
        .collect()
}
