//! Common format event representation
//!
//! The canonical, schema-agnostic change event that every wire format
//! serializes. One event describes one insert, update, delete, or schema
//! change of a single table.
//!
//! ## Payload placement
//!
//! - `insert` / `update`: row image in `after`
//! - `delete`: row image in `before`
//! - `schema`: no row image unless the producer supplies one
//!
//! `key` always carries the primary-key values in schema column order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// Row inserted
    Insert,
    /// Row updated
    Update,
    /// Row deleted
    Delete,
    /// Table schema changed
    Schema,
}

impl EventType {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Schema => "schema",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named field value inside an event payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonFormatField {
    pub name: String,
    pub value: Value,
}

impl CommonFormatField {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Canonical change event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonFormatEvent {
    /// Event discriminant
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Primary-key values in schema column order
    #[serde(default)]
    pub key: Vec<Value>,
    /// Monotonic sequence number assigned by the change source
    pub seq_no: u64,
    /// Conversion time (Unix epoch millis)
    #[serde(default)]
    pub timestamp: i64,
    /// Row image before the change (DELETE)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Vec<CommonFormatField>>,
    /// Row image after the change (INSERT/UPDATE)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Vec<CommonFormatField>>,
}

impl CommonFormatEvent {
    fn new(event_type: EventType, key: Vec<Value>, seq_no: u64) -> Self {
        Self {
            event_type,
            key,
            seq_no,
            timestamp: 0,
            before: None,
            after: None,
        }
    }

    /// Create a new INSERT event
    pub fn insert(key: Vec<Value>, after: Vec<CommonFormatField>, seq_no: u64) -> Self {
        Self {
            after: Some(after),
            ..Self::new(EventType::Insert, key, seq_no)
        }
    }

    /// Create a new UPDATE event
    pub fn update(
        key: Vec<Value>,
        before: Option<Vec<CommonFormatField>>,
        after: Vec<CommonFormatField>,
        seq_no: u64,
    ) -> Self {
        Self {
            before,
            after: Some(after),
            ..Self::new(EventType::Update, key, seq_no)
        }
    }

    /// Create a new DELETE event
    pub fn delete(key: Vec<Value>, before: Vec<CommonFormatField>, seq_no: u64) -> Self {
        Self {
            before: Some(before),
            ..Self::new(EventType::Delete, key, seq_no)
        }
    }

    /// Create a schema change notification
    ///
    /// The key carries the primary-key column names, which is how
    /// schema-only descriptors are keyed.
    pub fn schema_change(key: Vec<Value>, seq_no: u64) -> Self {
        Self::new(EventType::Schema, key, seq_no)
    }

    /// Set the event timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Check if this is a data modification event (INSERT/UPDATE/DELETE)
    pub fn is_dml(&self) -> bool {
        matches!(
            self.event_type,
            EventType::Insert | EventType::Update | EventType::Delete
        )
    }

    /// Check if this event notifies a schema change
    pub fn is_schema_change(&self) -> bool {
        self.event_type == EventType::Schema
    }

    /// Look up a field of the current row image by name.
    ///
    /// Reads `after` first and falls back to `before`.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.after
            .as_ref()
            .or(self.before.as_ref())
            .and_then(|fields| fields.iter().find(|f| f.name == name))
            .map(|f| &f.value)
    }
}
