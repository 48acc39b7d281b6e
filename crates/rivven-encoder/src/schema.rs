//! Table schema model and the schema store collaborator
//!
//! An encoder holds a read-only [`TableSchema`] snapshot for its
//! `(service, db, table)` binding and replaces it wholesale whenever it
//! reloads from a [`SchemaStore`].

use crate::error::{EncoderError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Column key designator (MySQL `COLUMN_KEY` semantics)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColumnKey {
    /// Not part of any index
    #[default]
    #[serde(rename = "")]
    None,
    /// Part of the primary key
    #[serde(rename = "PRI")]
    Primary,
    /// Part of a unique index
    #[serde(rename = "UNI")]
    Unique,
    /// Part of a non-unique index
    #[serde(rename = "MUL")]
    Multiple,
}

impl ColumnKey {
    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Primary)
    }
}

/// Column definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub key: ColumnKey,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable: true,
            key: ColumnKey::None,
        }
    }

    /// Mark this column as part of the primary key.
    pub fn primary_key(mut self) -> Self {
        self.key = ColumnKey::Primary;
        self.nullable = false;
        self
    }

    pub fn with_key(mut self, key: ColumnKey) -> Self {
        self.key = key;
        self
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// Ordered column layout of one table
///
/// Column order is the positional contract for rows: field `i` of a row
/// belongs to `columns[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableSchema {
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub db: String,
    #[serde(default)]
    pub table: String,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn new(
        service: impl Into<String>,
        db: impl Into<String>,
        table: impl Into<String>,
        columns: Vec<ColumnSchema>,
    ) -> Self {
        Self {
            service: service.into(),
            db: db.into(),
            table: table.into(),
            columns,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Primary-key columns with their positions, in declared order.
    pub fn primary_key_columns(&self) -> impl Iterator<Item = (usize, &ColumnSchema)> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(_, c)| c.key.is_primary())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn binding(&self) -> TableBinding {
        TableBinding::new(&self.service, &self.db, &self.table)
    }
}

/// The `(service, db, table)` triple an encoder is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableBinding {
    pub service: String,
    pub db: String,
    pub table: String,
}

impl TableBinding {
    pub fn new(
        service: impl Into<String>,
        db: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            db: db.into(),
            table: table.into(),
        }
    }
}

impl std::fmt::Display for TableBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.service, self.db, self.table)
    }
}

/// Source of current table schemas
///
/// Implementations may block (remote state DB, catalog query). Callers of
/// [`Encoder::update_codec`](crate::Encoder::update_codec) must treat it as
/// a potentially slow call. Failures are reported as
/// [`EncoderError::SchemaLoad`].
pub trait SchemaStore: Send + Sync {
    /// Load the current schema for a table
    fn load_schema(&self, service: &str, db: &str, table: &str) -> Result<TableSchema>;
}

/// In-memory schema store
///
/// Used for bootstrapping and tests; production deployments plug in the
/// state DB backed store.
#[derive(Debug, Default)]
pub struct MemorySchemaStore {
    schemas: RwLock<HashMap<TableBinding, TableSchema>>,
}

impl MemorySchemaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the schema for its binding.
    pub fn put(&self, schema: TableSchema) {
        self.schemas.write().insert(schema.binding(), schema);
    }

    /// Remove a schema; returns the removed schema if present.
    pub fn remove(&self, service: &str, db: &str, table: &str) -> Option<TableSchema> {
        self.schemas
            .write()
            .remove(&TableBinding::new(service, db, table))
    }

    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }
}

impl SchemaStore for MemorySchemaStore {
    fn load_schema(&self, service: &str, db: &str, table: &str) -> Result<TableSchema> {
        let binding = TableBinding::new(service, db, table);
        self.schemas
            .read()
            .get(&binding)
            .cloned()
            .ok_or_else(|| EncoderError::schema_load(&binding, "table not found"))
    }
}
