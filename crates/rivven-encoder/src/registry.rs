//! Encoder registry and factory
//!
//! Maps format names to encoder factories. The registry is filled once at
//! startup from the composition root, then only read; lookups are
//! case-insensitive.
//!
//! ```text
//! ┌──────────────────┐  create("MsgPack", svc, db, tbl)  ┌─────────────────┐
//! │  EncoderRegistry │ ─────────────────────────────────▶ │ EncoderFactory  │
//! │  json, msgpack   │                                    └────────┬────────┘
//! └──────────────────┘                                             │ new + update_codec
//!                                                                  ▼
//!                                                         Box<dyn Encoder>
//! ```
//!
//! # Example
//!
//! ```rust
//! use rivven_encoder::{ColumnSchema, EncoderRegistry, MemorySchemaStore, TableSchema};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemorySchemaStore::new());
//! store.put(TableSchema::new(
//!     "svc",
//!     "db",
//!     "users",
//!     vec![ColumnSchema::new("id", "bigint").primary_key()],
//! ));
//!
//! let registry = EncoderRegistry::with_builtin(store);
//! let encoder = registry.create("json", "svc", "db", "users").unwrap();
//! assert_eq!(encoder.encoder_type(), "json");
//! ```

use crate::config::EncoderConfig;
use crate::encoder::{CommonFormatEncoder, Encoder};
use crate::error::{EncoderError, Result};
use crate::filter::ColumnFilter;
use crate::format::{JsonCodec, MsgPackCodec, WireFormat};
use crate::schema::{SchemaStore, TableBinding};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Everything a factory needs to build an encoder for one table
#[derive(Clone)]
pub struct EncoderContext {
    pub binding: TableBinding,
    pub schema_store: Arc<dyn SchemaStore>,
    pub filter: ColumnFilter,
}

/// Factory trait for creating encoder instances
///
/// Closures `Fn(EncoderContext) -> Result<Box<dyn Encoder>>` implement it.
pub trait EncoderFactory: Send + Sync {
    /// Build an encoder without loading its schema
    fn create(&self, ctx: EncoderContext) -> Result<Box<dyn Encoder>>;
}

impl<F> EncoderFactory for F
where
    F: Fn(EncoderContext) -> Result<Box<dyn Encoder>> + Send + Sync,
{
    fn create(&self, ctx: EncoderContext) -> Result<Box<dyn Encoder>> {
        self(ctx)
    }
}

/// Factory for the built-in JSON encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoderFactory;

impl EncoderFactory for JsonEncoderFactory {
    fn create(&self, ctx: EncoderContext) -> Result<Box<dyn Encoder>> {
        Ok(Box::new(
            CommonFormatEncoder::new(JsonCodec, ctx.binding, ctx.schema_store)
                .with_filter(ctx.filter),
        ))
    }
}

/// Factory for the built-in MessagePack encoder
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackEncoderFactory;

impl EncoderFactory for MsgPackEncoderFactory {
    fn create(&self, ctx: EncoderContext) -> Result<Box<dyn Encoder>> {
        Ok(Box::new(
            CommonFormatEncoder::new(MsgPackCodec, ctx.binding, ctx.schema_store)
                .with_filter(ctx.filter),
        ))
    }
}

/// Registry of available encoder formats
pub struct EncoderRegistry {
    factories: HashMap<String, Arc<dyn EncoderFactory>>,
    schema_store: Arc<dyn SchemaStore>,
}

impl EncoderRegistry {
    /// Create an empty registry
    pub fn new(schema_store: Arc<dyn SchemaStore>) -> Self {
        Self {
            factories: HashMap::new(),
            schema_store,
        }
    }

    /// Create a registry with the `json` and `msgpack` encoders registered
    pub fn with_builtin(schema_store: Arc<dyn SchemaStore>) -> Self {
        let mut registry = Self::new(schema_store);
        registry.register(WireFormat::Json.name(), Arc::new(JsonEncoderFactory));
        registry.register(WireFormat::MsgPack.name(), Arc::new(MsgPackEncoderFactory));
        registry
    }

    /// Register an encoder factory, replacing any existing one of that name
    pub fn register(&mut self, name: &str, factory: Arc<dyn EncoderFactory>) {
        self.factories.insert(name.to_lowercase(), factory);
    }

    /// Create an encoder for a table and load its schema.
    ///
    /// Returns no encoder if the format is unknown or the schema cannot be
    /// loaded.
    pub fn create(
        &self,
        format: &str,
        service: &str,
        db: &str,
        table: &str,
    ) -> Result<Box<dyn Encoder>> {
        self.create_with_filter(format, service, db, table, ColumnFilter::allow_all())
    }

    /// Create an encoder from configuration
    pub fn create_with_config(
        &self,
        config: &EncoderConfig,
        service: &str,
        db: &str,
        table: &str,
    ) -> Result<Box<dyn Encoder>> {
        config.validate()?;
        self.create_with_filter(
            config.format.name(),
            service,
            db,
            table,
            ColumnFilter::new(config.columns.clone()),
        )
    }

    fn create_with_filter(
        &self,
        format: &str,
        service: &str,
        db: &str,
        table: &str,
        filter: ColumnFilter,
    ) -> Result<Box<dyn Encoder>> {
        let factory = self
            .factories
            .get(&format.to_lowercase())
            .ok_or_else(|| EncoderError::unknown_format(format))?;

        let binding = TableBinding::new(service, db, table);
        let mut encoder = factory.create(EncoderContext {
            binding: binding.clone(),
            schema_store: Arc::clone(&self.schema_store),
            filter,
        })?;
        encoder.update_codec()?;

        info!(
            "Created {} encoder for {} ({} columns)",
            encoder.encoder_type(),
            binding,
            encoder.schema().column_count()
        );
        Ok(encoder)
    }

    /// Check if a format is registered
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }

    /// Registered format names, sorted
    pub fn formats(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered formats
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for EncoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}
