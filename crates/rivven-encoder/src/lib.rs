//! # rivven-encoder - Event codecs for Rivven CDC
//!
//! Converts raw row mutations and canonical [`CommonFormatEvent`]s into a
//! wire representation and back. Encoders are bound to one
//! `(service, db, table)` and follow that table's schema as it changes.
//!
//! ## Wire Formats
//!
//! | Format    | Kind    | Crate        |
//! |-----------|---------|--------------|
//! | `json`    | textual | `serde_json` |
//! | `msgpack` | binary  | `rmp-serde`  |
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐ create ┌───────────────────────────────┐ load_schema ┌─────────────┐
//! │ EncoderRegistry │ ─────▶ │ CommonFormatEncoder<C: Codec> │ ──────────▶ │ SchemaStore │
//! └─────────────────┘        │  row -> CommonFormatEvent     │             └─────────────┘
//!                            │  C::encode / C::decode        │
//!                            └───────────────────────────────┘
//!
//!  encode_common / decode_common      format-agnostic, no table binding
//!  derive_row_key / derive_event_key  length-prefixed partition keys
//!  begin_buffered_decode / reconcile  one event at a time from a shared buffer
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rivven_encoder::{
//!     derive_row_key, ColumnSchema, EncoderRegistry, EventType, MemorySchemaStore, TableSchema,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemorySchemaStore::new());
//! store.put(TableSchema::new(
//!     "svc",
//!     "shop",
//!     "orders",
//!     vec![
//!         ColumnSchema::new("id", "bigint").primary_key(),
//!         ColumnSchema::new("total", "decimal"),
//!     ],
//! ));
//!
//! let registry = EncoderRegistry::with_builtin(store);
//! let encoder = registry.create("msgpack", "svc", "shop", "orders").unwrap();
//!
//! let row = [json!("42"), json!(9.5)];
//! let bytes = encoder.row(EventType::Insert, &row, 1).unwrap();
//! let event = encoder.common_format_decode(&bytes).unwrap();
//! assert_eq!(event.key, vec![json!("42")]);
//! assert_eq!(derive_row_key(&encoder.schema(), Some(&row[..])), "242");
//! ```

mod buffered;
mod config;
mod encoder;
mod error;
mod event;
mod filter;
mod format;
mod key;
mod registry;
mod schema;

pub use buffered::{begin_buffered_decode, decode_next, reconcile, BufferedDecoder};
pub use config::EncoderConfig;
pub use encoder::{CommonFormatEncoder, Encoder, JsonEncoder, MsgPackEncoder};
pub use error::{EncoderError, ErrorCategory, Result};
pub use event::{CommonFormatEvent, CommonFormatField, EventType};
pub use filter::{ColumnFilter, ColumnFilterConfig, REDACTED};
pub use format::{decode_common, encode_common, EventCodec, JsonCodec, MsgPackCodec, WireFormat};
pub use key::{derive_event_key, derive_row_key, key_part, row_key_values, schema_key_values};
pub use registry::{
    EncoderContext, EncoderFactory, EncoderRegistry, JsonEncoderFactory, MsgPackEncoderFactory,
};
pub use schema::{
    ColumnKey, ColumnSchema, MemorySchemaStore, SchemaStore, TableBinding, TableSchema,
};
