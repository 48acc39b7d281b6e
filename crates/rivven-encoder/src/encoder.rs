//! Table-bound encoders
//!
//! An [`Encoder`] is bound to one `(service, db, table)` and converts rows
//! and common format events into wire bytes. All formats share
//! [`CommonFormatEncoder`], which does the row conversion, schema refresh and
//! key handling, and differ only in the [`EventCodec`] they are built with.
//!
//! ## Ownership
//!
//! One consumer task owns an encoder per table binding. Refreshing the
//! schema takes `&mut self`; callers sharing an encoder across tasks must
//! wrap it in their own lock and should not hold that lock across
//! [`Encoder::update_codec`], which calls the schema store.

use crate::error::{EncoderError, Result};
use crate::event::{CommonFormatEvent, CommonFormatField, EventType};
use crate::filter::ColumnFilter;
use crate::format::{EventCodec, JsonCodec, MsgPackCodec};
use crate::key::row_key_values;
use crate::schema::{SchemaStore, TableBinding, TableSchema};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Unified interface to encode rows and common format events
pub trait Encoder: Send {
    /// Convert a row into a common format event and serialize it.
    ///
    /// `row` must be positionally aligned with [`Encoder::schema`].
    fn row(&self, event_type: EventType, row: &[Value], seq_no: u64) -> Result<Vec<u8>>;

    /// Serialize an event that is already in common format.
    ///
    /// Schema change events refresh the bound schema first.
    fn common_format(&mut self, event: &CommonFormatEvent) -> Result<Vec<u8>>;

    /// Reload the schema from the schema store.
    ///
    /// On failure the previous snapshot is kept.
    fn update_codec(&mut self) -> Result<()>;

    /// Registered format name of this encoder
    fn encoder_type(&self) -> &'static str;

    /// Current schema snapshot
    fn schema(&self) -> Arc<TableSchema>;

    /// Serialize an event with this encoder's wire format
    fn common_format_encode(&self, event: &CommonFormatEvent) -> Result<Vec<u8>>;

    /// Deserialize an event with this encoder's wire format
    fn common_format_decode(&self, bytes: &[u8]) -> Result<CommonFormatEvent>;
}

/// Shared encoder base parameterized by a wire codec
pub struct CommonFormatEncoder<C: EventCodec> {
    binding: TableBinding,
    store: Arc<dyn SchemaStore>,
    schema: Arc<TableSchema>,
    filter: ColumnFilter,
    codec: C,
}

/// JSON encoder
pub type JsonEncoder = CommonFormatEncoder<JsonCodec>;

/// MessagePack encoder
pub type MsgPackEncoder = CommonFormatEncoder<MsgPackCodec>;

impl<C: EventCodec> CommonFormatEncoder<C> {
    /// Create an encoder with an empty schema.
    ///
    /// Call [`Encoder::update_codec`] before use; the registry does this
    /// automatically.
    pub fn new(codec: C, binding: TableBinding, store: Arc<dyn SchemaStore>) -> Self {
        let schema = Arc::new(TableSchema::new(
            &binding.service,
            &binding.db,
            &binding.table,
            Vec::new(),
        ));
        Self {
            binding,
            store,
            schema,
            filter: ColumnFilter::allow_all(),
            codec,
        }
    }

    /// Set the column filter used during row conversion.
    pub fn with_filter(mut self, filter: ColumnFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn binding(&self) -> &TableBinding {
        &self.binding
    }

    pub fn filter(&self) -> &ColumnFilter {
        &self.filter
    }

    /// Convert a row into a common format event using the bound schema.
    ///
    /// The key is taken from the unfiltered row; the payload honours the
    /// column filter. DELETE rows go to `before`, everything else to `after`.
    pub fn convert_row(
        &self,
        event_type: EventType,
        row: &[Value],
        seq_no: u64,
    ) -> Result<CommonFormatEvent> {
        let schema = &self.schema;
        if row.len() != schema.column_count() {
            return Err(EncoderError::shape_mismatch(schema.column_count(), row.len()));
        }

        let fields: Vec<CommonFormatField> = schema
            .columns
            .iter()
            .zip(row)
            .filter_map(|(column, value)| {
                self.filter
                    .project(&column.name, value)
                    .map(|v| CommonFormatField::new(column.name.clone(), v))
            })
            .collect();

        let mut event = CommonFormatEvent {
            event_type,
            key: row_key_values(schema, row),
            seq_no,
            timestamp: chrono::Utc::now().timestamp_millis(),
            before: None,
            after: None,
        };
        match event_type {
            EventType::Delete => event.before = Some(fields),
            EventType::Insert | EventType::Update | EventType::Schema => {
                event.after = Some(fields)
            }
        }
        Ok(event)
    }
}

impl<C: EventCodec> Encoder for CommonFormatEncoder<C> {
    fn row(&self, event_type: EventType, row: &[Value], seq_no: u64) -> Result<Vec<u8>> {
        let event = self.convert_row(event_type, row, seq_no)?;
        self.common_format_encode(&event)
    }

    fn common_format(&mut self, event: &CommonFormatEvent) -> Result<Vec<u8>> {
        if event.is_schema_change() {
            debug!("Schema change event for {} (seq {})", self.binding, event.seq_no);
            self.update_codec()?;
        }
        // The event is assumed to be shaped for the input schema; it is not
        // re-projected to an output shape.
        self.common_format_encode(event)
    }

    fn update_codec(&mut self) -> Result<()> {
        let TableBinding { service, db, table } = &self.binding;
        match self.store.load_schema(service, db, table) {
            Ok(schema) => {
                debug!(
                    "Loaded schema for {}: {} columns",
                    self.binding,
                    schema.column_count()
                );
                self.schema = Arc::new(schema);
                Ok(())
            }
            Err(e) => {
                warn!("Schema refresh failed for {}: {}", self.binding, e);
                Err(e)
            }
        }
    }

    fn encoder_type(&self) -> &'static str {
        self.codec.format().name()
    }

    fn schema(&self) -> Arc<TableSchema> {
        Arc::clone(&self.schema)
    }

    fn common_format_encode(&self, event: &CommonFormatEvent) -> Result<Vec<u8>> {
        self.codec.encode(event)
    }

    fn common_format_decode(&self, bytes: &[u8]) -> Result<CommonFormatEvent> {
        self.codec.decode(bytes)
    }
}

impl<C: EventCodec> std::fmt::Debug for CommonFormatEncoder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommonFormatEncoder")
            .field("format", &self.codec.format())
            .field("binding", &self.binding)
            .field("columns", &self.schema.column_count())
            .finish()
    }
}
