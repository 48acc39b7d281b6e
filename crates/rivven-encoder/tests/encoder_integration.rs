//! Integration tests for rivven-encoder
//!
//! Drives the public API the way a CDC pipeline does: registry at startup,
//! one encoder per table, rows in, wire bytes out, and sequential decoding
//! of concatenated events from one buffer.

use bytes::BytesMut;
use rivven_encoder::{
    begin_buffered_decode, decode_common, derive_event_key, derive_row_key, encode_common,
    reconcile, ColumnSchema, CommonFormatEvent, EncoderConfig, EncoderError, EncoderRegistry,
    EventType, MemorySchemaStore, SchemaStore, TableSchema, WireFormat,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

fn orders_v1() -> TableSchema {
    TableSchema::new(
        "billing",
        "shop",
        "orders",
        vec![
            ColumnSchema::new("id", "varchar").primary_key(),
            ColumnSchema::new("status", "varchar"),
        ],
    )
}

fn orders_v2() -> TableSchema {
    let mut schema = orders_v1();
    schema
        .columns
        .push(ColumnSchema::new("region", "varchar").primary_key());
    schema
}

/// Schema store that can be switched into a failing state
struct FlakyStore {
    inner: MemorySchemaStore,
    failing: AtomicBool,
}

impl FlakyStore {
    fn new(schema: TableSchema) -> Self {
        let inner = MemorySchemaStore::new();
        inner.put(schema);
        Self {
            inner,
            failing: AtomicBool::new(false),
        }
    }
}

impl SchemaStore for FlakyStore {
    fn load_schema(
        &self,
        service: &str,
        db: &str,
        table: &str,
    ) -> rivven_encoder::Result<TableSchema> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(EncoderError::schema_load(
                format!("{}.{}.{}", service, db, table),
                "state db unavailable",
            ));
        }
        self.inner.load_schema(service, db, table)
    }
}

#[test]
fn test_row_key_end_to_end() {
    let schema = orders_v1();
    let row = [json!("42"), json!("x")];
    assert_eq!(derive_row_key(&schema, Some(&row[..])), "242");
}

#[test]
fn test_rows_through_every_format() {
    init_tracing();
    let store = Arc::new(MemorySchemaStore::new());
    store.put(orders_v1());
    let registry = EncoderRegistry::with_builtin(store);

    for format in WireFormat::ALL {
        let encoder = registry
            .create(format.name(), "billing", "shop", "orders")
            .unwrap();
        let row = [json!("A-1"), json!("paid")];

        let bytes = encoder.row(EventType::Update, &row, 17).unwrap();
        let via_encoder = encoder.common_format_decode(&bytes).unwrap();
        let via_dispatch = decode_common(&bytes, format).unwrap();

        assert_eq!(via_encoder, via_dispatch);
        assert_eq!(via_encoder.event_type, EventType::Update);
        assert_eq!(via_encoder.seq_no, 17);
        assert_eq!(
            derive_event_key(&via_encoder),
            derive_row_key(&encoder.schema(), Some(&row[..]))
        );
    }
}

#[test]
fn test_unregistered_format_never_yields_encoder() {
    let store = Arc::new(MemorySchemaStore::new());
    store.put(orders_v1());

    let registry = EncoderRegistry::with_builtin(store.clone());
    for name in ["avro", "protobuf", "", "json "] {
        let result = registry.create(name, "billing", "shop", "orders");
        assert!(matches!(result, Err(EncoderError::UnknownFormat(_))), "{:?}", name);
    }

    let empty = EncoderRegistry::new(store);
    assert!(empty.create("json", "billing", "shop", "orders").is_err());
}

#[test]
fn test_schema_change_flow() {
    init_tracing();
    let store = Arc::new(FlakyStore::new(orders_v1()));
    let registry = EncoderRegistry::with_builtin(store.clone());
    let mut encoder = registry.create("json", "billing", "shop", "orders").unwrap();

    // Upstream alters the table, then reports the change.
    store.inner.put(orders_v2());
    let notification = CommonFormatEvent::schema_change(vec![json!("id")], 100);
    encoder.common_format(&notification).unwrap();
    assert_eq!(*encoder.schema(), orders_v2());

    let row = [json!("A-2"), json!("new"), json!("eu")];
    let bytes = encoder.row(EventType::Insert, &row, 101).unwrap();
    let event = encoder.common_format_decode(&bytes).unwrap();
    assert_eq!(event.key, vec![json!("A-2"), json!("eu")]);

    // Old-shaped rows are now rejected.
    let err = encoder
        .row(EventType::Insert, &[json!("A-3"), json!("new")], 102)
        .unwrap_err();
    assert!(matches!(
        err,
        EncoderError::ShapeMismatch {
            expected: 3,
            actual: 2
        }
    ));
}

#[test]
fn test_failed_refresh_keeps_encoder_usable() {
    let store = Arc::new(FlakyStore::new(orders_v1()));
    let registry = EncoderRegistry::with_builtin(store.clone());
    let mut encoder = registry.create("msgpack", "billing", "shop", "orders").unwrap();

    store.inner.put(orders_v2());
    store.failing.store(true, Ordering::SeqCst);

    let err = encoder.update_codec().unwrap_err();
    assert!(err.is_retriable());
    assert_eq!(*encoder.schema(), orders_v1());
    assert!(encoder
        .common_format(&CommonFormatEvent::schema_change(vec![], 5))
        .is_err());
    assert!(encoder
        .row(EventType::Delete, &[json!("A-1"), json!("gone")], 6)
        .is_ok());

    // Creating a new encoder fails outright while the store is down.
    assert!(registry.create("msgpack", "billing", "shop", "orders").is_err());

    store.failing.store(false, Ordering::SeqCst);
    encoder.update_codec().unwrap();
    assert_eq!(*encoder.schema(), orders_v2());
}

#[test]
fn test_sequential_decode_from_shared_buffer() {
    init_tracing();
    let store = Arc::new(MemorySchemaStore::new());
    store.put(orders_v1());
    let registry = EncoderRegistry::with_builtin(store);

    for format in WireFormat::ALL {
        let encoder = registry
            .create_with_config(&EncoderConfig::new(format), "billing", "shop", "orders")
            .unwrap();

        let rows: Vec<[Value; 2]> = (0..5)
            .map(|i| [json!(format!("A-{}", i)), json!("open")])
            .collect();

        let mut buf = BytesMut::new();
        for (i, row) in rows.iter().enumerate() {
            buf.extend_from_slice(&encoder.row(EventType::Insert, row, i as u64).unwrap());
        }

        for (i, row) in rows.iter().enumerate() {
            let (handoff, event) = begin_buffered_decode(&buf, format).unwrap();
            assert_eq!(handoff.format(), format);
            assert_eq!(event.seq_no, i as u64);
            assert_eq!(event.key, vec![row[0].clone()]);
            reconcile(&mut buf, handoff).unwrap();
        }
        assert!(buf.is_empty(), "{}", format);
    }
}

#[test]
fn test_two_binary_events_leave_second_in_buffer() {
    let first = CommonFormatEvent::schema_change(vec![json!("id")], 1);
    let second = CommonFormatEvent::delete(vec![json!("A-9")], vec![], 2);
    let second_bytes = encode_common(&second, WireFormat::MsgPack).unwrap();

    let mut buf = BytesMut::new();
    buf.extend_from_slice(&encode_common(&first, WireFormat::MsgPack).unwrap());
    buf.extend_from_slice(&second_bytes);

    let (handoff, decoded) = begin_buffered_decode(&buf, WireFormat::MsgPack).unwrap();
    assert_eq!(decoded, first);
    reconcile(&mut buf, handoff).unwrap();
    assert_eq!(&buf[..], &second_bytes[..]);
    assert_eq!(decode_common(&buf, WireFormat::MsgPack).unwrap(), second);
}

#[test]
fn test_config_driven_format_selection() {
    let store = Arc::new(MemorySchemaStore::new());
    store.put(orders_v1());
    let registry = EncoderRegistry::with_builtin(store);

    let config: EncoderConfig = serde_json::from_value(json!({
        "format": "msgpack",
        "columns": { "exclude": ["status"] }
    }))
    .unwrap();

    let encoder = registry
        .create_with_config(&config, "billing", "shop", "orders")
        .unwrap();
    assert_eq!(encoder.encoder_type(), "msgpack");

    let bytes = encoder
        .row(EventType::Insert, &[json!("A-1"), json!("paid")], 1)
        .unwrap();
    let event = decode_common(&bytes, config.format).unwrap();
    assert!(event.field("status").is_none());
    assert_eq!(event.field("id"), Some(&json!("A-1")));
}
