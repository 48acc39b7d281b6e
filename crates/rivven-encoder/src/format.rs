//! Wire formats and the canonical codec dispatch
//!
//! Two wire formats are supported:
//! - **JSON**: textual, human-readable (development, audit logs)
//! - **MessagePack**: compact binary, structs encoded as named maps
//!
//! The formats agree on the event's fields but are not bit-compatible with
//! each other. Each format is an [`EventCodec`] strategy; the table-bound
//! encoders and the free dispatch functions below share them.
//!
//! # Example
//!
//! ```rust
//! use rivven_encoder::{decode_common, encode_common, CommonFormatEvent, WireFormat};
//!
//! let event = CommonFormatEvent::schema_change(vec![], 1);
//! let format: WireFormat = "MsgPack".parse().unwrap();
//! let bytes = encode_common(&event, format).unwrap();
//! assert_eq!(decode_common(&bytes, format).unwrap(), event);
//! ```

use crate::error::{EncoderError, Result};
use crate::event::CommonFormatEvent;
use serde::{Deserialize, Serialize};

/// Wire format selection
///
/// There is no default: the format is always chosen explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// JSON - textual
    Json,
    /// MessagePack - binary
    #[serde(rename = "msgpack")]
    MsgPack,
}

impl WireFormat {
    /// All supported formats
    pub const ALL: [WireFormat; 2] = [WireFormat::Json, WireFormat::MsgPack];

    /// Registered format name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::MsgPack => "msgpack",
        }
    }

    /// Check if this format produces binary output
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::MsgPack)
    }

    /// Get the content type for this format
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::MsgPack => "application/msgpack",
        }
    }
}

impl std::fmt::Display for WireFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for WireFormat {
    type Err = EncoderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "msgpack" => Ok(Self::MsgPack),
            _ => Err(EncoderError::unknown_format(s)),
        }
    }
}

/// Serialize/deserialize primitive pair for one wire format
pub trait EventCodec: Send + Sync + 'static {
    /// Format this codec implements
    fn format(&self) -> WireFormat;

    /// Serialize an event
    fn encode(&self, event: &CommonFormatEvent) -> Result<Vec<u8>>;

    /// Deserialize exactly one event occupying all of `bytes`
    fn decode(&self, bytes: &[u8]) -> Result<CommonFormatEvent>;
}

/// JSON codec
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl EventCodec for JsonCodec {
    fn format(&self) -> WireFormat {
        WireFormat::Json
    }

    fn encode(&self, event: &CommonFormatEvent) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(event)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<CommonFormatEvent> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// MessagePack codec
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

impl EventCodec for MsgPackCodec {
    fn format(&self) -> WireFormat {
        WireFormat::MsgPack
    }

    fn encode(&self, event: &CommonFormatEvent) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(event)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<CommonFormatEvent> {
        let mut reader = bytes;
        let event = rmp_serde::from_read(&mut reader)?;
        if !reader.is_empty() {
            return Err(EncoderError::serialization(format!(
                "{} trailing bytes after MessagePack event",
                reader.len()
            )));
        }
        Ok(event)
    }
}

/// Encode a common format event without a table-bound encoder.
///
/// Pure; safe to call from any number of threads.
pub fn encode_common(event: &CommonFormatEvent, format: WireFormat) -> Result<Vec<u8>> {
    match format {
        WireFormat::Json => JsonCodec.encode(event),
        WireFormat::MsgPack => MsgPackCodec.encode(event),
    }
}

/// Decode a common format event without a table-bound encoder.
pub fn decode_common(bytes: &[u8], format: WireFormat) -> Result<CommonFormatEvent> {
    match format {
        WireFormat::Json => JsonCodec.decode(bytes),
        WireFormat::MsgPack => MsgPackCodec.decode(bytes),
    }
}
