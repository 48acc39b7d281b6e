//! Error types for encoder operations
//!
//! Every error is returned to the immediate caller. Nothing in this crate
//! retries; retry policy belongs to the transport and the schema store.
//! An error is fatal to the current operation but never to the encoder,
//! which keeps working with its last good schema.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error categories for metrics and alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Unknown format or invalid settings
    Configuration,
    /// Schema store could not supply a schema
    Schema,
    /// Row does not match the bound schema
    Input,
    /// Malformed payload or codec failure
    Serialization,
    /// Shared buffer bookkeeping failed
    Buffer,
}

/// Encoder-specific errors
#[derive(Error, Debug)]
pub enum EncoderError {
    /// Registry or dispatch was given a format that is not registered
    #[error("Unsupported format: no such encoder '{0}'")]
    UnknownFormat(String),

    /// Schema store failed; the previous snapshot is retained
    #[error("Schema load failure for {binding}: {reason}")]
    SchemaLoad { binding: String, reason: String },

    /// Row field count differs from the schema column count
    #[error("Shape mismatch: row has {actual} fields, schema has {expected} columns")]
    ShapeMismatch { expected: usize, actual: usize },

    /// Generic serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON codec error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MessagePack encode error
    #[error("MessagePack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MessagePack decode error
    #[error("MessagePack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// Buffered decode hand-off could not determine the unconsumed remainder
    #[error("Reconcile failure: {0}")]
    Reconcile(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl EncoderError {
    /// Create an unknown format error
    pub fn unknown_format(name: impl Into<String>) -> Self {
        Self::UnknownFormat(name.into())
    }

    /// Create a schema load error for a `service.db.table` binding
    pub fn schema_load(binding: impl ToString, reason: impl Into<String>) -> Self {
        Self::SchemaLoad {
            binding: binding.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a shape mismatch error
    pub fn shape_mismatch(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Create a serialization error
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a reconcile error
    pub fn reconcile(msg: impl Into<String>) -> Self {
        Self::Reconcile(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if a caller-side retry may succeed.
    ///
    /// Only schema store failures can be transient. Everything else fails
    /// the same way on every attempt.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Self::SchemaLoad { .. })
    }

    /// Get the error category for metrics and alerting.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownFormat(_) | Self::Config(_) => ErrorCategory::Configuration,
            Self::SchemaLoad { .. } => ErrorCategory::Schema,
            Self::ShapeMismatch { .. } => ErrorCategory::Input,
            Self::Serialization(_)
            | Self::Json(_)
            | Self::MsgPackEncode(_)
            | Self::MsgPackDecode(_) => ErrorCategory::Serialization,
            Self::Reconcile(_) => ErrorCategory::Buffer,
        }
    }

    /// Get a metric-safe error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownFormat(_) => "unknown_format",
            Self::SchemaLoad { .. } => "schema_load_failure",
            Self::ShapeMismatch { .. } => "shape_mismatch",
            Self::Serialization(_) => "serialization_error",
            Self::Json(_) => "json_error",
            Self::MsgPackEncode(_) => "msgpack_encode_error",
            Self::MsgPackDecode(_) => "msgpack_decode_error",
            Self::Reconcile(_) => "reconcile_failure",
            Self::Config(_) => "config_error",
        }
    }
}

/// Result type for encoder operations
pub type Result<T> = std::result::Result<T, EncoderError>;
