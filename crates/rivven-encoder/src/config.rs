//! Encoder configuration
//!
//! The wire format is always explicit. There is no process-wide default;
//! every encoder and every dispatch call receives its format as a value.
//!
//! ```yaml
//! format: msgpack
//! columns:
//!   exclude: [internal_notes]
//!   mask: [ssn, password]
//! ```

use crate::error::{EncoderError, Result};
use crate::filter::ColumnFilterConfig;
use crate::format::WireFormat;
use serde::{Deserialize, Serialize};

/// Configuration for a table-bound encoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Wire format (json or msgpack)
    pub format: WireFormat,

    /// Column projection applied to row payloads
    #[serde(default)]
    pub columns: ColumnFilterConfig,
}

impl EncoderConfig {
    pub fn new(format: WireFormat) -> Self {
        Self {
            format,
            columns: ColumnFilterConfig::default(),
        }
    }

    /// JSON encoder configuration
    pub fn json() -> Self {
        Self::new(WireFormat::Json)
    }

    /// MessagePack encoder configuration
    pub fn msgpack() -> Self {
        Self::new(WireFormat::MsgPack)
    }

    pub fn with_columns(mut self, columns: ColumnFilterConfig) -> Self {
        self.columns = columns;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let cols = &self.columns;
        if cols
            .include
            .iter()
            .chain(&cols.exclude)
            .chain(&cols.mask)
            .any(|name| name.trim().is_empty())
        {
            return Err(EncoderError::config("column names must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize() {
        let config: EncoderConfig =
            serde_json::from_str(r#"{"format": "msgpack", "columns": {"mask": ["ssn"]}}"#)
                .unwrap();
        assert_eq!(config.format, WireFormat::MsgPack);
        assert_eq!(config.columns.mask, vec!["ssn".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_format_is_required() {
        assert!(serde_json::from_str::<EncoderConfig>(r#"{"columns": {}}"#).is_err());
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(serde_json::from_str::<EncoderConfig>(r#"{"format": "xml"}"#).is_err());
    }

    #[test]
    fn test_constructors() {
        assert_eq!(EncoderConfig::json().format, WireFormat::Json);
        assert_eq!(EncoderConfig::msgpack().format, WireFormat::MsgPack);
        assert!(EncoderConfig::json().columns.is_empty());
    }

    #[test]
    fn test_validate_rejects_blank_column() {
        let config = EncoderConfig::json().with_columns(ColumnFilterConfig {
            exclude: vec![" ".to_string()],
            ..Default::default()
        });
        assert!(matches!(config.validate(), Err(EncoderError::Config(_))));
    }
}
