//! Column projection for row conversion
//!
//! Decides which columns of a row end up in an event payload and which
//! values are redacted. Column names are matched case-insensitively.
//!
//! # Example
//!
//! ```rust
//! use rivven_encoder::{ColumnFilter, ColumnFilterConfig};
//!
//! let filter = ColumnFilter::new(ColumnFilterConfig {
//!     exclude: vec!["internal_notes".to_string()],
//!     mask: vec!["ssn".to_string()],
//!     ..Default::default()
//! });
//! assert!(!filter.includes("INTERNAL_NOTES"));
//! assert!(filter.masks("ssn"));
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Replacement value for masked columns
pub const REDACTED: &str = "***REDACTED***";

/// Column filter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFilterConfig {
    /// Columns to include (if empty, include all)
    #[serde(default)]
    pub include: Vec<String>,

    /// Columns to exclude
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Columns whose value is replaced by [`REDACTED`]
    #[serde(default)]
    pub mask: Vec<String>,
}

impl ColumnFilterConfig {
    pub fn is_empty(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty() && self.mask.is_empty()
    }
}

/// Compiled column filter
#[derive(Debug, Clone, Default)]
pub struct ColumnFilter {
    include: HashSet<String>,
    exclude: HashSet<String>,
    mask: HashSet<String>,
}

fn lowercase_set(names: &[String]) -> HashSet<String> {
    names.iter().map(|s| s.to_lowercase()).collect()
}

impl ColumnFilter {
    pub fn new(config: ColumnFilterConfig) -> Self {
        Self {
            include: lowercase_set(&config.include),
            exclude: lowercase_set(&config.exclude),
            mask: lowercase_set(&config.mask),
        }
    }

    /// Filter that passes every column unchanged
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Check if a column belongs in the payload
    pub fn includes(&self, column: &str) -> bool {
        let column = column.to_lowercase();
        if self.exclude.contains(&column) {
            return false;
        }
        self.include.is_empty() || self.include.contains(&column)
    }

    /// Check if a column value is redacted
    pub fn masks(&self, column: &str) -> bool {
        !self.mask.is_empty() && self.mask.contains(&column.to_lowercase())
    }

    /// Value to emit for `column`, or `None` if the column is filtered out.
    pub fn project(&self, column: &str, value: &Value) -> Option<Value> {
        if !self.includes(column) {
            return None;
        }
        if self.masks(column) {
            return Some(Value::String(REDACTED.to_string()));
        }
        Some(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_allow_all() {
        let filter = ColumnFilter::allow_all();
        assert!(filter.includes("anything"));
        assert!(!filter.masks("anything"));
        assert_eq!(filter.project("a", &json!(1)), Some(json!(1)));
    }

    #[test]
    fn test_include_list() {
        let filter = ColumnFilter::new(ColumnFilterConfig {
            include: vec!["id".to_string(), "Name".to_string()],
            ..Default::default()
        });
        assert!(filter.includes("ID"));
        assert!(filter.includes("name"));
        assert!(!filter.includes("email"));
    }

    #[test]
    fn test_exclude_wins_over_include() {
        let filter = ColumnFilter::new(ColumnFilterConfig {
            include: vec!["id".to_string(), "secret".to_string()],
            exclude: vec!["secret".to_string()],
            ..Default::default()
        });
        assert!(filter.includes("id"));
        assert!(!filter.includes("secret"));
        assert_eq!(filter.project("secret", &json!("x")), None);
    }

    #[test]
    fn test_mask() {
        let filter = ColumnFilter::new(ColumnFilterConfig {
            mask: vec!["SSN".to_string()],
            ..Default::default()
        });
        assert_eq!(
            filter.project("ssn", &json!("123-45-6789")),
            Some(json!(REDACTED))
        );
        assert_eq!(filter.project("name", &json!("Bob")), Some(json!("Bob")));
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: ColumnFilterConfig = serde_json::from_str(r#"{"mask": ["pw"]}"#).unwrap();
        assert!(config.include.is_empty());
        assert!(config.exclude.is_empty());
        assert_eq!(config.mask, vec!["pw".to_string()]);
        assert!(!config.is_empty());
        assert!(ColumnFilterConfig::default().is_empty());
    }
}
