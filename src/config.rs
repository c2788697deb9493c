// In: src/config.rs

//! The single source of truth for write-path configuration.
//!
//! `RowSetConfig` is created once at the application boundary (from a JSON
//! document, a Python dictionary, or `Default`) and passed down as a shared,
//! read-only `Arc<RowSetConfig>`. Every pure function in the crate takes its
//! limits as explicit arguments; only the `bridge` reads this struct.

use serde::{Deserialize, Serialize};

use crate::codec::Compression;
use crate::error::Result;

//==================================================================================
// I. The Unified RowSetConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct RowSetConfig {
    /// Compression applied to the encoded row stream.
    #[serde(default)]
    pub compression: Compression,

    /// Gzip level, 0-9. Only used when `compression` is `gzip`.
    #[serde(default = "default_gzip_level")]
    pub gzip_level: u32,

    /// Zstd level. Only used when `compression` is `zstd`.
    #[serde(default = "default_zstd_level")]
    pub zstd_level: i32,

    /// **The byte ceiling for one write request.**
    /// Compared against `row_count * max_row_size(schema)`.
    #[serde(default = "default_max_batch_bytes")]
    pub max_batch_bytes: u64,

    /// If true, `validate_and_encode` refuses batches that do not fit
    /// `max_batch_bytes` before any value is validated.
    #[serde(default = "default_true")]
    pub enforce_batch_budget: bool,
}

impl Default for RowSetConfig {
    fn default() -> Self {
        Self {
            compression: Compression::default(),
            gzip_level: default_gzip_level(),
            zstd_level: default_zstd_level(),
            max_batch_bytes: default_max_batch_bytes(),
            enforce_batch_budget: true,
        }
    }
}

impl RowSetConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}

fn default_gzip_level() -> u32 {
    6
}

fn default_zstd_level() -> i32 {
    3
}

/// 2 MiB.
fn default_max_batch_bytes() -> u64 {
    2 * 1024 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = RowSetConfig::from_json_str("{}").unwrap();
        assert_eq!(config, RowSetConfig::default());
        assert_eq!(config.compression, Compression::Gzip);
        assert!(config.enforce_batch_budget);
    }

    #[test]
    fn test_partial_document_overrides() {
        let config = RowSetConfig::from_json_str(
            r#"{"compression": "zstd", "max_batch_bytes": 1024, "enforce_batch_budget": false}"#,
        )
        .unwrap();
        assert_eq!(config.compression, Compression::Zstd);
        assert_eq!(config.max_batch_bytes, 1024);
        assert!(!config.enforce_batch_budget);
        assert_eq!(config.zstd_level, 3);
    }

    #[test]
    fn test_unknown_compression_is_rejected() {
        assert!(RowSetConfig::from_json_str(r#"{"compression": "lz4"}"#).is_err());
    }
}
