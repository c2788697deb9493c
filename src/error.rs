// In: src/error.rs

//! This module defines the single, unified error type for the entire rowset library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.
//!
//! Every variant in the first group is a caller error: bad input that will fail
//! the same way on every retry. None of them are retried inside this crate.

use thiserror::Error;

use crate::types::ColumnType;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, RowSetError>;

#[derive(Error, Debug)]
pub enum RowSetError {
    // =========================================================================
    // === Semantic Errors (bad input from the caller)
    // =========================================================================
    /// The batch headers and the schema column ids disagree.
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Missing row id or version, wrong value count, empty schema or batch.
    #[error("Invalid row set: {0}")]
    Structural(String),

    /// A single value failed its column type's syntax, size or enum rule.
    #[error("Value at [{row},{column}] was not a valid {column_type}. {reason}")]
    ValueValidation {
        row: usize,
        column: usize,
        column_type: ColumnType,
        reason: String,
    },

    /// The identifier range was absent, undersized, or an update referenced an
    /// id that was never allocated.
    #[error("Identifier allocation error: {0}")]
    IdentifierAllocation(String),

    #[error("Duplicate identifier: {0}")]
    DuplicateIdentifier(String),

    #[error("Batch of {row_count} rows needs up to {required_bytes} bytes (limit {max_bytes})")]
    BatchTooLarge {
        row_count: usize,
        required_bytes: u64,
        max_bytes: u64,
    },

    /// The encoded row stream could not be read back.
    #[error("Row stream codec error: {0}")]
    Codec(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the delimited-text layer of the row codec.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An error from the Serde JSON library, typically while loading schemas or config.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error originating from the Arrow library.
    #[error("Arrow operation failed: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// An error for Python FFI (Foreign Function Interface) operations.
    #[error("FFI operation failed: {0}")]
    FfiError(String),
}

impl RowSetError {
    /// Shorthand used by the validators to build a coordinate-carrying error.
    pub(crate) fn invalid_value(
        row: usize,
        column: usize,
        column_type: ColumnType,
        reason: impl Into<String>,
    ) -> Self {
        RowSetError::ValueValidation {
            row,
            column,
            column_type,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

#[cfg(feature = "python")]
impl From<pyo3::PyErr> for RowSetError {
    fn from(err: pyo3::PyErr) -> Self {
        RowSetError::FfiError(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<RowSetError> for pyo3::PyErr {
    fn from(err: RowSetError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
