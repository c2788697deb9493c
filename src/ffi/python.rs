// In: src/ffi/python.rs

//! The Python surface. Structured inputs cross the boundary as JSON documents
//! (schema, batch, range, config) so the Rust types stay the single definition.

use std::sync::Arc;

use hashbrown::HashSet;
use log::LevelFilter;
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use crate::bridge;
use crate::capacity;
use crate::config::RowSetConfig;
use crate::error::RowSetError;
use crate::observability;
use crate::types::{ColumnDefinition, IdRange, RowSet};

/// A decoded row as handed to Python: `(row_id, version, values)`.
type PyRow = (Option<i64>, Option<i64>, Option<Vec<Option<String>>>);

fn parse_json<T: serde::de::DeserializeOwned>(what: &str, json: &str) -> PyResult<T> {
    serde_json::from_str(json)
        .map_err(|e| RowSetError::FfiError(format!("invalid {} JSON: {}", what, e)).into())
}

fn parse_config(config_json: Option<&str>) -> PyResult<RowSetConfig> {
    match config_json {
        Some(json) => Ok(RowSetConfig::from_json_str(json)?),
        None => Ok(RowSetConfig::default()),
    }
}

//==================================================================================
// I. Write Path
//==================================================================================

/// Assigns identifiers from `range_json`, validates and encodes the batch.
#[pyfunction]
#[pyo3(name = "write_batch", signature = (schema_json, batch_json, range_json, config_json = None))]
pub fn write_batch_py<'py>(
    py: Python<'py>,
    schema_json: &str,
    batch_json: &str,
    range_json: &str,
    config_json: Option<&str>,
) -> PyResult<Bound<'py, PyBytes>> {
    let schema: Vec<ColumnDefinition> = parse_json("schema", schema_json)?;
    let batch: RowSet = parse_json("row set", batch_json)?;
    let range: IdRange = parse_json("id range", range_json)?;
    let config = Arc::new(parse_config(config_json)?);

    let bytes = py.allow_threads(|| bridge::write_batch(&schema, &batch, &range, config))?;
    Ok(PyBytes::new_bound(py, &bytes))
}

/// Validates and encodes a batch whose rows already carry ids and versions.
#[pyfunction]
#[pyo3(name = "validate_and_encode", signature = (schema_json, batch_json, config_json = None))]
pub fn validate_and_encode_py<'py>(
    py: Python<'py>,
    schema_json: &str,
    batch_json: &str,
    config_json: Option<&str>,
) -> PyResult<Bound<'py, PyBytes>> {
    let schema: Vec<ColumnDefinition> = parse_json("schema", schema_json)?;
    let batch: RowSet = parse_json("row set", batch_json)?;
    let config = parse_config(config_json)?;

    let bytes =
        py.allow_threads(|| bridge::validate_and_encode_to_vec(&schema, &batch, &config))?;
    Ok(PyBytes::new_bound(py, &bytes))
}

//==================================================================================
// II. Read Path
//==================================================================================

#[pyfunction]
#[pyo3(name = "decode", signature = (data, valid_row_ids = None))]
pub fn decode_py(py: Python, data: &[u8], valid_row_ids: Option<Vec<i64>>) -> PyResult<Vec<PyRow>> {
    let valid: Option<HashSet<i64>> = valid_row_ids.map(|ids| ids.into_iter().collect());
    let rows = py.allow_threads(|| bridge::decode(data, valid.as_ref()))?;
    Ok(rows
        .into_iter()
        .map(|row| (row.row_id, row.version_number, row.values))
        .collect())
}

//==================================================================================
// III. Capacity & Utilities
//==================================================================================

#[pyfunction]
#[pyo3(name = "max_row_size")]
pub fn max_row_size_py(schema_json: &str) -> PyResult<usize> {
    let schema: Vec<ColumnDefinition> = parse_json("schema", schema_json)?;
    Ok(capacity::max_row_size(&schema))
}

#[pyfunction]
#[pyo3(name = "fits_within_budget")]
pub fn fits_within_budget_py(
    schema_json: &str,
    row_count: usize,
    max_batch_bytes: u64,
) -> PyResult<bool> {
    let schema: Vec<ColumnDefinition> = parse_json("schema", schema_json)?;
    Ok(capacity::fits_within_budget(&schema, row_count, max_batch_bytes))
}

#[pyfunction]
#[pyo3(name = "enable_verbose_logging", signature = (log_file = None))]
pub fn enable_verbose_logging_py(log_file: Option<&str>) -> PyResult<()> {
    Ok(observability::init_logging(LevelFilter::Info, log_file)?)
}
