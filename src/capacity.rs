// In: src/capacity.rs

//! The capacity planner for write-batch admission control.
//!
//! Sizes here are worst-case upper bounds computed from the schema alone, so a
//! coordinator can decide how many rows go into one request before any value
//! is known. `actual_row_size` is the exact counterpart for rows in hand.

use crate::error::{Result, RowSetError};
use crate::types::{ColumnDefinition, Row, RowSet};

/// Bytes accounted for the row id and version of every row.
const ROW_IDENTITY_BYTES: usize = 2 * std::mem::size_of::<i64>();

/// Sum of the worst-case byte sizes of every column.
pub fn max_row_size(schema: &[ColumnDefinition]) -> usize {
    schema.iter().map(ColumnDefinition::max_byte_size).sum()
}

/// `row_count * max_row_size(schema) <= max_batch_bytes`, without overflow.
pub fn fits_within_budget(
    schema: &[ColumnDefinition],
    row_count: usize,
    max_batch_bytes: u64,
) -> bool {
    required_bytes(schema, row_count) <= max_batch_bytes as u128
}

/// Like [`fits_within_budget`] but reports how far over the limit a batch is.
pub fn check_within_budget(
    schema: &[ColumnDefinition],
    row_count: usize,
    max_batch_bytes: u64,
) -> Result<()> {
    if fits_within_budget(schema, row_count, max_batch_bytes) {
        return Ok(());
    }
    let required = required_bytes(schema, row_count);
    log::warn!(
        "batch of {} rows needs up to {} bytes (limit {})",
        row_count,
        required,
        max_batch_bytes
    );
    Err(RowSetError::BatchTooLarge {
        row_count,
        required_bytes: u64::try_from(required).unwrap_or(u64::MAX),
        max_bytes: max_batch_bytes,
    })
}

/// The largest row count that still fits the budget. An empty schema has no
/// per-row cost and is rejected.
pub fn max_rows_per_batch(schema: &[ColumnDefinition], max_batch_bytes: u64) -> Result<usize> {
    let row_size = max_row_size(schema) as u64;
    if row_size == 0 {
        return Err(RowSetError::Structural(
            "cannot size batches for an empty schema".to_string(),
        ));
    }
    Ok(usize::try_from(max_batch_bytes / row_size).unwrap_or(usize::MAX))
}

/// Exact UTF-8 size of a row's values plus its identity fields.
pub fn actual_row_size(row: &Row) -> usize {
    let values: usize = row
        .values
        .iter()
        .flatten()
        .flatten()
        .map(String::len)
        .sum();
    ROW_IDENTITY_BYTES + values
}

/// Splits `batch` into consecutive chunks of at most `max_rows_per_batch` rows.
/// Headers and table id are repeated on every chunk.
pub fn chunk_row_set(
    schema: &[ColumnDefinition],
    batch: &RowSet,
    max_batch_bytes: u64,
) -> Result<Vec<RowSet>> {
    let per_chunk = max_rows_per_batch(schema, max_batch_bytes)?;
    if per_chunk == 0 {
        return Err(RowSetError::BatchTooLarge {
            row_count: 1,
            required_bytes: max_row_size(schema) as u64,
            max_bytes: max_batch_bytes,
        });
    }
    let chunks: Vec<RowSet> = batch
        .rows
        .chunks(per_chunk)
        .map(|rows| RowSet {
            table_id: batch.table_id.clone(),
            headers: batch.headers.clone(),
            rows: rows.to_vec(),
        })
        .collect();
    log::debug!(
        "split {} rows into {} chunks of at most {} rows",
        batch.rows.len(),
        chunks.len(),
        per_chunk
    );
    Ok(chunks)
}

fn required_bytes(schema: &[ColumnDefinition], row_count: usize) -> u128 {
    row_count as u128 * max_row_size(schema) as u128
}
