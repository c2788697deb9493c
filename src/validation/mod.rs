//! Validation of caller-supplied rows: the per-value validator and the
//! batch-level structural checker.
//!
//! `validate_row_set` is the combination used by the write path. It checks the
//! batch shape once, then normalizes every value against its column and returns
//! a new batch; the input is never modified.

use crate::error::{Result, RowSetError};
use crate::types::{ColumnDefinition, Row, RowSet};

pub mod structure;
pub mod value;

pub use structure::{
    check_headers, check_row_set, column_index_map, count_empty_or_invalid_row_ids,
    get_distinct_valid_row_ids, get_distinct_version_numbers, is_valid_row_id,
};
pub use value::validate_value;

/// Structurally checks `batch` and returns a copy with every value normalized.
pub fn validate_row_set(schema: &[ColumnDefinition], batch: &RowSet) -> Result<RowSet> {
    check_row_set(schema, batch)?;
    let columns = header_columns(schema, &batch.headers)?;

    let rows = batch
        .rows
        .iter()
        .enumerate()
        .map(|(row_index, row)| normalize_row(row, row_index, &columns))
        .collect::<Result<Vec<_>>>()?;

    log::debug!(
        "validated {} rows across {} columns",
        rows.len(),
        columns.len()
    );
    Ok(RowSet {
        table_id: batch.table_id.clone(),
        headers: batch.headers.clone(),
        rows,
    })
}

/// The column definition behind each header position.
pub(crate) fn header_columns<'a>(
    schema: &'a [ColumnDefinition],
    headers: &[String],
) -> Result<Vec<&'a ColumnDefinition>> {
    let index = check_headers(schema, headers)?;
    let mut columns: Vec<Option<&ColumnDefinition>> = vec![None; headers.len()];
    for column in schema {
        if let Some(&position) = index.get(column.id.as_str()) {
            columns[position] = Some(column);
        }
    }
    columns
        .into_iter()
        .zip(headers)
        .map(|(column, header)| {
            column.ok_or_else(|| {
                RowSetError::SchemaMismatch(format!(
                    "header '{}' is not a column of the schema",
                    header
                ))
            })
        })
        .collect()
}

/// Normalizes the values of one row; deletion markers pass through untouched.
pub(crate) fn normalize_row(
    row: &Row,
    row_index: usize,
    columns: &[&ColumnDefinition],
) -> Result<Row> {
    structure::check_row_width(row, row_index, columns.len())?;
    let values = match &row.values {
        Some(values) if !values.is_empty() => Some(
            values
                .iter()
                .zip(columns)
                .enumerate()
                .map(|(column_index, (raw, column))| {
                    validate_value(raw.as_deref(), column, row_index, column_index)
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        _ => None,
    };
    Ok(Row {
        row_id: row.row_id,
        version_number: row.version_number,
        values,
    })
}
