// In: src/validation/value.rs

//! The row value validator: the single choke point every raw value passes
//! through before it is encoded for storage.

use crate::error::{Result, RowSetError};
use crate::types::ColumnDefinition;

/// Validates and normalizes one raw value for `column`.
///
/// Absent input takes the column's default, which is itself validated. For
/// string-like columns only `None` is absent; an empty string is a real value.
/// For every other type `""` is treated exactly like `None`.
pub fn validate_value(
    raw: Option<&str>,
    column: &ColumnDefinition,
    row_index: usize,
    column_index: usize,
) -> Result<Option<String>> {
    let checked = match raw {
        Some(value) => check(value, column, row_index, column_index)?,
        None => None,
    };
    if checked.is_some() {
        return Ok(checked);
    }
    match column.default_value.as_deref() {
        Some(default) => check(default, column, row_index, column_index),
        None => Ok(None),
    }
}

fn check(
    value: &str,
    column: &ColumnDefinition,
    row_index: usize,
    column_index: usize,
) -> Result<Option<String>> {
    let column_type = column.column_type;
    let normalized = column_type
        .validate_syntax(value, column.max_size)
        .map_err(|reason| {
            RowSetError::invalid_value(row_index, column_index, column_type, reason)
        })?;

    if let (Some(allowed), Some(candidate)) = (&column.enum_values, &normalized) {
        if !allowed.contains(candidate) {
            let options: Vec<&str> = allowed.iter().map(String::as_str).collect();
            return Err(RowSetError::invalid_value(
                row_index,
                column_index,
                column_type,
                format!(
                    "'{}' is not one of the allowed values: [{}].",
                    candidate,
                    options.join(", ")
                ),
            ));
        }
    }
    Ok(normalized)
}
