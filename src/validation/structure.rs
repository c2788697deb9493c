// In: src/validation/structure.rs

//! Structural checks on a whole row batch: header/schema agreement, value
//! counts, and row identity.

use hashbrown::{HashMap, HashSet};

use crate::error::{Result, RowSetError};
use crate::types::{ColumnDefinition, Row, RowSet};

/// Row ids are allocated starting at 1; zero and negatives never identify a row.
pub fn is_valid_row_id(row_id: Option<i64>) -> bool {
    matches!(row_id, Some(id) if id > 0)
}

/// Maps each header column id to its position. Repeated ids are rejected.
pub fn column_index_map(headers: &[String]) -> Result<HashMap<&str, usize>> {
    let mut index = HashMap::with_capacity(headers.len());
    for (position, id) in headers.iter().enumerate() {
        if index.insert(id.as_str(), position).is_some() {
            return Err(RowSetError::SchemaMismatch(format!(
                "column '{}' appears more than once in the headers",
                id
            )));
        }
    }
    Ok(index)
}

/// Checks that `headers` is a bijection onto the schema's column ids and returns
/// the header position of each column id. Repeated schema ids are rejected.
pub fn check_headers<'a>(
    schema: &[ColumnDefinition],
    headers: &'a [String],
) -> Result<HashMap<&'a str, usize>> {
    if headers.is_empty() {
        return Err(RowSetError::Structural("headers cannot be empty".to_string()));
    }
    let mut schema_ids = HashSet::with_capacity(schema.len());
    if let Some(repeated) = schema.iter().find(|c| !schema_ids.insert(c.id.as_str())) {
        return Err(RowSetError::SchemaMismatch(format!(
            "column id '{}' appears more than once in the schema",
            repeated.id
        )));
    }
    let index = column_index_map(headers)?;
    if let Some(missing) = schema.iter().find(|c| !index.contains_key(c.id.as_str())) {
        return Err(RowSetError::SchemaMismatch(format!(
            "the headers do not include column '{}' (id {})",
            missing.name, missing.id
        )));
    }
    if headers.len() != schema.len() {
        let known: HashSet<&str> = schema.iter().map(|c| c.id.as_str()).collect();
        let unknown = headers
            .iter()
            .find(|id| !known.contains(id.as_str()))
            .map(String::as_str)
            .unwrap_or_default();
        return Err(RowSetError::SchemaMismatch(format!(
            "header '{}' is not a column of the schema",
            unknown
        )));
    }
    Ok(index)
}

/// Full structural check of a batch that is about to be encoded.
pub fn check_row_set(schema: &[ColumnDefinition], batch: &RowSet) -> Result<()> {
    if schema.is_empty() {
        return Err(RowSetError::Structural("schema cannot be empty".to_string()));
    }
    if batch.rows.is_empty() {
        return Err(RowSetError::Structural(
            "row set must contain at least one row".to_string(),
        ));
    }
    check_headers(schema, &batch.headers)?;
    let width = batch.headers.len();
    for (row_index, row) in batch.rows.iter().enumerate() {
        check_row_shape(row, row_index, width)?;
    }
    Ok(())
}

fn check_row_shape(row: &Row, row_index: usize, width: usize) -> Result<()> {
    check_row_width(row, row_index, width)?;
    if row.row_id.is_none() {
        return Err(RowSetError::Structural(format!(
            "row {} is missing a row id",
            row_index
        )));
    }
    if row.version_number.is_none() {
        return Err(RowSetError::Structural(format!(
            "row {} is missing a version number",
            row_index
        )));
    }
    Ok(())
}

/// A row that carries values must carry exactly `width` of them.
pub(crate) fn check_row_width(row: &Row, row_index: usize, width: usize) -> Result<()> {
    if let Some(values) = &row.values {
        if !values.is_empty() && values.len() != width {
            return Err(RowSetError::Structural(format!(
                "row {} has {} values but the headers declare {} columns",
                row_index,
                values.len(),
                width
            )));
        }
    }
    Ok(())
}

/// Counts rows whose id is absent or not positive.
pub fn count_empty_or_invalid_row_ids(batch: &RowSet) -> usize {
    batch
        .rows
        .iter()
        .filter(|row| !is_valid_row_id(row.row_id))
        .count()
}

/// Collects every valid row id with its version. A valid id that appears twice
/// is a caller bug and fails the whole batch.
pub fn get_distinct_valid_row_ids(rows: &[Row]) -> Result<HashMap<i64, Option<i64>>> {
    let mut distinct = HashMap::with_capacity(rows.len());
    for row in rows {
        if let Some(row_id) = row.row_id.filter(|id| *id > 0) {
            if distinct.insert(row_id, row.version_number).is_some() {
                return Err(RowSetError::DuplicateIdentifier(format!(
                    "row {} appears more than once in a single batch",
                    row_id
                )));
            }
        }
    }
    Ok(distinct)
}

/// Collects the version numbers present in `rows`. Every row must carry one;
/// repeats collapse since all rows of one write share a version.
pub fn get_distinct_version_numbers(rows: &[Row]) -> Result<HashSet<i64>> {
    rows.iter()
        .enumerate()
        .map(|(row_index, row)| {
            row.version_number.ok_or_else(|| {
                RowSetError::Structural(format!(
                    "row {} is missing a version number",
                    row_index
                ))
            })
        })
        .collect()
}
