// In: src/codec/format.rs

//! Defines the wire conventions of the row stream and the header helpers that
//! sit next to it.
//!
//! Record layout: `rowId,versionNumber,value_1,...,value_k` in schema column
//! order, CSV quoting (fields holding a delimiter, quote or line break are
//! wrapped in `"` and inner quotes doubled), `\n` terminated, no header line.
//! A deletion row is the two identifier fields alone.
//!
//! CSV cannot tell a null from an empty string, so values carry one more rule:
//! null is written as the token `\N`, and a real value starting with `\` gets an
//! extra leading `\`. An empty field is always the empty string.

use std::borrow::Cow;

use hashbrown::HashSet;

use crate::error::{Result, RowSetError};
use crate::types::{ColumnDefinition, ColumnType, ROW_ID, ROW_VERSION};

//==================================================================================
// I. Value Escaping
//==================================================================================

/// The field written for a null value.
pub const NULL_TOKEN: &str = "\\N";
const ESCAPE: char = '\\';
/// Separator of the column-id fingerprint.
const COLUMN_ID_DELIMITER: char = ',';

pub(crate) fn escape_value(value: Option<&str>) -> Cow<'_, str> {
    match value {
        None => Cow::Borrowed(NULL_TOKEN),
        Some(v) if v.starts_with(ESCAPE) => Cow::Owned(format!("{}{}", ESCAPE, v)),
        Some(v) => Cow::Borrowed(v),
    }
}

pub(crate) fn unescape_field(field: &str) -> Result<Option<String>> {
    if field == NULL_TOKEN {
        return Ok(None);
    }
    match field.strip_prefix(ESCAPE) {
        Some(rest) if rest.starts_with(ESCAPE) => Ok(Some(rest.to_string())),
        Some(_) => Err(RowSetError::Codec(format!(
            "malformed escape sequence in field '{}'",
            field
        ))),
        None => Ok(Some(field.to_string())),
    }
}

//==================================================================================
// II. Header Helpers
//==================================================================================

/// Renders display names for `column_ids`, optionally prefixed with the
/// `ROW_ID` / `ROW_VERSION` labels.
pub fn column_name_header(
    column_ids: &[String],
    schema: &[ColumnDefinition],
    include_row_id_and_version: bool,
) -> Result<Vec<String>> {
    let mut header = Vec::with_capacity(column_ids.len() + 2);
    if include_row_id_and_version {
        header.push(ROW_ID.to_string());
        header.push(ROW_VERSION.to_string());
    }
    for id in column_ids {
        let column = schema.iter().find(|c| &c.id == id).ok_or_else(|| {
            RowSetError::SchemaMismatch(format!("column id '{}' is not in the schema", id))
        })?;
        header.push(column.name.clone());
    }
    Ok(header)
}

/// One position of a recognized header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderColumn {
    RowId,
    RowVersion,
    /// Index into the schema.
    Column(usize),
}

/// Interprets `candidate` as a header row of column names.
///
/// Returns `None` when any name is unknown or repeated: the row is then most
/// likely data, and the caller should treat the file as having no header.
pub fn map_first_data_row_to_columns(
    candidate: &[String],
    schema: &[ColumnDefinition],
) -> Option<Vec<HeaderColumn>> {
    if candidate.is_empty() {
        return None;
    }
    let mut seen = HashSet::with_capacity(candidate.len());
    let mut mapping = Vec::with_capacity(candidate.len());
    for name in candidate {
        let column = match name.as_str() {
            ROW_ID => HeaderColumn::RowId,
            ROW_VERSION => HeaderColumn::RowVersion,
            other => match schema.iter().position(|c| c.name == other) {
                Some(index) => HeaderColumn::Column(index),
                None => {
                    log::debug!("'{}' is not a column name; first row is not a header", other);
                    return None;
                }
            },
        };
        if !seen.insert(column) {
            return None;
        }
        mapping.push(column);
    }
    Some(mapping)
}

//==================================================================================
// III. Storage Representation
//==================================================================================

/// Maps a value as the storage engine returned it back to its canonical form.
///
/// Storage engines may keep booleans as `0`/`1`; everything else, including
/// values of an unknown column, passes through unchanged.
pub fn translate_value_from_storage<'a>(
    value: &'a str,
    column: Option<&ColumnDefinition>,
) -> &'a str {
    match column.map(|c| c.column_type) {
        Some(ColumnType::Boolean) => match value {
            "0" => "false",
            "1" => "true",
            other => other,
        },
        _ => value,
    }
}

//==================================================================================
// IV. Column-Id Fingerprint
//==================================================================================

/// Joins column ids into the compact fingerprint stored beside an encoded batch.
pub fn column_ids_to_delimited(column_ids: &[String]) -> Result<String> {
    if let Some(bad) = column_ids.iter().find(|id| id.contains(COLUMN_ID_DELIMITER)) {
        return Err(RowSetError::SchemaMismatch(format!(
            "column id '{}' contains the delimiter '{}'",
            bad, COLUMN_ID_DELIMITER
        )));
    }
    Ok(column_ids.join(&COLUMN_ID_DELIMITER.to_string()))
}

pub fn parse_delimited_column_ids(delimited: &str) -> Vec<String> {
    if delimited.is_empty() {
        return Vec::new();
    }
    delimited
        .split(COLUMN_ID_DELIMITER)
        .map(str::to_string)
        .collect()
}
