//! The plain value types that flow through the write path: column definitions,
//! rows, row batches and identifier ranges.
//!
//! None of these types carry behaviour beyond small accessors. They are created
//! by external collaborators (schema store, id allocator) or callers, and every
//! transform in this crate takes them by reference and returns new values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::column_type::ColumnType;

/// Display label for the row id column in rendered headers.
pub const ROW_ID: &str = "ROW_ID";
/// Display label for the row version column in rendered headers.
pub const ROW_VERSION: &str = "ROW_VERSION";

//==================================================================================
// 1. Column Definition
//==================================================================================

/// A single typed column descriptor. Identity is `id`; `name` is display only.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub id: String,
    pub name: String,
    pub column_type: ColumnType,
    /// Maximum UTF-8 byte length. Only meaningful for string-like types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<BTreeSet<String>>,
}

impl ColumnDefinition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            column_type,
            max_size: None,
            default_value: None,
            enum_values: None,
        }
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }

    /// Worst-case rendered size of a value in this column.
    pub fn max_byte_size(&self) -> usize {
        self.column_type.max_byte_size(self.max_size)
    }
}

//==================================================================================
// 2. Rows and Row Batches
//==================================================================================

/// One record. `values` line up with the owning batch's `headers`.
///
/// A row with no values is a deletion/no-op marker: it touches the version of
/// `row_id` without changing any field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    #[serde(default)]
    pub row_id: Option<i64>,
    #[serde(default)]
    pub version_number: Option<i64>,
    #[serde(default)]
    pub values: Option<Vec<Option<String>>>,
}

impl Row {
    /// A row carrying values and no identity yet.
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            row_id: None,
            version_number: None,
            values: Some(values.into_iter().map(|v| v.map(Into::into)).collect()),
        }
    }

    /// A deletion marker for `row_id`.
    pub fn deletion(row_id: i64) -> Self {
        Self {
            row_id: Some(row_id),
            version_number: None,
            values: None,
        }
    }

    pub fn with_id(mut self, row_id: i64, version_number: i64) -> Self {
        self.row_id = Some(row_id);
        self.version_number = Some(version_number);
        self
    }

    /// `true` when `values` is absent or empty.
    pub fn is_deletion(&self) -> bool {
        self.values.as_ref().map_or(true, |v| v.is_empty())
    }
}

/// A batch of rows sharing one header order (a "RowSet").
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RowSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    /// Column ids, one per value position.
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl RowSet {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            table_id: None,
            headers,
            rows,
        }
    }

    /// A batch whose headers follow the schema's column order.
    pub fn for_schema(schema: &[ColumnDefinition], rows: Vec<Row>) -> Self {
        Self::new(schema.iter().map(|c| c.id.clone()).collect(), rows)
    }

    pub fn with_table_id(mut self, table_id: impl Into<String>) -> Self {
        self.table_id = Some(table_id.into());
        self
    }
}

//==================================================================================
// 3. Identifier Range
//==================================================================================

/// Identifiers reserved for one write by the external allocator.
///
/// `minimum_id..=maximum_id` holds the fresh ids for inserts; `maximum_update_id`
/// bounds which existing ids an update may reference.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IdRange {
    #[serde(default)]
    pub minimum_id: Option<i64>,
    #[serde(default)]
    pub maximum_id: Option<i64>,
    #[serde(default)]
    pub maximum_update_id: Option<i64>,
    pub version_number: i64,
}

impl IdRange {
    /// Number of fresh ids in the range, or 0 when none were allocated.
    pub fn allocated_count(&self) -> u64 {
        match (self.minimum_id, self.maximum_id) {
            (Some(min), Some(max)) if max >= min => {
                u64::try_from(max as i128 - min as i128 + 1).unwrap_or(u64::MAX)
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deletion_marker_detection() {
        assert!(Row::deletion(4).is_deletion());
        assert!(Row { values: Some(vec![]), ..Row::default() }.is_deletion());
        assert!(!Row::new([Some("a")]).is_deletion());
        assert!(!Row::new([None::<String>]).is_deletion());
    }

    #[test]
    fn test_allocated_count() {
        let mut range = IdRange {
            minimum_id: Some(10),
            maximum_id: Some(12),
            maximum_update_id: None,
            version_number: 1,
        };
        assert_eq!(range.allocated_count(), 3);
        range.maximum_id = None;
        assert_eq!(range.allocated_count(), 0);
        range.maximum_id = Some(9);
        assert_eq!(range.allocated_count(), 0);
    }

    #[test]
    fn test_column_definition_json_shape() {
        let json = r#"{"id":"7","name":"color","columnType":"STRING","maxSize":10,
            "enumValues":["red","blue"]}"#;
        let column: ColumnDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(column.column_type, ColumnType::String);
        assert_eq!(column.max_size, Some(10));
        assert!(column.enum_values.unwrap().contains("red"));
    }
}
