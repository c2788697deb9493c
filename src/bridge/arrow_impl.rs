// In: src/bridge/arrow_impl.rs

//! Converts decoded rows (UTF-8 values in schema order) into a typed Arrow
//! `RecordBatch` for clients that want native values instead of strings.

use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanBuilder, Float64Builder, Int64Builder, StringBuilder,
    TimestampMillisecondBuilder,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::codec::translate_value_from_storage;
use crate::error::{Result, RowSetError};
use crate::types::{ColumnDefinition, ColumnType, Row, ROW_ID, ROW_VERSION};

/// One typed builder per column type family.
enum ColumnBuilder {
    Boolean(BooleanBuilder),
    Int64(Int64Builder),
    Float64(Float64Builder),
    Timestamp(TimestampMillisecondBuilder),
    Utf8(StringBuilder),
}

impl ColumnBuilder {
    fn for_type(column_type: ColumnType, capacity: usize) -> Self {
        match column_type {
            ColumnType::Boolean => Self::Boolean(BooleanBuilder::with_capacity(capacity)),
            ColumnType::Integer | ColumnType::FileHandleId | ColumnType::UserId => {
                Self::Int64(Int64Builder::with_capacity(capacity))
            }
            ColumnType::Double => Self::Float64(Float64Builder::with_capacity(capacity)),
            ColumnType::Date => {
                Self::Timestamp(TimestampMillisecondBuilder::with_capacity(capacity))
            }
            ColumnType::String | ColumnType::Link | ColumnType::EntityId => {
                Self::Utf8(StringBuilder::with_capacity(capacity, capacity * 16))
            }
        }
    }

    /// `value` must already be in canonical form.
    fn append(&mut self, value: Option<&str>) -> std::result::Result<(), String> {
        match self {
            Self::Boolean(b) => b.append_option(value.map(parse_bool).transpose()?),
            Self::Int64(b) => b.append_option(value.map(parse_i64).transpose()?),
            Self::Float64(b) => b.append_option(
                value
                    .map(|v| v.parse::<f64>().map_err(|_| format!("'{}' is not a number.", v)))
                    .transpose()?,
            ),
            Self::Timestamp(b) => b.append_option(value.map(parse_i64).transpose()?),
            Self::Utf8(b) => b.append_option(value),
        }
        Ok(())
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            Self::Boolean(b) => Arc::new(b.finish()),
            Self::Int64(b) => Arc::new(b.finish()),
            Self::Float64(b) => Arc::new(b.finish()),
            Self::Timestamp(b) => Arc::new(b.finish()),
            Self::Utf8(b) => Arc::new(b.finish()),
        }
    }
}

fn parse_bool(value: &str) -> std::result::Result<bool, String> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(format!("'{}' is not a boolean.", other)),
    }
}

fn parse_i64(value: &str) -> std::result::Result<i64, String> {
    value
        .parse::<i64>()
        .map_err(|_| format!("'{}' is not a 64-bit integer.", value))
}

/// Builds a `RecordBatch` with `ROW_ID`, `ROW_VERSION`, then one column per
/// schema column. Deletion rows become all-null value columns.
pub fn rows_to_record_batch(schema: &[ColumnDefinition], rows: &[Row]) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(schema.len() + 2);
    fields.push(Field::new(ROW_ID, DataType::Int64, false));
    fields.push(Field::new(ROW_VERSION, DataType::Int64, false));
    fields.extend(
        schema
            .iter()
            .map(|c| Field::new(c.name.as_str(), c.column_type.to_arrow_type(), true)),
    );

    let mut row_ids = Int64Builder::with_capacity(rows.len());
    let mut versions = Int64Builder::with_capacity(rows.len());
    let mut builders: Vec<ColumnBuilder> = schema
        .iter()
        .map(|c| ColumnBuilder::for_type(c.column_type, rows.len()))
        .collect();

    for (row_index, row) in rows.iter().enumerate() {
        let (row_id, version) = row.row_id.zip(row.version_number).ok_or_else(|| {
            RowSetError::Structural(format!(
                "row {} is missing its row id or version",
                row_index
            ))
        })?;
        row_ids.append_value(row_id);
        versions.append_value(version);

        let values = row.values.as_deref().filter(|v| !v.is_empty());
        if let Some(values) = values {
            if values.len() != schema.len() {
                return Err(RowSetError::Structural(format!(
                    "row {} has {} values but the schema declares {} columns",
                    row_index,
                    values.len(),
                    schema.len()
                )));
            }
        }
        for (column_index, (builder, column)) in builders.iter_mut().zip(schema).enumerate() {
            let value = values
                .and_then(|v| v[column_index].as_deref())
                .map(|v| translate_value_from_storage(v, Some(column)));
            builder.append(value).map_err(|reason| {
                RowSetError::invalid_value(row_index, column_index, column.column_type, reason)
            })?;
        }
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(fields.len());
    columns.push(Arc::new(row_ids.finish()));
    columns.push(Arc::new(versions.finish()));
    columns.extend(builders.iter_mut().map(ColumnBuilder::finish));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
