// In: src/codec/writer.rs

//! The streaming encoder. Rows are written one at a time, re-projected from the
//! batch's header order into schema order.

use std::io::Write;

use crate::codec::compression::{CodecOptions, CompressedSink};
use crate::codec::format::escape_value;
use crate::error::{Result, RowSetError};
use crate::types::{ColumnDefinition, Row};
use crate::validation::check_headers;

/// Writes rows to a sink in the row stream format.
///
/// Call [`RowWriter::finish`] to finalize the compression frame; a writer that
/// is simply dropped leaves a truncated stream behind.
pub struct RowWriter<W: Write> {
    csv: csv::Writer<CompressedSink<W>>,
    /// For each schema column, its position in the batch headers.
    projection: Vec<usize>,
    rows_written: usize,
}

impl<W: Write> RowWriter<W> {
    pub fn new(
        sink: W,
        schema: &[ColumnDefinition],
        headers: &[String],
        options: &CodecOptions,
    ) -> Result<Self> {
        let index = check_headers(schema, headers)?;
        let projection = schema
            .iter()
            .filter_map(|column| index.get(column.id.as_str()).copied())
            .collect();
        let csv = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(CompressedSink::new(sink, options)?);
        Ok(Self {
            csv,
            projection,
            rows_written: 0,
        })
    }

    /// Appends one record. Rows without values become identifier-only deletion
    /// records.
    pub fn write_row(&mut self, row: &Row) -> Result<()> {
        let index = self.rows_written;
        let row_id = row.row_id.ok_or_else(|| {
            RowSetError::Structural(format!("row {} is missing a row id", index))
        })?;
        let version = row.version_number.ok_or_else(|| {
            RowSetError::Structural(format!("row {} is missing a version number", index))
        })?;

        let values = row.values.as_ref().filter(|v| !v.is_empty());
        if let Some(values) = values {
            if values.len() != self.projection.len() {
                return Err(RowSetError::Structural(format!(
                    "row {} has {} values but the headers declare {} columns",
                    index,
                    values.len(),
                    self.projection.len()
                )));
            }
        }

        self.csv.write_field(row_id.to_string())?;
        self.csv.write_field(version.to_string())?;
        if let Some(values) = values {
            for &position in &self.projection {
                self.csv
                    .write_field(escape_value(values[position].as_deref()).as_bytes())?;
            }
        }
        self.csv.write_record(None::<&[u8]>)?;
        self.rows_written += 1;
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flushes buffered records, finalizes compression, and returns the sink.
    pub fn finish(self) -> Result<W> {
        let rows = self.rows_written;
        let sink = self
            .csv
            .into_inner()
            .map_err(|e| RowSetError::Io(e.into_error()))?;
        let inner = sink.finish()?;
        log::debug!("row stream finished after {} rows", rows);
        Ok(inner)
    }
}
