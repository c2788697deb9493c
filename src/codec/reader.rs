// In: src/codec/reader.rs

//! The streaming decoder: a forward-only iterator holding one record at a time.

use std::io::Read;

use csv::StringRecord;
use hashbrown::HashSet;

use crate::codec::compression::{CompressedSource, Compression};
use crate::codec::format::unescape_field;
use crate::error::{Result, RowSetError};
use crate::types::Row;

/// Reads rows back from an encoded stream.
///
/// Values come back in schema column order. Identifier-only records decode to
/// deletion rows (`values == None`).
pub struct RowReader<R: Read> {
    records: csv::StringRecordsIntoIter<CompressedSource<R>>,
    valid_row_ids: Option<HashSet<i64>>,
    rows_read: usize,
}

impl<R: Read> RowReader<R> {
    pub fn new(source: R, compression: Compression) -> Result<Self> {
        let records = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(CompressedSource::new(source, compression)?)
            .into_records();
        Ok(Self {
            records,
            valid_row_ids: None,
            rows_read: 0,
        })
    }

    /// Only rows whose id is in `valid_row_ids` are yielded; the rest are skipped.
    pub fn with_valid_row_ids(mut self, valid_row_ids: HashSet<i64>) -> Self {
        self.valid_row_ids = Some(valid_row_ids);
        self
    }

    /// Number of records decoded so far, including skipped ones.
    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    fn is_wanted(&self, row: &Row) -> bool {
        match (&self.valid_row_ids, row.row_id) {
            (None, _) => true,
            (Some(valid), Some(row_id)) => valid.contains(&row_id),
            (Some(_), None) => false,
        }
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e.into())),
            };
            self.rows_read += 1;
            let row = match parse_record(&record) {
                Ok(row) => row,
                Err(e) => return Some(Err(e)),
            };
            if self.is_wanted(&row) {
                return Some(Ok(row));
            }
        }
    }
}

fn parse_record(record: &StringRecord) -> Result<Row> {
    let line = record.position().map_or(0, |p| p.line());
    if record.len() < 2 {
        return Err(RowSetError::Codec(format!(
            "record on line {} has {} fields; expected at least a row id and a version",
            line,
            record.len()
        )));
    }
    let parse_id = |field: &str, what: &str| -> Result<i64> {
        field.parse::<i64>().map_err(|_| {
            RowSetError::Codec(format!("line {}: {} '{}' is not an integer", line, what, field))
        })
    };
    let row_id = parse_id(&record[0], "row id")?;
    let version_number = parse_id(&record[1], "version number")?;
    let values = if record.len() == 2 {
        None
    } else {
        Some(
            record
                .iter()
                .skip(2)
                .map(unescape_field)
                .collect::<Result<Vec<_>>>()?,
        )
    };
    Ok(Row {
        row_id: Some(row_id),
        version_number: Some(version_number),
        values,
    })
}
