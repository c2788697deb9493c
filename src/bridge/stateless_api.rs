// In: src/bridge/stateless_api.rs

use std::io::Write;
use std::sync::Arc;

use hashbrown::HashSet;

use crate::capacity::check_within_budget;
use crate::codec::{CodecOptions, Compression, RowReader, RowWriter};
use crate::config::RowSetConfig;
use crate::error::Result;
use crate::types::{ColumnDefinition, IdRange, Row, RowSet};
use crate::validation::{check_row_set, header_columns, normalize_row};

/// Validates every row of `batch` and streams it into `sink`.
///
/// The batch must already carry ids and versions (see
/// [`assign_identifiers`](crate::assignment::assign_identifiers)). Each row is
/// normalized and written before the next is looked at, so memory stays
/// bounded by one row. On error the sink holds a partial stream and must be
/// discarded.
pub fn validate_and_encode<W: Write>(
    schema: &[ColumnDefinition],
    batch: &RowSet,
    sink: W,
    config: &RowSetConfig,
) -> Result<W> {
    if config.enforce_batch_budget {
        check_within_budget(schema, batch.rows.len(), config.max_batch_bytes)?;
    }
    check_row_set(schema, batch)?;
    let columns = header_columns(schema, &batch.headers)?;

    let mut writer = RowWriter::new(sink, schema, &batch.headers, &CodecOptions::from(config))?;
    for (row_index, row) in batch.rows.iter().enumerate() {
        let normalized = normalize_row(row, row_index, &columns)?;
        writer.write_row(&normalized)?;
    }
    log::debug!(
        "encoded {} rows for table {:?} ({:?})",
        writer.rows_written(),
        batch.table_id,
        config.compression
    );
    writer.finish()
}

/// [`validate_and_encode`] into an in-memory buffer.
pub fn validate_and_encode_to_vec(
    schema: &[ColumnDefinition],
    batch: &RowSet,
    config: &RowSetConfig,
) -> Result<Vec<u8>> {
    validate_and_encode(schema, batch, Vec::new(), config)
}

/// The whole write path for one request: stamp identifiers from `range`, then
/// validate and encode with the given (shared) configuration.
pub fn write_batch(
    schema: &[ColumnDefinition],
    batch: &RowSet,
    range: &IdRange,
    config: Arc<RowSetConfig>,
) -> Result<Vec<u8>> {
    let assigned = crate::assignment::assign_identifiers(batch, range)?;
    validate_and_encode_to_vec(schema, &assigned, &config)
}

/// Decodes a stored stream, detecting its compression from the frame magic.
///
/// Values come back in the schema order the stream was written with. With
/// `valid_row_ids`, rows whose id is not in the set are skipped.
pub fn decode(bytes: &[u8], valid_row_ids: Option<&HashSet<i64>>) -> Result<Vec<Row>> {
    let compression = Compression::detect(bytes);
    let mut reader = RowReader::new(bytes, compression)?;
    if let Some(valid) = valid_row_ids {
        reader = reader.with_valid_row_ids(valid.clone());
    }
    let rows = reader.collect::<Result<Vec<_>>>()?;
    log::debug!("decoded {} rows ({:?})", rows.len(), compression);
    Ok(rows)
}
