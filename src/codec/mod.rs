// In: src/codec/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Row Codec
// ====================================================================================
//
// The codec moves row batches between the write path and storage. It is strictly
// single-pass and forward-only so memory stays proportional to one row:
//
//   Encode:  Row --(RowWriter: project header order -> schema order, escape)-->
//            csv record --(CompressedSink: none | gzip | zstd)--> W: Write
//
//   Decode:  R: Read --(CompressedSource)--> csv record
//            --(RowReader: unescape, optional row-id filter)--> Row
//
// Wire conventions (delimiters, null token, deletion records) live in `format`.
// ====================================================================================

pub(crate) mod compression;
pub mod format;
pub mod reader;
pub mod writer;

use hashbrown::HashSet;

use crate::error::Result;
use crate::types::{ColumnDefinition, Row, RowSet};
use crate::validation::check_row_set;

pub use compression::{CodecOptions, Compression};
pub use format::{
    column_ids_to_delimited, column_name_header, map_first_data_row_to_columns,
    parse_delimited_column_ids, translate_value_from_storage, HeaderColumn, NULL_TOKEN,
};
pub use reader::RowReader;
pub use writer::RowWriter;

/// Encodes an already-validated batch into an in-memory buffer.
pub fn encode(
    schema: &[ColumnDefinition],
    batch: &RowSet,
    options: &CodecOptions,
) -> Result<Vec<u8>> {
    check_row_set(schema, batch)?;
    let mut writer = RowWriter::new(Vec::new(), schema, &batch.headers, options)?;
    for row in &batch.rows {
        writer.write_row(row)?;
    }
    writer.finish()
}

/// Decodes an in-memory stream. With `valid_row_ids`, rows whose id is not in
/// the set are skipped.
pub fn decode(
    bytes: &[u8],
    compression: Compression,
    valid_row_ids: Option<&HashSet<i64>>,
) -> Result<Vec<Row>> {
    let mut reader = RowReader::new(bytes, compression)?;
    if let Some(valid) = valid_row_ids {
        reader = reader.with_valid_row_ids(valid.clone());
    }
    reader.collect()
}
