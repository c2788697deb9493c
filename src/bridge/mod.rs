// In: src/bridge/mod.rs

// ====================================================================================
// ARCHITECTURAL OVERVIEW: The Bridge Layer
// ====================================================================================
//
// The `bridge` is the public entry point for a whole write or read request. It
// strings the inner modules together so callers (and the FFI layer) do not have to.
//
// Data Flow (Write):
//
//   1. [write_batch]          -> Receives RowSet + IdRange from the coordinator
//         |
//         `-> a. `assignment` stamps row ids and versions (returns a new RowSet)
//         |
//   2. [validate_and_encode]  -> Receives the stamped RowSet
//         |
//         `-> a. `capacity` admission check (when enabled in RowSetConfig)
//         `-> b. `validation` structural check, then per-row normalization
//         `-> c. `codec::RowWriter` streams each row into the sink
//
// Data Flow (Read):
//
//   1. [decode]               -> Receives stored bytes, sniffs compression
//         |
//         `-> `codec::RowReader` yields rows in schema order
//
//   2. [merge_across_schemas] -> Re-expresses rows from older schemas (optional)
//
//   3. [arrow_impl]           -> Typed `RecordBatch` for native clients (optional)
//
// ====================================================================================
pub mod arrow_impl;
pub mod stateless_api;

pub use arrow_impl::rows_to_record_batch;
pub use stateless_api::{decode, validate_and_encode, validate_and_encode_to_vec, write_batch};
