// In: src/ffi/mod.rs

pub mod python;

pub use python::{
    decode_py, enable_verbose_logging_py, fits_within_budget_py, max_row_size_py,
    validate_and_encode_py, write_batch_py,
};
