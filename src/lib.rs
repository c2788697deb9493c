//! This file is the root of the `rowset` Rust crate.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring all the top-level modules of the library (`validation`, `codec`, etc.)
//!     and re-exporting the types and entry points callers use most.
//! 2.  Defining the `#[pymodule]` (behind the `python` feature) which acts as the
//!     entry point when the compiled library is imported into Python.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod assignment;
pub mod bridge;
pub mod capacity;
pub mod codec;
pub mod config;
pub mod error;
pub mod observability;
pub mod schema_merge;
pub mod types;
pub mod validation;

#[cfg(feature = "python")]
mod ffi;

pub use assignment::assign_identifiers;
pub use bridge::{
    decode, rows_to_record_batch, validate_and_encode, validate_and_encode_to_vec, write_batch,
};
pub use capacity::{fits_within_budget, max_row_size};
pub use config::RowSetConfig;
pub use error::{Result, RowSetError};
pub use schema_merge::merge_across_schemas;
pub use types::{ColumnDefinition, ColumnType, IdRange, Row, RowSet};
pub use validation::{validate_row_set, validate_value};

//==================================================================================
// 2. Python Module Definition
//==================================================================================
#[cfg(feature = "python")]
use pyo3::prelude::*;

/// The `rowset` Python module, containing all exposed Rust functions.
#[cfg(feature = "python")]
#[pymodule]
fn rowset(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // --- Write path ---
    m.add_function(wrap_pyfunction!(ffi::write_batch_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::validate_and_encode_py, m)?)?;

    // --- Read path ---
    m.add_function(wrap_pyfunction!(ffi::decode_py, m)?)?;

    // --- Capacity planning ---
    m.add_function(wrap_pyfunction!(ffi::max_row_size_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::fits_within_budget_py, m)?)?;

    // --- Expose the custom error type ---
    m.add(
        "RowSetError",
        m.py().get_type_bound::<pyo3::exceptions::PyValueError>(),
    )?;

    // --- Expose version string as a module attribute ---
    m.add("__version__", VERSION)?;

    m.add_function(wrap_pyfunction!(ffi::enable_verbose_logging_py, m)?)?;

    Ok(())
}
