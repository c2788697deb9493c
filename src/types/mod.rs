//! This module defines the core, strongly-typed data representations used
//! throughout the write path.
//!
//! It includes the closed `ColumnType` registry and the plain value model
//! (`ColumnDefinition`, `Row`, `RowSet`, `IdRange`).

pub mod column_type;
pub mod model;

// Re-export the main type(s) for easier access.
pub use column_type::{ColumnType, DEFAULT_MAX_STRING_SIZE};
pub use model::{ColumnDefinition, IdRange, Row, RowSet, ROW_ID, ROW_VERSION};
