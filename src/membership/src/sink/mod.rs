//! Result sinks
//!
//! Implementations of [`ResultSink`](groupscope_core::ResultSink) for CSV
//! files, the console, and in-memory collection.

pub mod console;
pub mod csv;
pub mod memory;

pub use self::csv::{CsvSink, OverwritePolicy};
pub use console::ConsoleSink;
pub use memory::MemorySink;

use groupscope_core::{SinkError, Table};

/// Reject tables whose rows do not match the header width
pub(crate) fn ensure_rectangular(table: &Table) -> Result<(), SinkError> {
    match table.first_ragged_row() {
        Some(row) => Err(SinkError::Malformed(format!(
            "row {} has {} cells, expected {}",
            row,
            table.rows[row].len(),
            table.headers.len()
        ))),
        None => Ok(()),
    }
}
