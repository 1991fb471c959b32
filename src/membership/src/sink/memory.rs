//! In-memory sink

use async_trait::async_trait;
use groupscope_core::{ResultSink, SinkError, Table};

/// Collects every written table
#[derive(Debug, Default)]
pub struct MemorySink {
    tables: Vec<Table>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables written so far
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Most recently written table
    pub fn last(&self) -> Option<&Table> {
        self.tables.last()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn write_table(&mut self, table: &Table) -> Result<(), SinkError> {
        super::ensure_rectangular(table)?;
        self.tables.push(table.clone());
        Ok(())
    }
}
