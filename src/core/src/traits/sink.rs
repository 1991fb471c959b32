//! Result sink contract

use crate::error::SinkError;
use crate::types::Table;
use async_trait::async_trait;

/// Destination for a finished result set (file, screen, clipboard, ...)
#[async_trait]
pub trait ResultSink: Send {
    /// Persist one table
    async fn write_table(&mut self, table: &Table) -> Result<(), SinkError>;
}

#[async_trait]
impl<S: ResultSink + ?Sized> ResultSink for Box<S> {
    async fn write_table(&mut self, table: &Table) -> Result<(), SinkError> {
        (**self).write_table(table).await
    }
}
