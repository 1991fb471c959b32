//! Plain-text table sink

use super::ensure_rectangular;
use async_trait::async_trait;
use groupscope_core::{ResultSink, SinkError, Table};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Renders a table as aligned columns
pub struct ConsoleSink<W> {
    writer: W,
}

impl ConsoleSink<tokio::io::Stdout> {
    /// Sink writing to standard output
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W: AsyncWrite + Unpin + Send> ConsoleSink<W> {
    /// Sink writing to `writer`
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn render(table: &Table) -> String {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = String::new();
    out.push_str(&line(&table.headers));
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');
    for row in &table.rows {
        out.push_str(&line(row));
        out.push('\n');
    }
    out
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> ResultSink for ConsoleSink<W> {
    async fn write_table(&mut self, table: &Table) -> Result<(), SinkError> {
        ensure_rectangular(table)?;
        self.writer.write_all(render(table).as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
