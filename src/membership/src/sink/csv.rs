//! CSV file sink

use super::ensure_rectangular;
use async_trait::async_trait;
use groupscope_core::{ResultSink, SinkError, Table};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tracing::info;

/// Behaviour when the output file already exists
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Fail with [`SinkError::Exists`]
    #[default]
    Refuse,
    /// Truncate and rewrite the file
    Replace,
}

/// Writes a table to a CSV file, header row first
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
    overwrite: OverwritePolicy,
}

impl CsvSink {
    /// Create a sink for `path`
    pub fn new(path: impl Into<PathBuf>, overwrite: OverwritePolicy) -> Self {
        Self {
            path: path.into(),
            overwrite,
        }
    }

    /// Destination path
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn csv_error(err: csv_async::Error) -> SinkError {
    SinkError::Csv(err.to_string())
}

#[async_trait]
impl ResultSink for CsvSink {
    async fn write_table(&mut self, table: &Table) -> Result<(), SinkError> {
        ensure_rectangular(table)?;

        let mut options = OpenOptions::new();
        options.write(true);
        match self.overwrite {
            OverwritePolicy::Refuse => options.create_new(true),
            OverwritePolicy::Replace => options.create(true).truncate(true),
        };
        let file = options.open(&self.path).await.map_err(|err| {
            if err.kind() == ErrorKind::AlreadyExists {
                SinkError::Exists(self.path.clone())
            } else {
                SinkError::Io(err)
            }
        })?;

        let mut writer = csv_async::AsyncWriter::from_writer(file);
        writer.write_record(&table.headers).await.map_err(csv_error)?;
        for row in &table.rows {
            writer.write_record(row).await.map_err(csv_error)?;
        }
        writer.flush().await.map_err(|err| csv_error(err.into()))?;

        info!(path = %self.path.display(), rows = table.len(), "Wrote CSV output");
        Ok(())
    }
}
