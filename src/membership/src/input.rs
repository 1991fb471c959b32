//! Principal lists read from CSV files

use crate::error::{MembershipError, Result};
use futures::StreamExt;
use groupscope_core::Principal;
use std::path::Path;
use tokio::io::AsyncRead;
use tracing::debug;

/// Read principals from the first column of a CSV file
///
/// Values are trimmed, blank cells are skipped, and input order is kept.
pub async fn read_principals_csv(
    path: impl AsRef<Path>,
    has_headers: bool,
) -> Result<Vec<Principal>> {
    let path = path.as_ref();
    let file = tokio::fs::File::open(path).await.map_err(|e| {
        MembershipError::Input(format!("failed to open {}: {}", path.display(), e))
    })?;
    let principals = parse_principals(file, has_headers).await?;
    debug!(path = %path.display(), count = principals.len(), "Read principals");
    Ok(principals)
}

/// Parse principals from any CSV source
pub async fn parse_principals<R>(source: R, has_headers: bool) -> Result<Vec<Principal>>
where
    R: AsyncRead + Unpin + Send,
{
    let mut reader = csv_async::AsyncReaderBuilder::new()
        .has_headers(has_headers)
        .flexible(true)
        .create_reader(source);

    let mut principals = Vec::new();
    let mut records = reader.records();
    while let Some(record) = records.next().await {
        let record = record.map_err(|e| MembershipError::Input(e.to_string()))?;
        if let Some(value) = record.get(0).map(str::trim) {
            if !value.is_empty() {
                principals.push(Principal::new(value));
            }
        }
    }
    Ok(principals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_column_with_header() {
        let csv = "SamAccountName,Note\nalice,first\n  bob , second\n,empty\ncarol\n";
        let principals = parse_principals(csv.as_bytes(), true).await.unwrap();
        let names: Vec<&str> = principals.iter().map(Principal::as_str).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn test_without_header() {
        let principals = parse_principals("G1\nG2\n".as_bytes(), false).await.unwrap();
        assert_eq!(principals, vec![Principal::new("G1"), Principal::new("G2")]);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_principals_csv(dir.path().join("absent.csv"), true).await.unwrap_err();
        assert!(matches!(err, MembershipError::Input(_)));
    }

    #[tokio::test]
    async fn test_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.csv");
        std::fs::write(&path, "user\nalice\nbob\n").unwrap();

        let principals = read_principals_csv(&path, true).await.unwrap();
        assert_eq!(principals.len(), 2);
    }
}
