//! Tabular results handed to a result sink

use serde::{Deserialize, Serialize};

/// A rectangular result set: one header row plus data rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Column names
    pub headers: Vec<String>,
    /// Data rows, each with `headers.len()` cells
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given header
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row
    pub fn push_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there are no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of the first row whose width differs from the header, if any
    pub fn first_ragged_row(&self) -> Option<usize> {
        self.rows.iter().position(|row| row.len() != self.headers.len())
    }

    /// Values of one column, by header name
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.headers.iter().position(|h| h == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_query() {
        let mut table = Table::new(["Group", "alice"]);
        table.push_row(["G1", "alice"]);
        table.push_row(["G3", ""]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.column("Group").unwrap(), vec!["G1", "G3"]);
        assert!(table.column("bob").is_none());
        assert!(table.first_ragged_row().is_none());
    }

    #[test]
    fn test_ragged_row_detected() {
        let mut table = Table::new(["Group"]);
        table.push_row(["G1", "extra"]);
        assert_eq!(table.first_ragged_row(), Some(0));
    }
}
