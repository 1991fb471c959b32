//! Error types shared by directory providers and result sinks

use crate::types::Principal;
use std::path::PathBuf;
use thiserror::Error;

/// Errors a directory provider may report for a single lookup
///
/// Both variants prune a branch during closure; they differ in how they are
/// logged and counted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    /// The directory has no record of the principal
    #[error("Identity not found: {0}")]
    NotFound(Principal),

    /// Transient or backend failure while looking the principal up
    #[error("Lookup failed for {principal}: {reason}")]
    Lookup {
        /// Principal being looked up
        principal: Principal,
        /// Backend-provided failure description
        reason: String,
    },
}

impl DirectoryError {
    /// Create a not found error
    pub fn not_found(principal: impl Into<Principal>) -> Self {
        DirectoryError::NotFound(principal.into())
    }

    /// Create a lookup error
    pub fn lookup<S: Into<String>>(principal: impl Into<Principal>, reason: S) -> Self {
        DirectoryError::Lookup {
            principal: principal.into(),
            reason: reason.into(),
        }
    }

    /// Whether the principal is known not to exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, DirectoryError::NotFound(_))
    }

    /// The principal the failed lookup was about
    pub fn principal(&self) -> &Principal {
        match self {
            DirectoryError::NotFound(principal) => principal,
            DirectoryError::Lookup { principal, .. } => principal,
        }
    }
}

/// Errors raised while persisting a result table
#[derive(Debug, Error)]
pub enum SinkError {
    /// Output file already exists and overwriting was not allowed
    #[error("Output already exists: {}", .0.display())]
    Exists(PathBuf),

    /// Row shape does not match the header
    #[error("Malformed table: {0}")]
    Malformed(String),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(String),

    /// I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_helpers() {
        let err = DirectoryError::not_found("alice");
        assert!(err.is_not_found());
        assert_eq!(err.principal().as_str(), "alice");

        let err = DirectoryError::lookup("bob", "connection reset");
        assert!(!err.is_not_found());
        assert_eq!(err.principal().as_str(), "bob");
    }

    #[test]
    fn test_error_display() {
        let err = DirectoryError::not_found("alice");
        assert_eq!(err.to_string(), "Identity not found: alice");

        let err = DirectoryError::lookup("bob", "timeout");
        assert_eq!(err.to_string(), "Lookup failed for bob: timeout");
    }
}
