//! Error types for membership resolution

use groupscope_core::{DirectoryError, Principal, SinkError};
use thiserror::Error;

/// Membership resolution errors
#[derive(Debug, Error)]
pub enum MembershipError {
    /// Rejected before any directory call was made
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A principal the caller asked about does not exist
    #[error("Identity not found: {0}")]
    IdentityNotFound(Principal),

    /// Backend failure while looking up a principal the caller asked about
    #[error("Lookup failed for {principal}: {reason}")]
    Lookup {
        /// Principal being looked up
        principal: Principal,
        /// Backend-provided failure description
        reason: String,
    },

    /// The operation was cancelled; partial results were discarded
    #[error("Operation cancelled")]
    Cancelled,

    /// Directory snapshot could not be loaded
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// Principal input file could not be parsed
    #[error("Input error: {0}")]
    Input(String),

    /// Result sink error
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DirectoryError> for MembershipError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(principal) => MembershipError::IdentityNotFound(principal),
            DirectoryError::Lookup { principal, reason } => {
                MembershipError::Lookup { principal, reason }
            }
        }
    }
}

/// Result type for membership operations
pub type Result<T> = std::result::Result<T, MembershipError>;
