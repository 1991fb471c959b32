//! # groupscope core
//!
//! Shared types, traits, and error handling for groupscope.
//! The membership crate and the CLI both build on the contracts defined here:
//! a [`DirectoryProvider`](traits::DirectoryProvider) that answers one-hop
//! membership questions, and a [`ResultSink`](traits::ResultSink) that
//! persists tabular results.

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{DirectoryError, SinkError};
pub use traits::{DirectoryProvider, ResultSink};
pub use types::{GroupAttributes, Principal, PrincipalAttributes, Table, UserAttributes};

/// Result type for directory lookups
pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;
