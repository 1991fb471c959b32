//! # groupscope membership
//!
//! Directory group-membership resolution.
//!
//! ## Features
//!
//! - **Transitive closure** of nested group membership, safe against cycles
//!   and bounded to one directory call per reachable vertex
//! - **Difference tables** showing which groups distinguish several
//!   principals, with universally shared groups suppressed
//! - **Attribute batches** for groups and users with explicit "Not Found"
//!   rows for unresolvable names
//! - **Best-effort resolution**: per-vertex failures prune, never abort
//! - **Pluggable collaborators**: any [`DirectoryProvider`] in, any
//!   [`ResultSink`] out
//!
//! ## Example
//!
//! ```rust
//! use groupscope_membership::{ClosureResolver, InMemoryDirectory, Principal};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let directory = InMemoryDirectory::new()
//!         .with_membership("alice", "developers")
//!         .with_membership("developers", "engineering")
//!         .with_membership("engineering", "developers");
//!
//!     let closure = ClosureResolver::new(directory)
//!         .closure(&Principal::new("alice"))
//!         .await?;
//!
//!     for group in &closure.groups {
//!         println!("{}", group);
//!     }
//!     Ok(())
//! }
//! ```

pub mod difference;
pub mod directory;
pub mod error;
pub mod info;
pub mod input;
pub mod resolver;
pub mod sink;

// Re-export commonly used types
pub use difference::{CompareConfig, Depth, DifferenceEngine, DifferenceTable, UnresolvedPolicy};
pub use directory::{InMemoryDirectory, MemoizedDirectory, MeteredDirectory};
pub use error::{MembershipError, Result};
pub use groupscope_core::{DirectoryProvider, Principal, ResultSink, Table};
pub use info::{group_info_table, user_info_table, InfoLookup};
pub use resolver::{ClosureResolver, ClosureResult, ResolverConfig};
pub use sink::{ConsoleSink, CsvSink, MemorySink, OverwritePolicy};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
