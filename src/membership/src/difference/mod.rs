//! Multi-principal difference engine
//!
//! Compares the group memberships of several principals and keeps only the
//! groups that distinguish them: a group every compared principal belongs to
//! carries no differential information and is suppressed.
//!
//! # Example
//!
//! ```rust
//! use groupscope_membership::difference::{CompareConfig, DifferenceEngine};
//! use groupscope_membership::directory::InMemoryDirectory;
//! use groupscope_core::Principal;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = InMemoryDirectory::new()
//!     .with_membership("alice", "G1")
//!     .with_membership("alice", "G2")
//!     .with_membership("bob", "G2")
//!     .with_membership("bob", "G3");
//!
//! let engine = DifferenceEngine::new(directory, CompareConfig::default());
//! let table = engine
//!     .compare(&[Principal::new("alice"), Principal::new("bob")])
//!     .await?;
//!
//! // G2 is shared by both and suppressed
//! assert_eq!(table.group_names(), vec!["G1", "G3"]);
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod incidence;
pub mod types;


pub use engine::{CompareConfig, Depth, DifferenceEngine, UnresolvedPolicy};
pub use incidence::IncidenceTable;
pub use types::{DifferenceRow, DifferenceTable};
