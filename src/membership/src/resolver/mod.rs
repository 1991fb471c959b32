//! Membership graph resolver
//!
//! Computes the transitive closure of group membership for a principal by
//! expanding the directory's one-hop relation generation by generation.
//!
//! # Features
//!
//! - **Cycle-safe**: every vertex is expanded at most once, so nested-group
//!   cycles terminate
//! - **Bounded round-trips**: one `direct_parent_groups` call per distinct
//!   reachable vertex, never more
//! - **Concurrent generations**: lookups within a frontier generation run
//!   concurrently, while a single coordinating task owns the visited set
//! - **Best-effort**: failed lookups on intermediate vertices prune that
//!   branch; only a failure on the start principal is surfaced
//!
//! # Example
//!
//! ```rust
//! use groupscope_membership::directory::InMemoryDirectory;
//! use groupscope_membership::resolver::ClosureResolver;
//! use groupscope_core::Principal;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let directory = InMemoryDirectory::new()
//!     .with_membership("alice", "developers")
//!     .with_membership("developers", "engineering");
//!
//! let resolver = ClosureResolver::new(directory);
//! let closure = resolver.closure(&Principal::new("alice")).await?;
//!
//! assert_eq!(closure.group_names(), vec!["developers", "engineering"]);
//! # Ok(())
//! # }
//! ```

pub mod closure;
pub mod types;


pub use closure::{ClosureResolver, ResolverConfig};
pub use types::{ClosureOutcome, ClosureResult, PruneReason, PrunedVertex};
