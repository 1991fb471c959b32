//! Directory providers and provider decorators
//!
//! - [`InMemoryDirectory`]: serves a flat membership relation loaded from a
//!   JSON snapshot or assembled with the builder API
//! - [`MeteredDirectory`]: counts calls, not-found answers and failures
//! - [`MemoizedDirectory`]: remembers answers for the rest of a run so
//!   several resolutions sharing subgraphs do not repeat round-trips

pub mod memoized;
pub mod memory;
pub mod metered;

pub use memoized::{MemoStats, MemoizedDirectory};
pub use memory::{DirectorySnapshot, InMemoryDirectory};
pub use metered::{LookupMetrics, LookupStats, MeteredDirectory, OperationStats};
