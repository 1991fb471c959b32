//! Closure result types

use crate::error::MembershipError;
use groupscope_core::{Principal, Table};

/// Why an intermediate vertex contributed no parents
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum PruneReason {
    /// Directory has no record of the vertex
    NotFound,
    /// Backend failure while expanding the vertex
    LookupFailed(String),
}

/// An intermediate vertex whose lookup failed during expansion
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PrunedVertex {
    /// The vertex that could not be expanded
    pub principal: Principal,
    /// Failure classification
    pub reason: PruneReason,
}

/// Transitive group membership of a single principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureResult {
    /// The principal the closure was computed for
    pub start: Principal,

    /// Every group reachable from `start`, sorted by name
    ///
    /// The start principal is never listed, even when a cycle leads back to
    /// it; see `start_in_cycle`.
    pub groups: Vec<Principal>,

    /// True when some reachable group lists `start` as a member
    pub start_in_cycle: bool,

    /// Number of `direct_parent_groups` calls issued
    pub lookups: usize,

    /// Number of frontier generations expanded after the start vertex
    pub depth: usize,

    /// Vertices whose expansion failed, sorted by name
    pub pruned: Vec<PrunedVertex>,
}

impl ClosureResult {
    /// True when every discovered vertex was expanded successfully
    pub fn is_complete(&self) -> bool {
        self.pruned.is_empty()
    }

    /// Whether `group` is in the closure
    pub fn contains(&self, group: &str) -> bool {
        self.groups
            .binary_search_by(|g| g.as_str().cmp(group))
            .is_ok()
    }

    /// Group names as string slices
    pub fn group_names(&self) -> Vec<&str> {
        self.groups.iter().map(Principal::as_str).collect()
    }

    /// Single `Group` column, one row per group
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(["Group"]);
        for group in &self.groups {
            table.push_row([group.as_str()]);
        }
        table
    }
}

/// Per-principal outcome of a batch closure
#[derive(Debug)]
pub struct ClosureOutcome {
    /// The principal the closure was requested for
    pub principal: Principal,
    /// Its closure, or why it could not be computed
    pub result: Result<ClosureResult, MembershipError>,
}

impl ClosureOutcome {
    /// True when the closure was computed
    pub fn is_resolved(&self) -> bool {
        self.result.is_ok()
    }
}
