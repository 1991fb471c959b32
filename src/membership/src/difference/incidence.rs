//! Group-to-principal incidence

use groupscope_core::Principal;
use std::collections::{BTreeMap, BTreeSet};

/// Mapping from each group to the compared principals that belong to it
///
/// Principals are referred to by their column index in the comparison.
/// Built once per comparison and immutable afterwards. Every group maps to
/// a non-empty set of at most `columns` indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceTable {
    columns: usize,
    incidence: BTreeMap<Principal, BTreeSet<usize>>,
}

impl IncidenceTable {
    /// Build from one group set per compared principal, in column order
    pub fn build(group_sets: &[BTreeSet<Principal>]) -> Self {
        let mut incidence: BTreeMap<Principal, BTreeSet<usize>> = BTreeMap::new();
        for (column, groups) in group_sets.iter().enumerate() {
            for group in groups {
                incidence.entry(group.clone()).or_default().insert(column);
            }
        }

        Self {
            columns: group_sets.len(),
            incidence,
        }
    }

    /// Number of compared principals
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of distinct groups
    pub fn len(&self) -> usize {
        self.incidence.len()
    }

    /// True when no principal belongs to any group
    pub fn is_empty(&self) -> bool {
        self.incidence.is_empty()
    }

    /// Column indices of the principals belonging to `group`
    pub fn members(&self, group: &str) -> Option<&BTreeSet<usize>> {
        self.incidence.get(group)
    }

    /// How many compared principals belong to `group`
    pub fn count(&self, group: &str) -> usize {
        self.members(group).map_or(0, BTreeSet::len)
    }

    /// True when every compared principal belongs to `group`
    pub fn is_universal(&self, group: &str) -> bool {
        self.columns > 0 && self.count(group) == self.columns
    }

    /// Groups and their member columns, ordered by group name
    pub fn iter(&self) -> impl Iterator<Item = (&Principal, &BTreeSet<usize>)> {
        self.incidence.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<Principal> {
        names.iter().map(|n| Principal::new(*n)).collect()
    }

    #[test]
    fn test_build_counts() {
        let table = IncidenceTable::build(&[set(&["G1", "G2"]), set(&["G2", "G3"]), set(&["G2"])]);

        assert_eq!(table.columns(), 3);
        assert_eq!(table.len(), 3);
        assert_eq!(table.count("G1"), 1);
        assert_eq!(table.count("G2"), 3);
        assert_eq!(table.count("missing"), 0);
        assert!(table.is_universal("G2"));
        assert!(!table.is_universal("G3"));
        assert_eq!(table.members("G3").unwrap(), &BTreeSet::from([1]));
    }

    #[test]
    fn test_every_group_has_members() {
        let table = IncidenceTable::build(&[set(&["A"]), set(&[]), set(&["A", "B"])]);
        for (_, members) in table.iter() {
            assert!(!members.is_empty());
            assert!(members.len() <= table.columns());
        }
    }

    #[test]
    fn test_empty_sets() {
        let table = IncidenceTable::build(&[set(&[]), set(&[])]);
        assert!(table.is_empty());
        assert_eq!(table.columns(), 2);
    }
}
