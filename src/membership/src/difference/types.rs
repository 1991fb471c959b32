//! Difference table types

use super::incidence::IncidenceTable;
use crate::info::NOT_FOUND;
use groupscope_core::{Principal, Table};

/// One output row: a group and which compared principals belong to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferenceRow {
    /// Group name
    pub group: Principal,
    /// Membership flag per compared principal, in column order
    pub membership: Vec<bool>,
}

impl DifferenceRow {
    /// Whether the principal in `column` belongs to this group
    pub fn is_member(&self, column: usize) -> bool {
        self.membership.get(column).copied().unwrap_or(false)
    }
}

/// Groups that are not shared by every compared principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DifferenceTable {
    /// Compared principals, in column order
    pub principals: Vec<Principal>,

    /// Differential groups, sorted by name
    pub rows: Vec<DifferenceRow>,

    /// Number of groups suppressed because every principal belongs to them
    pub suppressed: usize,

    /// Principals whose lookup failed and were compared as having no groups
    pub unresolved: Vec<Principal>,

    /// Principals whose transitive closure lost a branch to a failed lookup
    pub incomplete: Vec<Principal>,
}

impl DifferenceTable {
    /// Derive the differential rows from an incidence table
    pub(crate) fn from_incidence(
        principals: Vec<Principal>,
        incidence: &IncidenceTable,
        unresolved: Vec<Principal>,
    ) -> Self {
        let columns = principals.len();
        let mut rows = Vec::new();
        let mut suppressed = 0;

        for (group, members) in incidence.iter() {
            if members.len() >= columns {
                suppressed += 1;
                continue;
            }
            rows.push(DifferenceRow {
                group: group.clone(),
                membership: (0..columns).map(|c| members.contains(&c)).collect(),
            });
        }

        Self {
            principals,
            rows,
            suppressed,
            unresolved,
            incomplete: Vec::new(),
        }
    }

    /// Find the row for `group`
    pub fn row(&self, group: &str) -> Option<&DifferenceRow> {
        self.rows.iter().find(|row| row.group.as_str() == group)
    }

    /// Names of the differential groups
    pub fn group_names(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.group.as_str()).collect()
    }

    /// Whether the principal in `column` could not be resolved
    pub fn is_unresolved(&self, column: usize) -> bool {
        self.principals
            .get(column)
            .is_some_and(|principal| self.unresolved.contains(principal))
    }

    /// First column `Group`, then one column per principal holding the
    /// principal's identifier when it is a member and an empty cell otherwise
    ///
    /// Every cell of an unresolved principal's column holds `"Not Found"`,
    /// and a trailing `"Not Found"` row marks those columns even when no
    /// group is differential.
    pub fn to_table(&self) -> Table {
        let mut table = Table::new(
            std::iter::once("Group").chain(self.principals.iter().map(Principal::as_str)),
        );
        for row in &self.rows {
            let cells = self.principals.iter().enumerate().map(|(column, principal)| {
                if self.is_unresolved(column) {
                    NOT_FOUND
                } else if row.is_member(column) {
                    principal.as_str()
                } else {
                    ""
                }
            });
            table.push_row(std::iter::once(row.group.as_str()).chain(cells));
        }

        if !self.unresolved.is_empty() {
            let cells = (0..self.principals.len())
                .map(|column| if self.is_unresolved(column) { NOT_FOUND } else { "" });
            table.push_row(std::iter::once(NOT_FOUND).chain(cells));
        }
        table
    }
}
