//! Attribute lookups for batches of groups and users
//!
//! Every input name yields exactly one output row. Names the directory cannot
//! resolve produce an explicit "Not Found" row instead of being dropped, so a
//! caller can tell "zero groups" apart from "lookup failed".

use crate::error::{MembershipError, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use groupscope_core::{
    DirectoryError, DirectoryProvider, GroupAttributes, Principal, PrincipalAttributes, Table,
    UserAttributes,
};
use tracing::{debug, info, warn};

/// Cell value used for every attribute of an unresolved row
pub const NOT_FOUND: &str = "Not Found";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Member count column state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberCount {
    /// Counts were not requested
    NotRequested,
    /// Number of direct members
    Count(u64),
    /// Counts were requested but the count lookup failed
    Unavailable,
}

/// Result of one group lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupInfo {
    /// The group was found
    Found {
        /// Directory attributes
        attributes: GroupAttributes,
        /// Member count, if requested
        member_count: MemberCount,
    },
    /// The name does not resolve to a group
    NotFound,
}

/// One row of a group-info batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfoRow {
    /// Requested group name
    pub name: Principal,
    /// Lookup result
    pub info: GroupInfo,
}

/// One row of a user-info batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfoRow {
    /// Requested account name
    pub name: Principal,
    /// Attributes, or `None` when the name does not resolve to a user
    pub attributes: Option<UserAttributes>,
}

/// Batch attribute lookups against a directory provider
pub struct InfoLookup<P> {
    provider: P,
    max_concurrent_lookups: usize,
}

impl<P: DirectoryProvider> InfoLookup<P> {
    /// Create a lookup helper
    pub fn new(provider: P, max_concurrent_lookups: usize) -> Self {
        Self {
            provider,
            max_concurrent_lookups: max_concurrent_lookups.max(1),
        }
    }

    /// Look up attributes for each group name, in input order
    ///
    /// With `with_member_count`, one extra directory call is made per
    /// resolved group.
    pub async fn groups(
        &self,
        names: &[Principal],
        with_member_count: bool,
    ) -> Result<Vec<GroupInfoRow>> {
        reject_empty(names)?;

        let rows: Vec<GroupInfoRow> = stream::iter(names.iter().map(|name| async move {
            GroupInfoRow {
                name: name.clone(),
                info: self.group_info(name, with_member_count).await,
            }
        }))
        .buffered(self.max_concurrent_lookups)
        .collect()
        .await;

        let missing = rows.iter().filter(|row| row.info == GroupInfo::NotFound).count();
        info!(requested = names.len(), missing, with_member_count, "Looked up group attributes");
        Ok(rows)
    }

    /// Look up attributes for each account name, in input order
    pub async fn users(&self, names: &[Principal]) -> Result<Vec<UserInfoRow>> {
        reject_empty(names)?;

        let rows: Vec<UserInfoRow> = stream::iter(names.iter().map(|name| async move {
            let attributes = match self.provider.attributes(name).await {
                Ok(PrincipalAttributes::User(user)) => Some(user),
                Ok(PrincipalAttributes::Group(_)) => {
                    debug!(name = %name, "Name resolves to a group, not a user");
                    None
                }
                Err(err) => {
                    log_failure(&err);
                    None
                }
            };
            UserInfoRow {
                name: name.clone(),
                attributes,
            }
        }))
        .buffered(self.max_concurrent_lookups)
        .collect()
        .await;

        let missing = rows.iter().filter(|row| row.attributes.is_none()).count();
        info!(requested = names.len(), missing, "Looked up user attributes");
        Ok(rows)
    }

    async fn group_info(&self, name: &Principal, with_member_count: bool) -> GroupInfo {
        if name.is_blank() {
            return GroupInfo::NotFound;
        }

        let attributes = match self.provider.attributes(name).await {
            Ok(PrincipalAttributes::Group(group)) => group,
            Ok(PrincipalAttributes::User(_)) => {
                debug!(name = %name, "Name resolves to a user, not a group");
                return GroupInfo::NotFound;
            }
            Err(err) => {
                log_failure(&err);
                return GroupInfo::NotFound;
            }
        };

        let member_count = if with_member_count {
            match self.provider.member_count(name).await {
                Ok(count) => MemberCount::Count(count),
                Err(err) => {
                    warn!(group = %name, error = %err, "Member count unavailable");
                    MemberCount::Unavailable
                }
            }
        } else {
            MemberCount::NotRequested
        };

        GroupInfo::Found {
            attributes,
            member_count,
        }
    }
}

fn reject_empty(names: &[Principal]) -> Result<()> {
    if names.is_empty() {
        return Err(MembershipError::InvalidInput(
            "at least one name is required".to_string(),
        ));
    }
    Ok(())
}

fn log_failure(err: &DirectoryError) {
    if err.is_not_found() {
        debug!(name = %err.principal(), "Identity not found");
    } else {
        warn!(name = %err.principal(), error = %err, "Attribute lookup failed");
    }
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.format(TIMESTAMP_FORMAT).to_string()).unwrap_or_default()
}

/// Render group rows: `Group, Creation Date, Description, Category, Scope`
/// plus `Member Count` when counts were requested
pub fn group_info_table(rows: &[GroupInfoRow], with_member_count: bool) -> Table {
    let mut headers = vec!["Group", "Creation Date", "Description", "Category", "Scope"];
    if with_member_count {
        headers.push("Member Count");
    }
    let mut table = Table::new(headers);

    for row in rows {
        let mut cells = vec![row.name.to_string()];
        match &row.info {
            GroupInfo::Found {
                attributes,
                member_count,
            } => {
                cells.push(format_timestamp(attributes.created));
                cells.push(attributes.description.clone());
                cells.push(attributes.category.clone());
                cells.push(attributes.scope.clone());
                if with_member_count {
                    cells.push(match member_count {
                        MemberCount::Count(count) => count.to_string(),
                        MemberCount::Unavailable => NOT_FOUND.to_string(),
                        MemberCount::NotRequested => String::new(),
                    });
                }
            }
            GroupInfo::NotFound => {
                let width = table.headers.len() - 1;
                cells.extend(std::iter::repeat(NOT_FOUND.to_string()).take(width));
            }
        }
        table.push_row(cells);
    }
    table
}

/// Render user rows: `User, Display Name, Email, Title, Department, Enabled, Last Logon`
pub fn user_info_table(rows: &[UserInfoRow]) -> Table {
    let mut table = Table::new([
        "User",
        "Display Name",
        "Email",
        "Title",
        "Department",
        "Enabled",
        "Last Logon",
    ]);

    for row in rows {
        let mut cells = vec![row.name.to_string()];
        match &row.attributes {
            Some(user) => {
                cells.push(user.display_name.clone());
                cells.push(user.email.clone());
                cells.push(user.title.clone());
                cells.push(user.department.clone());
                cells.push(user.enabled.to_string());
                cells.push(format_timestamp(user.last_logon));
            }
            None => {
                let width = table.headers.len() - 1;
                cells.extend(std::iter::repeat(NOT_FOUND.to_string()).take(width));
            }
        }
        table.push_row(cells);
    }
    table
}
