//! In-memory directory backed by a flat membership relation

use crate::error::{MembershipError, Result};
use async_trait::async_trait;
use groupscope_core::{
    DirectoryError, DirectoryProvider, DirectoryResult, GroupAttributes, Principal,
    PrincipalAttributes, UserAttributes,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Serialized form of a directory: attribute records plus the
/// "principal has direct parent groups" relation
///
/// ```json
/// {
///   "principals": {
///     "alice": { "kind": "user", "display_name": "Alice" },
///     "developers": { "kind": "group", "scope": "Global" }
///   },
///   "memberships": { "alice": ["developers"] },
///   "unavailable": ["flaky-group"]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    /// Attribute records by principal
    #[serde(default)]
    pub principals: BTreeMap<Principal, PrincipalAttributes>,

    /// Direct parent groups by child principal, in directory order
    #[serde(default)]
    pub memberships: BTreeMap<Principal, Vec<Principal>>,

    /// Principals whose lookups fail with a transient error
    #[serde(default)]
    pub unavailable: BTreeSet<Principal>,
}

/// Directory provider serving a [`DirectorySnapshot`] from memory
///
/// A principal exists if it has an attribute record, has memberships, or is
/// named as somebody's parent. Every existing principal answers all three
/// lookups: parents without an attribute record are reported as groups with
/// empty attributes, and other principals without one as users with default
/// attributes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    snapshot: DirectorySnapshot,
    /// Direct member count per group, derived from `memberships`
    member_counts: HashMap<Principal, u64>,
    latency: Option<Duration>,
}

impl InMemoryDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a directory from a snapshot
    pub fn from_snapshot(snapshot: DirectorySnapshot) -> Self {
        let mut directory = Self {
            snapshot,
            member_counts: HashMap::new(),
            latency: None,
        };
        directory.reindex();
        directory
    }

    /// Load a JSON snapshot from disk
    pub async fn from_snapshot_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            MembershipError::Snapshot(format!("failed to read {}: {}", path.display(), e))
        })?;
        let snapshot: DirectorySnapshot = serde_json::from_str(&contents).map_err(|e| {
            MembershipError::Snapshot(format!("failed to parse {}: {}", path.display(), e))
        })?;

        let directory = Self::from_snapshot(snapshot);
        info!(
            path = %path.display(),
            principals = directory.snapshot.principals.len(),
            memberships = directory.snapshot.memberships.len(),
            "Loaded directory snapshot"
        );
        Ok(directory)
    }

    /// Add a user record
    pub fn with_user(mut self, name: impl Into<Principal>, attributes: UserAttributes) -> Self {
        self.snapshot
            .principals
            .insert(name.into(), PrincipalAttributes::User(attributes));
        self
    }

    /// Add a group record
    pub fn with_group(mut self, name: impl Into<Principal>, attributes: GroupAttributes) -> Self {
        self.snapshot
            .principals
            .insert(name.into(), PrincipalAttributes::Group(attributes));
        self
    }

    /// Record that `child` is a direct member of `parent`
    pub fn with_membership(
        mut self,
        child: impl Into<Principal>,
        parent: impl Into<Principal>,
    ) -> Self {
        let parent = parent.into();
        let parents = self.snapshot.memberships.entry(child.into()).or_default();
        if !parents.contains(&parent) {
            parents.push(parent.clone());
            *self.member_counts.entry(parent).or_insert(0) += 1;
        }
        self
    }

    /// Make every lookup of `name` fail with a transient error
    pub fn with_failure(mut self, name: impl Into<Principal>) -> Self {
        self.snapshot.unavailable.insert(name.into());
        self
    }

    /// Delay every lookup, simulating directory round-trip latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// The snapshot being served
    pub fn snapshot(&self) -> &DirectorySnapshot {
        &self.snapshot
    }

    fn reindex(&mut self) {
        self.member_counts.clear();
        for parents in self.snapshot.memberships.values() {
            let distinct: BTreeSet<&Principal> = parents.iter().collect();
            for parent in distinct {
                *self.member_counts.entry(parent.clone()).or_insert(0) += 1;
            }
        }
    }

    fn exists(&self, principal: &Principal) -> bool {
        self.snapshot.principals.contains_key(principal)
            || self.snapshot.memberships.contains_key(principal)
            || self.member_counts.contains_key(principal)
    }

    /// Shared preamble of every lookup: latency, transient failure, existence
    async fn check(&self, principal: &Principal) -> DirectoryResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        if self.snapshot.unavailable.contains(principal) {
            return Err(DirectoryError::lookup(principal, "directory server unavailable"));
        }
        if !self.exists(principal) {
            return Err(DirectoryError::not_found(principal));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryProvider for InMemoryDirectory {
    async fn direct_parent_groups(&self, principal: &Principal) -> DirectoryResult<Vec<Principal>> {
        self.check(principal).await?;
        Ok(self
            .snapshot
            .memberships
            .get(principal)
            .cloned()
            .unwrap_or_default())
    }

    async fn attributes(&self, principal: &Principal) -> DirectoryResult<PrincipalAttributes> {
        self.check(principal).await?;
        match self.snapshot.principals.get(principal) {
            Some(attributes) => Ok(attributes.clone()),
            None if self.member_counts.contains_key(principal) => {
                Ok(PrincipalAttributes::Group(GroupAttributes::default()))
            }
            None => Ok(PrincipalAttributes::User(UserAttributes::default())),
        }
    }

    async fn member_count(&self, group: &Principal) -> DirectoryResult<u64> {
        self.check(group).await?;
        Ok(self.member_counts.get(group).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn p(name: &str) -> Principal {
        Principal::new(name)
    }

    #[tokio::test]
    async fn test_direct_parent_groups() {
        let directory = InMemoryDirectory::new()
            .with_membership("alice", "G1")
            .with_membership("alice", "G2")
            .with_membership("alice", "G1");

        let parents = directory.direct_parent_groups(&p("alice")).await.unwrap();
        assert_eq!(parents, vec![p("G1"), p("G2")]);

        // Known only as a parent: exists, no parents of its own
        assert!(directory.direct_parent_groups(&p("G1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_principal_is_not_found() {
        let directory = InMemoryDirectory::new().with_membership("alice", "G1");
        let err = directory.direct_parent_groups(&p("mallory")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unavailable_principal_fails_transiently() {
        let directory = InMemoryDirectory::new()
            .with_membership("alice", "G1")
            .with_failure("G1");

        let err = directory.direct_parent_groups(&p("G1")).await.unwrap_err();
        assert!(matches!(err, DirectoryError::Lookup { .. }));
        assert!(directory.member_count(&p("G1")).await.is_err());
    }

    #[tokio::test]
    async fn test_attributes_and_member_counts() {
        let directory = InMemoryDirectory::new()
            .with_user("alice", UserAttributes::default())
            .with_group(
                "G1",
                GroupAttributes {
                    description: "First".to_string(),
                    ..Default::default()
                },
            )
            .with_membership("alice", "G1")
            .with_membership("bob", "G1")
            .with_membership("bob", "G2");

        let attrs = directory.attributes(&p("G1")).await.unwrap();
        assert_eq!(attrs.as_group().unwrap().description, "First");
        assert!(directory.attributes(&p("alice")).await.unwrap().as_user().is_some());

        // G2 has no record but is somebody's parent
        assert!(directory.attributes(&p("G2")).await.unwrap().as_group().is_some());
        // bob has memberships but no record
        assert_eq!(
            directory.attributes(&p("bob")).await.unwrap(),
            PrincipalAttributes::User(UserAttributes::default())
        );
        assert!(directory.attributes(&p("mallory")).await.unwrap_err().is_not_found());

        assert_eq!(directory.member_count(&p("G1")).await.unwrap(), 2);
        assert_eq!(directory.member_count(&p("G2")).await.unwrap(), 1);
        assert_eq!(directory.member_count(&p("alice")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_every_existing_principal_answers_every_lookup() {
        let directory = InMemoryDirectory::new()
            .with_membership("svc-backup", "operators")
            .with_membership("operators", "admins");

        for name in ["svc-backup", "operators", "admins"] {
            let principal = p(name);
            assert!(directory.direct_parent_groups(&principal).await.is_ok());
            assert!(directory.attributes(&principal).await.is_ok());
            assert!(directory.member_count(&principal).await.is_ok());
        }
        let attrs = directory.attributes(&p("svc-backup")).await.unwrap();
        assert!(attrs.as_user().is_some());
        assert!(directory.attributes(&p("operators")).await.unwrap().as_group().is_some());
    }

    #[tokio::test]
    async fn test_snapshot_file_round_trip() {
        let json = r#"{
            "principals": {
                "alice": { "kind": "user", "display_name": "Alice" },
                "ops": { "kind": "group", "category": "Security", "scope": "Global" }
            },
            "memberships": { "alice": ["ops"], "ops": ["all-staff"] },
            "unavailable": ["all-staff"]
        }"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let directory = InMemoryDirectory::from_snapshot_file(file.path()).await.unwrap();
        assert_eq!(directory.direct_parent_groups(&p("alice")).await.unwrap(), vec![p("ops")]);
        assert_eq!(directory.member_count(&p("ops")).await.unwrap(), 1);
        assert!(!directory.direct_parent_groups(&p("all-staff")).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_snapshot_file_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = InMemoryDirectory::from_snapshot_file(file.path()).await.unwrap_err();
        assert!(matches!(err, MembershipError::Snapshot(_)));
    }
}
