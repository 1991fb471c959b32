//! Difference engine orchestration

use super::incidence::IncidenceTable;
use super::types::DifferenceTable;
use crate::error::{MembershipError, Result};
use crate::resolver::{ClosureResolver, ResolverConfig};
use futures::stream::{self, StreamExt};
use groupscope_core::{DirectoryProvider, Principal};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// How far group membership is followed for each compared principal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    /// Immediate group membership only (one directory call per principal)
    #[default]
    Direct,
    /// Full transitive closure through nested groups
    Transitive,
}

impl FromStr for Depth {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(Depth::Direct),
            "transitive" => Ok(Depth::Transitive),
            other => Err(format!("unknown depth '{}', expected 'direct' or 'transitive'", other)),
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Direct => write!(f, "direct"),
            Depth::Transitive => write!(f, "transitive"),
        }
    }
}

/// What to do when a compared principal cannot be resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnresolvedPolicy {
    /// Fail the whole comparison
    #[default]
    Abort,
    /// Compare the principal as having no groups and list it in
    /// [`DifferenceTable::unresolved`]
    TreatAsEmpty,
}

impl FromStr for UnresolvedPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "abort" => Ok(UnresolvedPolicy::Abort),
            "empty" | "treat-as-empty" => Ok(UnresolvedPolicy::TreatAsEmpty),
            other => Err(format!("unknown policy '{}', expected 'abort' or 'empty'", other)),
        }
    }
}

/// Comparison configuration
#[derive(Debug, Clone)]
pub struct CompareConfig {
    /// Direct or transitive membership
    pub depth: Depth,

    /// Handling of principals that cannot be resolved
    pub on_unresolved: UnresolvedPolicy,

    /// Upper bound on principals looked up concurrently
    pub max_concurrent_lookups: usize,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            depth: Depth::Direct,
            on_unresolved: UnresolvedPolicy::Abort,
            max_concurrent_lookups: ResolverConfig::default().max_concurrent_lookups,
        }
    }
}

/// Computes which groups distinguish a set of principals
///
/// # Architecture
///
/// ```text
/// principals ──► group set per principal ──► IncidenceTable ──► DifferenceTable
///                 (one-hop or closure,         (built by the       (groups with
///                  looked up concurrently)      coordinating task)  count < N)
/// ```
pub struct DifferenceEngine<P> {
    resolver: ClosureResolver<P>,
    config: CompareConfig,
}

impl<P: DirectoryProvider> DifferenceEngine<P> {
    /// Create an engine over a directory provider
    pub fn new(provider: P, config: CompareConfig) -> Self {
        let resolver = ClosureResolver::with_config(
            provider,
            ResolverConfig {
                max_concurrent_lookups: config.max_concurrent_lookups,
            },
        );
        Self { resolver, config }
    }

    /// Engine configuration
    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Compare the group memberships of `principals`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` before any directory call when fewer than two
    /// principals are given, when one is blank, or when one is listed twice.
    /// Under [`UnresolvedPolicy::Abort`] the first principal that cannot be
    /// resolved fails the comparison with `IdentityNotFound` or `Lookup`.
    pub async fn compare(&self, principals: &[Principal]) -> Result<DifferenceTable> {
        validate(principals)?;

        let mut lookups = stream::iter(principals.iter().map(|principal| self.group_set(principal)))
            .buffered(self.config.max_concurrent_lookups.max(1));

        let mut group_sets = Vec::with_capacity(principals.len());
        let mut unresolved = Vec::new();
        let mut incomplete = Vec::new();
        let mut column = 0;
        while let Some(outcome) = lookups.next().await {
            let principal = &principals[column];
            column += 1;
            match outcome {
                Ok(GroupSet { groups, complete }) => {
                    debug!(
                        principal = %principal,
                        groups = groups.len(),
                        complete,
                        "Collected group set"
                    );
                    if !complete {
                        warn!(principal = %principal, "Comparing a partial closure");
                        incomplete.push(principal.clone());
                    }
                    group_sets.push(groups);
                }
                Err(err) => match self.config.on_unresolved {
                    UnresolvedPolicy::Abort => {
                        warn!(principal = %principal, error = %err, "Aborting comparison");
                        return Err(err);
                    }
                    UnresolvedPolicy::TreatAsEmpty => {
                        warn!(
                            principal = %principal,
                            error = %err,
                            "Comparing unresolved principal as having no groups"
                        );
                        unresolved.push(principal.clone());
                        group_sets.push(BTreeSet::new());
                    }
                },
            }
        }

        let incidence = IncidenceTable::build(&group_sets);
        let mut table =
            DifferenceTable::from_incidence(principals.to_vec(), &incidence, unresolved);
        table.incomplete = incomplete;
        info!(
            principals = principals.len(),
            depth = %self.config.depth,
            groups = incidence.len(),
            differential = table.rows.len(),
            suppressed = table.suppressed,
            unresolved = table.unresolved.len(),
            incomplete = table.incomplete.len(),
            "Compared group memberships"
        );
        Ok(table)
    }

    /// Like [`compare`](Self::compare), but stops issuing directory calls
    /// once `cancel` fires
    pub async fn compare_with_cancel(
        &self,
        principals: &[Principal],
        cancel: &CancellationToken,
    ) -> Result<DifferenceTable> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(MembershipError::Cancelled),
            result = self.compare(principals) => result,
        }
    }

    async fn group_set(&self, principal: &Principal) -> Result<GroupSet> {
        match self.config.depth {
            Depth::Direct => {
                let parents = self.resolver.provider().direct_parent_groups(principal).await?;
                Ok(GroupSet {
                    groups: parents.into_iter().collect(),
                    complete: true,
                })
            }
            Depth::Transitive => {
                let closure = self.resolver.closure(principal).await?;
                Ok(GroupSet {
                    complete: closure.is_complete(),
                    groups: closure.groups.into_iter().collect(),
                })
            }
        }
    }
}

/// Groups collected for one compared principal
struct GroupSet {
    groups: BTreeSet<Principal>,
    /// False when some branch of a transitive closure was pruned
    complete: bool,
}

fn validate(principals: &[Principal]) -> Result<()> {
    if principals.len() < 2 {
        return Err(MembershipError::InvalidInput(format!(
            "at least two principals are required for a comparison, got {}",
            principals.len()
        )));
    }

    let mut seen = HashSet::with_capacity(principals.len());
    for principal in principals {
        if principal.is_blank() {
            return Err(MembershipError::InvalidInput(
                "principal identifier cannot be empty".to_string(),
            ));
        }
        if !seen.insert(principal.as_str()) {
            return Err(MembershipError::InvalidInput(format!(
                "principal '{}' is listed more than once",
                principal
            )));
        }
    }
    Ok(())
}
