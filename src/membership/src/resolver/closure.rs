//! Closure resolver with generation-wise concurrent expansion

use super::types::{ClosureOutcome, ClosureResult, PruneReason, PrunedVertex};
use crate::error::{MembershipError, Result};
use futures::stream::{self, StreamExt};
use groupscope_core::{DirectoryError, DirectoryProvider, Principal};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Default number of concurrent directory lookups per frontier generation
const DEFAULT_MAX_CONCURRENT_LOOKUPS: usize = 8;

/// Resolver configuration
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Upper bound on in-flight directory calls within one generation
    pub max_concurrent_lookups: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_concurrent_lookups: DEFAULT_MAX_CONCURRENT_LOOKUPS,
        }
    }
}

/// Computes transitive group membership against a directory provider
///
/// The resolver holds no state between calls: every closure starts from an
/// empty visited set and nothing is cached across invocations.
///
/// # Thread Safety
///
/// `closure` takes `&self`, so one resolver can serve concurrent callers as
/// long as the provider is `Sync` (which the trait requires).
#[derive(Debug, Clone)]
pub struct ClosureResolver<P> {
    provider: P,
    config: ResolverConfig,
}

/// Mutable state of one closure computation, owned by the coordinating task
struct Expansion<'a> {
    start: &'a Principal,
    discovered: HashSet<Principal>,
    start_in_cycle: bool,
    lookups: usize,
    depth: usize,
    pruned: Vec<PrunedVertex>,
}

impl<'a> Expansion<'a> {
    fn new(start: &'a Principal) -> Self {
        Self {
            start,
            discovered: HashSet::new(),
            start_in_cycle: false,
            lookups: 1,
            depth: 0,
            pruned: Vec::new(),
        }
    }

    /// Record newly returned parents, queueing the unseen ones into `next`
    fn absorb(&mut self, parents: Vec<Principal>, next: &mut Vec<Principal>) {
        for parent in parents {
            if &parent == self.start {
                self.start_in_cycle = true;
                continue;
            }
            if self.discovered.insert(parent.clone()) {
                next.push(parent);
            }
        }
    }

    fn prune(&mut self, vertex: Principal, err: DirectoryError) {
        let reason = match err {
            DirectoryError::NotFound(_) => {
                debug!(start = %self.start, vertex = %vertex, "Pruning branch: identity not found");
                PruneReason::NotFound
            }
            DirectoryError::Lookup { reason, .. } => {
                warn!(
                    start = %self.start,
                    vertex = %vertex,
                    reason = %reason,
                    "Pruning branch: lookup failed"
                );
                PruneReason::LookupFailed(reason)
            }
        };
        self.pruned.push(PrunedVertex { principal: vertex, reason });
    }

    fn finish(self) -> ClosureResult {
        let mut groups: Vec<Principal> = self.discovered.into_iter().collect();
        groups.sort();
        let mut pruned = self.pruned;
        pruned.sort();

        ClosureResult {
            start: self.start.clone(),
            groups,
            start_in_cycle: self.start_in_cycle,
            lookups: self.lookups,
            depth: self.depth,
            pruned,
        }
    }
}

impl<P: DirectoryProvider> ClosureResolver<P> {
    /// Create a resolver with default settings
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, ResolverConfig::default())
    }

    /// Create a resolver with custom settings
    pub fn with_config(provider: P, config: ResolverConfig) -> Self {
        Self { provider, config }
    }

    /// The underlying directory provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Resolver settings
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Compute the transitive closure of `start`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `start` is blank (`InvalidInput`, no directory call is made)
    /// - the directory has no record of `start` (`IdentityNotFound`)
    /// - looking up `start` itself fails (`Lookup`)
    ///
    /// Failures on any other vertex only prune that branch and are reported
    /// in [`ClosureResult::pruned`].
    pub async fn closure(&self, start: &Principal) -> Result<ClosureResult> {
        if start.is_blank() {
            return Err(MembershipError::InvalidInput(
                "principal identifier cannot be empty".to_string(),
            ));
        }

        let roots = self.provider.direct_parent_groups(start).await.map_err(|err| {
            warn!(start = %start, error = %err, "Start principal could not be resolved");
            MembershipError::from(err)
        })?;

        let mut expansion = Expansion::new(start);
        let mut frontier = Vec::new();
        expansion.absorb(roots, &mut frontier);

        while !frontier.is_empty() {
            expansion.depth += 1;
            debug!(
                start = %start,
                depth = expansion.depth,
                width = frontier.len(),
                "Expanding generation"
            );

            let provider = &self.provider;
            let mut generation = stream::iter(std::mem::take(&mut frontier).into_iter().map(
                move |vertex| async move {
                    let outcome = provider.direct_parent_groups(&vertex).await;
                    (vertex, outcome)
                },
            ))
            .buffer_unordered(self.config.max_concurrent_lookups.max(1));

            let mut next = Vec::new();
            while let Some((vertex, outcome)) = generation.next().await {
                expansion.lookups += 1;
                match outcome {
                    Ok(parents) => expansion.absorb(parents, &mut next),
                    Err(err) => expansion.prune(vertex, err),
                }
            }
            frontier = next;
        }

        let result = expansion.finish();
        info!(
            start = %start,
            groups = result.groups.len(),
            lookups = result.lookups,
            pruned = result.pruned.len(),
            "Resolved membership closure"
        );
        Ok(result)
    }

    /// Like [`closure`](Self::closure), but stops issuing directory calls
    /// once `cancel` fires
    ///
    /// A cancelled closure returns `Cancelled`; partial results are dropped.
    pub async fn closure_with_cancel(
        &self,
        start: &Principal,
        cancel: &CancellationToken,
    ) -> Result<ClosureResult> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(start = %start, "Closure cancelled");
                Err(MembershipError::Cancelled)
            }
            result = self.closure(start) => result,
        }
    }

    /// Resolve several principals independently, best effort
    ///
    /// One principal failing never affects the others; each outcome is
    /// returned in input order.
    pub async fn closure_batch(&self, principals: &[Principal]) -> Result<Vec<ClosureOutcome>> {
        if principals.is_empty() {
            return Err(MembershipError::InvalidInput(
                "at least one principal is required".to_string(),
            ));
        }

        let lookups = principals.iter().map(|principal| async move {
            ClosureOutcome {
                principal: principal.clone(),
                result: self.closure(principal).await,
            }
        });
        let outcomes: Vec<ClosureOutcome> = stream::iter(lookups)
            .buffered(self.config.max_concurrent_lookups.max(1))
            .collect()
            .await;

        let failed = outcomes.iter().filter(|o| !o.is_resolved()).count();
        if failed > 0 {
            warn!(failed, total = outcomes.len(), "Some principals could not be resolved");
        }
        Ok(outcomes)
    }
}
