//! Per-run memoization of directory answers

use async_trait::async_trait;
use dashmap::DashMap;
use groupscope_core::{DirectoryProvider, DirectoryResult, Principal, PrincipalAttributes};
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Memo statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoStats {
    /// Answers served from the memo
    pub hits: usize,
    /// Answers fetched from the wrapped provider
    pub misses: usize,
    /// Entries currently held
    pub entries: usize,
}

impl MemoStats {
    /// Calculates the memo hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Provider decorator that remembers answers for the lifetime of the value
///
/// Successful answers and "not found" answers are kept; transient failures
/// are passed through and never remembered, so the next caller reaches the
/// directory again. The memo lives only as long as the decorator: build a
/// fresh one per run.
///
/// Two concurrent misses on the same key may both reach the directory.
pub struct MemoizedDirectory<P> {
    inner: P,
    parents: DashMap<Principal, DirectoryResult<Vec<Principal>>>,
    attributes: DashMap<Principal, DirectoryResult<PrincipalAttributes>>,
    member_counts: DashMap<Principal, DirectoryResult<u64>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<P: DirectoryProvider> MemoizedDirectory<P> {
    /// Wrap a provider
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            parents: DashMap::new(),
            attributes: DashMap::new(),
            member_counts: DashMap::new(),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Memo statistics
    pub fn stats(&self) -> MemoStats {
        MemoStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.parents.len() + self.attributes.len() + self.member_counts.len(),
        }
    }

    /// Drop every remembered answer
    pub fn clear(&self) {
        self.parents.clear();
        self.attributes.clear();
        self.member_counts.clear();
    }

    fn lookup_memo<T: Clone>(
        &self,
        memo: &DashMap<Principal, DirectoryResult<T>>,
        key: &Principal,
    ) -> Option<DirectoryResult<T>> {
        let cached = memo.get(key).map(|entry| entry.value().clone());
        if cached.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        cached
    }
}

fn remember<K, T>(memo: &DashMap<K, DirectoryResult<T>>, key: K, outcome: &DirectoryResult<T>)
where
    K: Eq + Hash,
    T: Clone,
{
    match outcome {
        Ok(value) => {
            memo.insert(key, Ok(value.clone()));
        }
        Err(err) if err.is_not_found() => {
            memo.insert(key, Err(err.clone()));
        }
        Err(err) => {
            debug!(error = %err, "Not memoizing transient failure");
        }
    }
}

#[async_trait]
impl<P: DirectoryProvider> DirectoryProvider for MemoizedDirectory<P> {
    async fn direct_parent_groups(&self, principal: &Principal) -> DirectoryResult<Vec<Principal>> {
        if let Some(cached) = self.lookup_memo(&self.parents, principal) {
            return cached;
        }
        let outcome = self.inner.direct_parent_groups(principal).await;
        remember(&self.parents, principal.clone(), &outcome);
        outcome
    }

    async fn attributes(&self, principal: &Principal) -> DirectoryResult<PrincipalAttributes> {
        if let Some(cached) = self.lookup_memo(&self.attributes, principal) {
            return cached;
        }
        let outcome = self.inner.attributes(principal).await;
        remember(&self.attributes, principal.clone(), &outcome);
        outcome
    }

    async fn member_count(&self, group: &Principal) -> DirectoryResult<u64> {
        if let Some(cached) = self.lookup_memo(&self.member_counts, group) {
            return cached;
        }
        let outcome = self.inner.member_count(group).await;
        remember(&self.member_counts, group.clone(), &outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{InMemoryDirectory, MeteredDirectory};
    use std::sync::Arc;

    fn p(name: &str) -> Principal {
        Principal::new(name)
    }

    #[tokio::test]
    async fn test_repeated_lookups_hit_memo() {
        let metered = Arc::new(MeteredDirectory::new(
            InMemoryDirectory::new().with_membership("alice", "G1"),
        ));
        let memo = MemoizedDirectory::new(Arc::clone(&metered));

        for _ in 0..3 {
            assert_eq!(memo.direct_parent_groups(&p("alice")).await.unwrap(), vec![p("G1")]);
        }
        assert_eq!(metered.stats().parent_groups.calls, 1);

        let stats = memo.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test]
    async fn test_not_found_is_memoized() {
        let metered = Arc::new(MeteredDirectory::new(InMemoryDirectory::new()));
        let memo = MemoizedDirectory::new(Arc::clone(&metered));

        assert!(memo.attributes(&p("ghost")).await.unwrap_err().is_not_found());
        assert!(memo.attributes(&p("ghost")).await.unwrap_err().is_not_found());
        assert_eq!(metered.stats().attributes.calls, 1);
    }

    #[tokio::test]
    async fn test_transient_failures_are_not_memoized() {
        let metered = Arc::new(MeteredDirectory::new(
            InMemoryDirectory::new()
                .with_membership("alice", "G1")
                .with_failure("G1"),
        ));
        let memo = MemoizedDirectory::new(Arc::clone(&metered));

        assert!(memo.member_count(&p("G1")).await.is_err());
        assert!(memo.member_count(&p("G1")).await.is_err());
        assert_eq!(metered.stats().member_counts.calls, 2);
        assert_eq!(memo.stats().entries, 0);
    }

    #[tokio::test]
    async fn test_clear() {
        let memo = MemoizedDirectory::new(InMemoryDirectory::new().with_membership("alice", "G1"));
        memo.direct_parent_groups(&p("alice")).await.unwrap();
        assert_eq!(memo.stats().entries, 1);

        memo.clear();
        assert_eq!(memo.stats().entries, 0);
    }
}
