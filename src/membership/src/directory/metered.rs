//! Lookup metrics for directory observability

use async_trait::async_trait;
use groupscope_core::{DirectoryProvider, DirectoryResult, Principal, PrincipalAttributes};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters for one provider operation
#[derive(Debug, Default)]
struct OperationCounters {
    calls: AtomicU64,
    not_found: AtomicU64,
    failures: AtomicU64,
}

impl OperationCounters {
    fn record<T>(&self, outcome: &DirectoryResult<T>) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match outcome {
            Ok(_) => {}
            Err(err) if err.is_not_found() => {
                self.not_found.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn snapshot(&self) -> OperationStats {
        OperationStats {
            calls: self.calls.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counters for one provider operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationStats {
    /// Total calls
    pub calls: u64,
    /// Calls answered with "no such identity"
    pub not_found: u64,
    /// Calls that failed transiently
    pub failures: u64,
}

impl OperationStats {
    /// Fraction of calls that failed transiently
    pub fn failure_rate(&self) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            self.failures as f64 / self.calls as f64
        }
    }
}

/// Point-in-time view of all lookup counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LookupStats {
    /// `direct_parent_groups` calls
    pub parent_groups: OperationStats,
    /// `attributes` calls
    pub attributes: OperationStats,
    /// `member_count` calls
    pub member_counts: OperationStats,
}

impl LookupStats {
    /// Total directory round-trips across all operations
    pub fn total_calls(&self) -> u64 {
        self.parent_groups.calls + self.attributes.calls + self.member_counts.calls
    }
}

/// Shared lookup counters
#[derive(Debug, Default)]
pub struct LookupMetrics {
    parent_groups: OperationCounters,
    attributes: OperationCounters,
    member_counts: OperationCounters,
}

impl LookupMetrics {
    /// Current counter values
    pub fn snapshot(&self) -> LookupStats {
        LookupStats {
            parent_groups: self.parent_groups.snapshot(),
            attributes: self.attributes.snapshot(),
            member_counts: self.member_counts.snapshot(),
        }
    }
}

/// Provider decorator that records every call
pub struct MeteredDirectory<P> {
    inner: P,
    metrics: Arc<LookupMetrics>,
    parent_call_log: Mutex<Vec<Principal>>,
}

impl<P: DirectoryProvider> MeteredDirectory<P> {
    /// Wrap a provider
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            metrics: Arc::new(LookupMetrics::default()),
            parent_call_log: Mutex::new(Vec::new()),
        }
    }

    /// Handle to the counters, usable after the decorator is moved away
    pub fn metrics(&self) -> Arc<LookupMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Current counter values
    pub fn stats(&self) -> LookupStats {
        self.metrics.snapshot()
    }

    /// Principals passed to `direct_parent_groups`, in call order
    pub fn parent_call_log(&self) -> Vec<Principal> {
        self.parent_call_log.lock().clone()
    }

    /// The wrapped provider
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: DirectoryProvider> DirectoryProvider for MeteredDirectory<P> {
    async fn direct_parent_groups(&self, principal: &Principal) -> DirectoryResult<Vec<Principal>> {
        self.parent_call_log.lock().push(principal.clone());
        let outcome = self.inner.direct_parent_groups(principal).await;
        self.metrics.parent_groups.record(&outcome);
        outcome
    }

    async fn attributes(&self, principal: &Principal) -> DirectoryResult<PrincipalAttributes> {
        let outcome = self.inner.attributes(principal).await;
        self.metrics.attributes.record(&outcome);
        outcome
    }

    async fn member_count(&self, group: &Principal) -> DirectoryResult<u64> {
        let outcome = self.inner.member_count(group).await;
        self.metrics.member_counts.record(&outcome);
        outcome
    }
}
