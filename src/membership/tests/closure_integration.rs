//! Integration tests for membership closure against a snapshot directory
//!
//! Covers nested hierarchies with cycles, partial failures, memoized
//! providers shared across several resolutions, and concurrent callers.

use groupscope_membership::directory::{InMemoryDirectory, MemoizedDirectory, MeteredDirectory};
use groupscope_membership::resolver::{ClosureResolver, PruneReason, ResolverConfig};
use groupscope_membership::{MembershipError, Principal};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinSet;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/corp.json")
}

async fn corp_directory() -> InMemoryDirectory {
    InMemoryDirectory::from_snapshot_file(fixture()).await.unwrap()
}

#[tokio::test]
async fn test_closure_through_cycle_and_failure() {
    let resolver = ClosureResolver::new(corp_directory().await);
    let closure = resolver.closure(&Principal::new("alice")).await.unwrap();

    // engineering <-> all-staff is a cycle; remote-access is unavailable
    assert_eq!(
        closure.group_names(),
        vec!["all-staff", "developers", "engineering", "remote-access", "vpn-users"]
    );
    assert!(!closure.start_in_cycle);
    assert_eq!(closure.pruned.len(), 1);
    assert_eq!(closure.pruned[0].principal.as_str(), "remote-access");
    assert!(matches!(closure.pruned[0].reason, PruneReason::LookupFailed(_)));
}

#[tokio::test]
async fn test_group_inside_cycle_flags_itself() {
    let resolver = ClosureResolver::new(corp_directory().await);
    let closure = resolver.closure(&Principal::new("engineering")).await.unwrap();

    assert_eq!(closure.group_names(), vec!["all-staff"]);
    assert!(closure.start_in_cycle);
}

#[tokio::test]
async fn test_unknown_account() {
    let resolver = ClosureResolver::new(corp_directory().await);
    let err = resolver.closure(&Principal::new("zed")).await.unwrap_err();
    assert_eq!(err.to_string(), "Identity not found: zed");
}

#[tokio::test]
async fn test_memo_shared_across_batch() {
    let metered = Arc::new(MeteredDirectory::new(corp_directory().await));
    let memo = Arc::new(MemoizedDirectory::new(Arc::clone(&metered)));
    let resolver = ClosureResolver::with_config(
        Arc::clone(&memo),
        ResolverConfig { max_concurrent_lookups: 1 },
    );

    let outcomes = resolver
        .closure_batch(&[Principal::new("alice"), Principal::new("bob")])
        .await
        .unwrap();
    assert!(outcomes.iter().all(|o| o.is_resolved()));

    // Without the memo: alice 6 + bob 5 calls. Shared vertices
    // (developers, engineering, all-staff) are fetched once; the transient
    // failure on remote-access is never remembered.
    let calls = metered.stats().parent_groups.calls;
    assert!(calls < 11, "expected shared lookups to be memoized, got {}", calls);
    assert!(memo.stats().hits > 0);
}

#[tokio::test]
async fn test_concurrent_callers_share_one_resolver() {
    let resolver = Arc::new(ClosureResolver::new(corp_directory().await));
    let mut tasks = JoinSet::new();

    for _ in 0..16 {
        let resolver = Arc::clone(&resolver);
        tasks.spawn(async move { resolver.closure(&Principal::new("bob")).await });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        results.push(joined.unwrap().unwrap());
    }
    assert_eq!(results.len(), 16);
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(
        results[0].group_names(),
        vec!["all-staff", "dbas", "developers", "engineering"]
    );
}

#[tokio::test]
async fn test_blank_rejected() {
    let resolver = ClosureResolver::new(corp_directory().await);
    assert!(matches!(
        resolver.closure(&Principal::new("")).await,
        Err(MembershipError::InvalidInput(_))
    ));
}
