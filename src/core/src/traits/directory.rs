//! Directory provider contract

use crate::types::{Principal, PrincipalAttributes};
use crate::DirectoryResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Read-only access to a directory's one-hop membership relation
///
/// All operations are idempotent, side-effect-free reads. Implementations own
/// any retry policy; callers never retry on their own.
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    /// Groups the principal is a direct member of, in directory order
    ///
    /// Fails with `NotFound` when the principal does not exist and with
    /// `Lookup` on backend failure.
    async fn direct_parent_groups(&self, principal: &Principal) -> DirectoryResult<Vec<Principal>>;

    /// Descriptive attributes of a user or group
    async fn attributes(&self, principal: &Principal) -> DirectoryResult<PrincipalAttributes>;

    /// Number of direct members of a group
    ///
    /// One extra round-trip per group; only called when explicitly requested.
    async fn member_count(&self, group: &Principal) -> DirectoryResult<u64>;
}

#[async_trait]
impl<P: DirectoryProvider + ?Sized> DirectoryProvider for Arc<P> {
    async fn direct_parent_groups(&self, principal: &Principal) -> DirectoryResult<Vec<Principal>> {
        (**self).direct_parent_groups(principal).await
    }

    async fn attributes(&self, principal: &Principal) -> DirectoryResult<PrincipalAttributes> {
        (**self).attributes(principal).await
    }

    async fn member_count(&self, group: &Principal) -> DirectoryResult<u64> {
        (**self).member_count(group).await
    }
}
