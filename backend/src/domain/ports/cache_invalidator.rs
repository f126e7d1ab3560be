//! Port through which Mutating Actions declare cached reads stale.

use crate::domain::CacheTag;

/// Invalidation handle.
///
/// Invalidation is idempotent and commutative, and cannot fail.
#[cfg_attr(test, mockall::automock)]
pub trait CacheInvalidator: Send + Sync {
    /// Mark every entry filed under any of `tags` as stale.
    fn invalidate(&self, tags: &[CacheTag]);
}

/// Invalidator that does nothing, for wiring without a cache.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpCacheInvalidator;

impl CacheInvalidator for NoOpCacheInvalidator {
    fn invalidate(&self, _tags: &[CacheTag]) {}
}
