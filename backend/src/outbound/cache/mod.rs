//! In-process tag cache backing the storefront's read-through Fetchers.
//!
//! Each tag carries a generation counter. An entry remembers the generations
//! of its tags at the moment its read was *started*; it is fresh only while
//! all of them are unchanged. Invalidation bumps counters and never touches
//! entries directly, which makes it idempotent and commutative. Stale
//! entries are dropped lazily on lookup; moka bounds the entry count.

use dashmap::DashMap;
use moka::sync::Cache;
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{CacheInvalidator, FillTicket, ResultCache};
use crate::domain::{CacheKey, CacheTag, NormalizedResponse};

#[derive(Debug, Clone)]
struct Entry {
    response: NormalizedResponse<Value>,
    ticket: FillTicket,
}

/// Bounded, process-wide tag cache.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use storefront::domain::ports::{CacheInvalidator, ResultCache};
/// use storefront::domain::{tags, CacheKey, NormalizedResponse, Session};
/// use storefront::outbound::cache::InMemoryTagCache;
///
/// let cache = InMemoryTagCache::new(8);
/// let key = CacheKey::for_read(&Session::anonymous(), "http://api/cart");
/// let ticket = cache.snapshot(&[tags::GET_CART]);
/// cache.put(key.clone(), ticket, NormalizedResponse::success(200, json!([])));
/// assert!(cache.get(&key).is_some());
///
/// cache.invalidate(&[tags::GET_CART]);
/// assert!(cache.get(&key).is_none());
/// ```
#[derive(Debug)]
pub struct InMemoryTagCache {
    enabled: bool,
    generations: DashMap<CacheTag, u64>,
    entries: Cache<CacheKey, Entry>,
}

impl InMemoryTagCache {
    /// Cache holding at most `capacity` entries. Zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            enabled: capacity > 0,
            generations: DashMap::new(),
            entries: Cache::builder()
                .max_capacity(u64::try_from(capacity).unwrap_or(u64::MAX))
                .build(),
        }
    }

    /// Number of stored entries, fresh or not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.run_pending_tasks();
        usize::try_from(self.entries.entry_count()).unwrap_or(usize::MAX)
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn generation(&self, tag: &CacheTag) -> u64 {
        self.generations.get(tag).map_or(0, |generation| *generation)
    }

    fn is_current(&self, ticket: &FillTicket) -> bool {
        ticket
            .generations()
            .iter()
            .all(|(tag, generation)| self.generation(tag) == *generation)
    }
}

impl ResultCache for InMemoryTagCache {
    fn get(&self, key: &CacheKey) -> Option<NormalizedResponse<Value>> {
        let entry = self.entries.get(key)?;
        if self.is_current(&entry.ticket) {
            return Some(entry.response);
        }
        self.entries.invalidate(key);
        None
    }

    fn snapshot(&self, tags: &[CacheTag]) -> FillTicket {
        FillTicket::new(
            tags.iter()
                .map(|tag| (tag.clone(), self.generation(tag)))
                .collect(),
        )
    }

    // An invalidation landing between the check and the insert leaves an
    // entry whose ticket is already outdated; `get` treats it as stale.
    fn put(&self, key: CacheKey, ticket: FillTicket, response: NormalizedResponse<Value>) {
        if !self.enabled {
            return;
        }
        if !self.is_current(&ticket) {
            debug!(key = key.as_str(), "discarding fill invalidated while in flight");
            return;
        }
        self.entries.insert(key, Entry { response, ticket });
    }
}

impl CacheInvalidator for InMemoryTagCache {
    fn invalidate(&self, tags: &[CacheTag]) {
        for tag in tags {
            let mut generation = self.generations.entry(tag.clone()).or_insert(0);
            *generation = generation.wrapping_add(1);
        }
    }
}
