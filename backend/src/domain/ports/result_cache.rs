//! Port for the read-through cache that backs Fetchers.
//!
//! Fills are two-phase. A fetcher takes a [`FillTicket`] *before* calling the
//! backend and hands it back with the result. The cache rejects the fill if
//! any tag on the ticket was invalidated in between, so a read racing with a
//! mutation can never resurrect pre-mutation state.

use serde_json::Value;

use crate::domain::{CacheKey, CacheTag, NormalizedResponse};

/// Generation snapshot of the tags a read will be filed under.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FillTicket {
    generations: Vec<(CacheTag, u64)>,
}

impl FillTicket {
    /// Ticket from tag/generation pairs.
    pub fn new(generations: Vec<(CacheTag, u64)>) -> Self {
        Self { generations }
    }

    /// Tag generations observed when the ticket was issued.
    pub fn generations(&self) -> &[(CacheTag, u64)] {
        &self.generations
    }

    /// Tags covered by the ticket.
    pub fn tags(&self) -> impl Iterator<Item = &CacheTag> {
        self.generations.iter().map(|(tag, _)| tag)
    }
}

/// Cache of successful backend reads.
#[cfg_attr(test, mockall::automock)]
pub trait ResultCache: Send + Sync {
    /// Return a fresh cached response for `key`, if any.
    fn get(&self, key: &CacheKey) -> Option<NormalizedResponse<Value>>;

    /// Record the current generation of each tag.
    fn snapshot(&self, tags: &[CacheTag]) -> FillTicket;

    /// Store `response` under `key` unless a ticket tag moved on since
    /// [`ResultCache::snapshot`].
    fn put(&self, key: CacheKey, ticket: FillTicket, response: NormalizedResponse<Value>);
}
