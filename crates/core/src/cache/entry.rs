use std::time::Duration;

use tokio::time::Instant;

/// A cached value together with when it was written and how long it stays
/// fresh.
///
/// The TTL is chosen per write from the outcome of the fetch, so two
/// entries of the same cache can carry different TTLs.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: Instant,
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, fetched_at: Instant, ttl: Duration) -> Self {
        Self {
            value,
            fetched_at,
            ttl,
        }
    }

    /// Time elapsed since the entry was written.
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    /// `true` while `now - fetched_at < ttl`.
    pub fn is_fresh(&self, now: Instant) -> bool {
        self.age(now) < self.ttl
    }

    /// Time left before the entry goes stale, zero once it is stale.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.ttl.saturating_sub(self.age(now))
    }
}
