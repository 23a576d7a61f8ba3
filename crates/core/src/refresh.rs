//! The cache-or-fetch decision shared by every cache.
//!
//! [`RefreshOrchestrator::ensure`] is the only code path that writes cache
//! entries. It serves a fresh entry untouched, otherwise performs exactly one
//! upstream call and replaces the whole entry with a TTL picked from the
//! outcome:
//!
//! | outcome                  | stored value | TTL                          |
//! |--------------------------|--------------|------------------------------|
//! | usable data              | parsed value | [`RefreshPolicy::fresh_ttl`] |
//! | success, no data         | zero value   | [`RefreshPolicy::fresh_ttl`] |
//! | failure, degrade mode    | zero value   | [`RefreshPolicy::retry_ttl`] |
//! | failure, surface mode    | *unchanged*  | -- (error returned)          |

use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEntry, EntityCache};
use crate::error::UpstreamError;

/// Default TTL after a successful fetch.
pub const DEFAULT_FRESH_TTL: Duration = Duration::from_secs(24 * 3600);

/// Default TTL after a failed fetch.
pub const DEFAULT_RETRY_TTL: Duration = Duration::from_secs(3600);

/// Result of a successful upstream call, as classified by the domain.
#[derive(Debug, Clone, PartialEq)]
pub enum Refreshed<T> {
    /// The call returned data worth caching.
    Usable(T),
    /// The call succeeded but the field was absent or non-positive. This is a
    /// stable fact about the entity, cached as the zero value with the long
    /// TTL.
    NoData,
}

/// What to do when the upstream call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Store the zero value with the retry TTL and return it.
    DegradeToZero,
    /// Leave the cache untouched and hand the error to the caller.
    Surface,
}

/// TTL and failure handling of one cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub fresh_ttl: Duration,
    pub retry_ttl: Duration,
    pub on_failure: FailureMode,
}

impl RefreshPolicy {
    /// Policy for per-item facts: failures degrade to zero and are retried
    /// after `retry_ttl`.
    pub fn item_facts(fresh_ttl: Duration, retry_ttl: Duration) -> Self {
        Self {
            fresh_ttl,
            retry_ttl,
            on_failure: FailureMode::DegradeToZero,
        }
    }

    /// Policy for account snapshots: failures are surfaced and nothing is
    /// written, so the next scrape retries immediately.
    pub fn account_snapshots(fresh_ttl: Duration) -> Self {
        Self {
            fresh_ttl,
            retry_ttl: Duration::ZERO,
            on_failure: FailureMode::Surface,
        }
    }
}

/// Where the value returned by [`RefreshOrchestrator::ensure`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntrySource {
    /// Served from a fresh entry, no upstream call.
    Cached,
    /// Fetched now, usable data.
    Fetched,
    /// Fetched now, no data; zero value stored with the long TTL.
    NoData,
    /// Fetch failed; zero value stored with the retry TTL.
    Degraded,
}

/// A value guaranteed fresh enough for the current scrape.
#[derive(Debug, Clone, PartialEq)]
pub struct Ensured<T> {
    pub value: T,
    pub source: EntrySource,
}

/// Decides, per key, between serving the cache and calling upstream.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshOrchestrator {
    /// Upper bound on a single upstream call. Exceeding it counts as an
    /// upstream failure.
    upstream_timeout: Option<Duration>,
}

impl RefreshOrchestrator {
    pub fn new(upstream_timeout: Option<Duration>) -> Self {
        Self { upstream_timeout }
    }

    /// Guarantee a fresh-enough value for `key`.
    ///
    /// The key's slot stays locked from the freshness check until the new
    /// entry is written, so concurrent callers for the same key wait for the
    /// first one and then see its result as a cache hit.
    ///
    /// Returns `Err` only when `policy.on_failure` is
    /// [`FailureMode::Surface`] and the fetch failed.
    pub async fn ensure<K, T, F, Fut>(
        &self,
        cache: &EntityCache<K, T>,
        key: &K,
        policy: &RefreshPolicy,
        fetch: F,
    ) -> Result<Ensured<T>, UpstreamError>
    where
        K: Eq + Hash + Clone + Debug,
        T: Clone + Default,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Refreshed<T>, UpstreamError>>,
    {
        let slot = cache.slot(key).await;
        let mut entry = slot.lock().await;

        if let Some(current) = entry.as_ref() {
            let now = Instant::now();
            if current.is_fresh(now) {
                tracing::debug!(
                    cache = cache.name(),
                    ?key,
                    remaining_mins = current.remaining(now).as_secs() / 60,
                    "Cache still valid",
                );
                return Ok(Ensured {
                    value: current.value.clone(),
                    source: EntrySource::Cached,
                });
            }
        }

        let outcome = self.call(fetch).await;
        let written_at = Instant::now();

        let (value, ttl, source) = match outcome {
            Ok(Refreshed::Usable(value)) => (value, policy.fresh_ttl, EntrySource::Fetched),
            Ok(Refreshed::NoData) => {
                tracing::info!(
                    cache = cache.name(),
                    ?key,
                    "No usable data upstream, caching zero value",
                );
                (T::default(), policy.fresh_ttl, EntrySource::NoData)
            }
            Err(e) => match policy.on_failure {
                FailureMode::DegradeToZero => {
                    tracing::warn!(
                        cache = cache.name(),
                        ?key,
                        error = %e,
                        retry_in_secs = policy.retry_ttl.as_secs(),
                        "Upstream call failed, degrading to zero",
                    );
                    (T::default(), policy.retry_ttl, EntrySource::Degraded)
                }
                FailureMode::Surface => return Err(e),
            },
        };

        *entry = Some(CacheEntry::new(value.clone(), written_at, ttl));
        Ok(Ensured { value, source })
    }

    /// Run the fetch under the configured timeout.
    async fn call<T, F, Fut>(&self, fetch: F) -> Result<Refreshed<T>, UpstreamError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Refreshed<T>, UpstreamError>>,
    {
        match self.upstream_timeout {
            Some(limit) => match tokio::time::timeout(limit, fetch()).await {
                Ok(result) => result,
                Err(_) => Err(UpstreamError::Timeout(limit)),
            },
            None => fetch().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use assert_matches::assert_matches;

    use super::*;

    const DAY: Duration = DEFAULT_FRESH_TTL;
    const HOUR: Duration = DEFAULT_RETRY_TTL;

    fn items() -> RefreshPolicy {
        RefreshPolicy::item_facts(DAY, HOUR)
    }

    /// Ensure `key` with a fetch that bumps `calls` and returns `result`.
    async fn ensure_counting(
        orchestrator: &RefreshOrchestrator,
        cache: &EntityCache<u32, f64>,
        key: u32,
        policy: &RefreshPolicy,
        calls: &AtomicUsize,
        result: Result<Refreshed<f64>, UpstreamError>,
    ) -> Result<Ensured<f64>, UpstreamError> {
        orchestrator
            .ensure(cache, &key, policy, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                result
            })
            .await
    }

    fn usable(value: f64) -> Result<Refreshed<f64>, UpstreamError> {
        Ok(Refreshed::Usable(value))
    }

    fn no_data() -> Result<Refreshed<f64>, UpstreamError> {
        Ok(Refreshed::NoData)
    }

    fn failure() -> Result<Refreshed<f64>, UpstreamError> {
        Err(UpstreamError::Transport("connection reset".into()))
    }

    // -----------------------------------------------------------------------
    // Test: first access fetches once, later accesses hit the cache
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn first_access_fetches_then_serves_cache() {
        let orchestrator = RefreshOrchestrator::default();
        let cache = EntityCache::new("test");
        let calls = AtomicUsize::new(0);

        let first = ensure_counting(&orchestrator, &cache, 1, &items(), &calls, usable(7.0))
            .await
            .unwrap();
        assert_eq!(first, Ensured { value: 7.0, source: EntrySource::Fetched });

        for _ in 0..5 {
            tokio::time::advance(Duration::from_secs(600)).await;
            let again = ensure_counting(&orchestrator, &cache, 1, &items(), &calls, usable(99.0))
                .await
                .unwrap();
            assert_eq!(again, Ensured { value: 7.0, source: EntrySource::Cached });
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    // -----------------------------------------------------------------------
    // Test: failure degrades to zero and is retried after the retry TTL
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn failure_is_retried_after_retry_ttl() {
        let orchestrator = RefreshOrchestrator::default();
        let cache = EntityCache::new("test");
        let calls = AtomicUsize::new(0);

        let degraded = ensure_counting(&orchestrator, &cache, 1, &items(), &calls, failure())
            .await
            .unwrap();
        assert_eq!(degraded, Ensured { value: 0.0, source: EntrySource::Degraded });
        assert_eq!(cache.peek(&1).await.map(|e| e.ttl), Some(HOUR));

        tokio::time::advance(HOUR - Duration::from_secs(1)).await;
        let within = ensure_counting(&orchestrator, &cache, 1, &items(), &calls, usable(5.0))
            .await
            .unwrap();
        assert_eq!(within, Ensured { value: 0.0, source: EntrySource::Cached });
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        let healed = ensure_counting(&orchestrator, &cache, 1, &items(), &calls, usable(5.0))
            .await
            .unwrap();
        assert_eq!(healed, Ensured { value: 5.0, source: EntrySource::Fetched });
        assert_eq!(cache.peek(&1).await.map(|e| e.ttl), Some(DAY));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    // -----------------------------------------------------------------------
    // Test: success without data is cached for the long TTL
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn no_data_uses_long_ttl() {
        let orchestrator = RefreshOrchestrator::default();
        let cache = EntityCache::new("test");
        let calls = AtomicUsize::new(0);

        let empty = ensure_counting(&orchestrator, &cache, 1, &items(), &calls, no_data())
            .await
            .unwrap();
        assert_eq!(empty, Ensured { value: 0.0, source: EntrySource::NoData });
        assert_eq!(cache.peek(&1).await.map(|e| e.ttl), Some(DAY));

        tokio::time::advance(HOUR * 2).await;
        ensure_counting(&orchestrator, &cache, 1, &items(), &calls, failure())
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1, "no-data entry must not be retried hourly");
    }

    // -----------------------------------------------------------------------
    // Test: a healthy key is not refetched because a sibling failed
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn sibling_failure_does_not_touch_healthy_key() {
        let orchestrator = RefreshOrchestrator::default();
        let cache = EntityCache::new("test");
        let healthy = AtomicUsize::new(0);
        let failing = AtomicUsize::new(0);

        ensure_counting(&orchestrator, &cache, 1, &items(), &healthy, usable(3.0))
            .await
            .unwrap();

        for _ in 0..5 {
            ensure_counting(&orchestrator, &cache, 2, &items(), &failing, failure())
                .await
                .unwrap();
            let hit = ensure_counting(&orchestrator, &cache, 1, &items(), &healthy, failure())
                .await
                .unwrap();
            assert_eq!(hit.value, 3.0);
            tokio::time::advance(HOUR).await;
        }

        assert_eq!(healthy.load(Ordering::SeqCst), 1);
        assert_eq!(failing.load(Ordering::SeqCst), 5);
    }

    // -----------------------------------------------------------------------
    // Test: surface mode returns the error and writes nothing
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn surface_mode_leaves_cache_untouched() {
        let orchestrator = RefreshOrchestrator::default();
        let cache = EntityCache::new("test");
        let calls = AtomicUsize::new(0);
        let policy = RefreshPolicy::account_snapshots(DAY);

        let err = ensure_counting(&orchestrator, &cache, 1, &policy, &calls, failure()).await;
        assert_matches!(err, Err(UpstreamError::Transport(_)));
        assert!(cache.peek(&1).await.is_none());

        // Nothing was cached, so the very next call goes upstream again.
        let ok = ensure_counting(&orchestrator, &cache, 1, &policy, &calls, usable(1.0))
            .await
            .unwrap();
        assert_eq!(ok.source, EntrySource::Fetched);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn surface_mode_keeps_stale_entry_but_does_not_serve_it() {
        let orchestrator = RefreshOrchestrator::default();
        let cache = EntityCache::new("test");
        let calls = AtomicUsize::new(0);
        let policy = RefreshPolicy::account_snapshots(DAY);

        ensure_counting(&orchestrator, &cache, 1, &policy, &calls, usable(4.0))
            .await
            .unwrap();
        tokio::time::advance(DAY).await;

        let err = ensure_counting(&orchestrator, &cache, 1, &policy, &calls, failure()).await;
        assert!(err.is_err());
        assert_eq!(cache.peek(&1).await.map(|e| e.value), Some(4.0));
    }

    // -----------------------------------------------------------------------
    // Test: a hung fetch is cut off by the upstream timeout
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn timeout_counts_as_failure() {
        let orchestrator = RefreshOrchestrator::new(Some(Duration::from_secs(5)));
        let cache: EntityCache<u32, f64> = EntityCache::new("test");

        let result = orchestrator
            .ensure(&cache, &1, &items(), || async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(Refreshed::Usable(1.0))
            })
            .await
            .unwrap();

        assert_eq!(result.source, EntrySource::Degraded);
        assert_eq!(cache.peek(&1).await.map(|e| e.ttl), Some(HOUR));
    }

    // -----------------------------------------------------------------------
    // Test: concurrent callers for one stale key share a single fetch
    // -----------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_fetch() {
        let orchestrator = RefreshOrchestrator::default();
        let cache: Arc<EntityCache<u32, f64>> = Arc::new(EntityCache::new("test"));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                orchestrator
                    .ensure(&*cache, &9, &items(), || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_secs(2)).await;
                        Ok(Refreshed::Usable(8.0))
                    })
                    .await
                    .unwrap()
                    .value
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 8.0);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
