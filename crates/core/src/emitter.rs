//! Walks tracked accounts and their games and records one scrape's
//! observations.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::account::AccountSnapshotCache;
use crate::collector::CollectorKind;
use crate::domains::{AchievementsDomain, PlaytimeDomain, PriceDomain};
use crate::facts::{DomainCollector, ItemFactCache};
use crate::observation::ObservationSet;
use crate::refresh::{RefreshOrchestrator, RefreshPolicy, DEFAULT_FRESH_TTL, DEFAULT_RETRY_TTL};
use crate::types::AccountId;
use crate::upstream::SteamApi;

/// Everything needed to build a [`MetricEmitter`].
#[derive(Debug, Clone)]
pub struct EmitterSettings {
    /// Tracked accounts, in emission order. Fixed for the process lifetime.
    pub accounts: Vec<AccountId>,
    /// Active collectors. Non-domain collectors (`process`) are ignored here.
    pub collectors: Vec<CollectorKind>,
    /// TTL after a successful fetch, for snapshots and facts alike.
    pub fresh_ttl: Duration,
    /// TTL after a failed per-item fetch.
    pub retry_ttl: Duration,
    /// Upper bound on a single upstream call.
    pub upstream_timeout: Option<Duration>,
}

impl EmitterSettings {
    pub fn new(accounts: Vec<AccountId>, collectors: Vec<CollectorKind>) -> Self {
        Self {
            accounts,
            collectors,
            fresh_ttl: DEFAULT_FRESH_TTL,
            retry_ttl: DEFAULT_RETRY_TTL,
            upstream_timeout: None,
        }
    }
}

/// Counters describing one emitter pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub accounts_emitted: usize,
    pub accounts_skipped: usize,
    pub observations: usize,
}

/// Entry counts of every cache, for health reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub accounts: usize,
    pub facts: Vec<(CollectorKind, usize)>,
}

/// Turns cache state into observations, refreshing whatever is stale on the
/// way.
///
/// Accounts, games and domains are visited sequentially in a fixed order;
/// upstream calls are only made for stale entries.
pub struct MetricEmitter {
    api: Arc<dyn SteamApi>,
    accounts: Vec<AccountId>,
    snapshots: AccountSnapshotCache,
    domains: Vec<Box<dyn DomainCollector>>,
}

impl MetricEmitter {
    pub fn new(api: Arc<dyn SteamApi>, settings: &EmitterSettings) -> Self {
        let orchestrator = RefreshOrchestrator::new(settings.upstream_timeout);
        let facts = RefreshPolicy::item_facts(settings.fresh_ttl, settings.retry_ttl);
        let enabled = |kind| settings.collectors.contains(&kind);

        let mut domains: Vec<Box<dyn DomainCollector>> = Vec::new();
        if enabled(CollectorKind::Playtime) {
            domains.push(Box::new(PlaytimeDomain));
        }
        if enabled(CollectorKind::Price) {
            domains.push(Box::new(ItemFactCache::new(PriceDomain, orchestrator, facts)));
        }
        if enabled(CollectorKind::Achievements) {
            domains.push(Box::new(ItemFactCache::new(
                AchievementsDomain,
                orchestrator,
                facts,
            )));
        }

        Self {
            api,
            accounts: settings.accounts.clone(),
            snapshots: AccountSnapshotCache::new(orchestrator, settings.fresh_ttl),
            domains,
        }
    }

    pub fn accounts(&self) -> &[AccountId] {
        &self.accounts
    }

    /// Active domains in emission order.
    pub fn domains(&self) -> Vec<CollectorKind> {
        self.domains.iter().map(|d| d.kind()).collect()
    }

    /// Run one full pass and return its observations.
    pub async fn scrape(&self) -> (ObservationSet, ScrapeSummary) {
        let mut feed = ObservationSet::new();
        let summary = self.emit_into(&mut feed).await;
        (feed, summary)
    }

    /// Run one full pass, appending observations to `feed`.
    ///
    /// An account whose snapshot cannot be obtained contributes nothing to
    /// this pass; every other account is unaffected.
    pub async fn emit_into(&self, feed: &mut ObservationSet) -> ScrapeSummary {
        let started = Instant::now();
        let before = feed.len();
        let mut summary = ScrapeSummary::default();

        for &account in &self.accounts {
            let snapshot = match self.snapshots.ensure(self.api.as_ref(), account).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(
                        steam_id = account,
                        error = %e,
                        "Account unavailable, skipping for this scrape",
                    );
                    summary.accounts_skipped += 1;
                    continue;
                }
            };

            for item in &snapshot.owned_items {
                for domain in &self.domains {
                    domain
                        .collect(self.api.as_ref(), &snapshot, item, feed)
                        .await;
                }
            }
            summary.accounts_emitted += 1;
        }

        summary.observations = feed.len() - before;
        tracing::info!(
            accounts_emitted = summary.accounts_emitted,
            accounts_skipped = summary.accounts_skipped,
            observations = summary.observations,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scrape complete",
        );
        summary
    }

    pub async fn cache_stats(&self) -> CacheStats {
        let mut facts = Vec::with_capacity(self.domains.len());
        for domain in &self.domains {
            facts.push((domain.kind(), domain.entry_count().await));
        }
        CacheStats {
            accounts: self.snapshots.entry_count().await,
            facts,
        }
    }
}
