//! Per-account profile and owned-games cache.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::EntityCache;
use crate::error::UpstreamError;
use crate::refresh::{EntrySource, Refreshed, RefreshOrchestrator, RefreshPolicy};
use crate::types::AccountId;
use crate::upstream::{OwnedItem, SteamApi};

/// Everything the emitter needs to know about one account.
///
/// Refreshed as a whole: the owned-games list is replaced, never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub account_id: AccountId,
    /// Persona name. A label only, never part of any cache key.
    pub display_name: String,
    pub owned_items: Vec<OwnedItem>,
}

/// TTL-gated cache of [`AccountSnapshot`]s, one per tracked account.
///
/// Unlike item facts, a failed refresh is not papered over with an empty
/// snapshot: the error is surfaced so the emitter skips the account for the
/// current scrape, and the next scrape retries.
pub struct AccountSnapshotCache {
    entries: EntityCache<AccountId, Arc<AccountSnapshot>>,
    policy: RefreshPolicy,
    orchestrator: RefreshOrchestrator,
}

impl AccountSnapshotCache {
    pub fn new(orchestrator: RefreshOrchestrator, ttl: Duration) -> Self {
        Self {
            entries: EntityCache::new("account"),
            policy: RefreshPolicy::account_snapshots(ttl),
            orchestrator,
        }
    }

    /// Return a snapshot of `account` no older than the cache TTL, fetching
    /// profile and owned games if needed.
    pub async fn ensure(
        &self,
        api: &dyn SteamApi,
        account: AccountId,
    ) -> Result<Arc<AccountSnapshot>, UpstreamError> {
        let ensured = self
            .orchestrator
            .ensure(&self.entries, &account, &self.policy, || async move {
                fetch_snapshot(api, account)
                    .await
                    .map(|snapshot| Refreshed::Usable(Arc::new(snapshot)))
            })
            .await?;

        if ensured.source == EntrySource::Fetched {
            tracing::info!(
                steam_id = account,
                profile = %ensured.value.display_name,
                games = ensured.value.owned_items.len(),
                "Account snapshot refreshed",
            );
        }
        Ok(ensured.value)
    }

    /// Number of accounts with a stored snapshot.
    pub async fn entry_count(&self) -> usize {
        self.entries.entry_count().await
    }
}

/// Profile first, then owned games; either failing fails the snapshot.
async fn fetch_snapshot(
    api: &dyn SteamApi,
    account: AccountId,
) -> Result<AccountSnapshot, UpstreamError> {
    let display_name = api.fetch_profile(account).await.map_err(|e| {
        tracing::warn!(steam_id = account, error = %e, "Error retrieving player summary");
        e
    })?;

    let owned_items = api.fetch_owned_items(account).await.map_err(|e| {
        tracing::warn!(steam_id = account, error = %e, "Error retrieving owned games");
        e
    })?;

    Ok(AccountSnapshot {
        account_id: account,
        display_name,
        owned_items,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::refresh::DEFAULT_FRESH_TTL;
    use crate::testing::FakeSteamApi;

    fn game(id: u32, name: &str, minutes: u64) -> OwnedItem {
        OwnedItem {
            item_id: id,
            name: name.to_string(),
            playtime_minutes: minutes,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_is_cached_for_ttl() {
        let api = FakeSteamApi::new().with_account(1, "alice", vec![game(10, "Portal", 90)]);
        let cache = AccountSnapshotCache::new(RefreshOrchestrator::default(), DEFAULT_FRESH_TTL);

        let first = cache.ensure(&api, 1).await.unwrap();
        assert_eq!(first.display_name, "alice");
        assert_eq!(first.owned_items, vec![game(10, "Portal", 90)]);

        tokio::time::advance(DEFAULT_FRESH_TTL - Duration::from_secs(60)).await;
        cache.ensure(&api, 1).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls.profile, 1);
        assert_eq!(calls.owned_items, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_replaces_owned_items() {
        let api = FakeSteamApi::new().with_account(1, "alice", vec![game(10, "Portal", 90)]);
        let cache = AccountSnapshotCache::new(RefreshOrchestrator::default(), DEFAULT_FRESH_TTL);
        cache.ensure(&api, 1).await.unwrap();

        api.set_owned_items(1, vec![game(20, "Portal 2", 5)]);
        tokio::time::advance(DEFAULT_FRESH_TTL).await;

        let refreshed = cache.ensure(&api, 1).await.unwrap();
        assert_eq!(refreshed.owned_items, vec![game(20, "Portal 2", 5)]);
    }

    #[tokio::test(start_paused = true)]
    async fn owned_games_failure_surfaces_and_caches_nothing() {
        let api = FakeSteamApi::new().with_account(1, "alice", vec![]);
        api.fail_owned_items(1, UpstreamError::Status { status: 500, body: "oops".into() });
        let cache = AccountSnapshotCache::new(RefreshOrchestrator::default(), DEFAULT_FRESH_TTL);

        let err = cache.ensure(&api, 1).await;
        assert_matches!(err, Err(UpstreamError::Status { status: 500, .. }));
        assert_eq!(cache.entry_count().await, 0);

        // No backoff: the next attempt goes straight upstream.
        cache.ensure(&api, 1).await.unwrap_err();
        assert_eq!(api.calls().profile, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn refreshing_one_account_keeps_the_other() {
        let api = FakeSteamApi::new()
            .with_account(1, "alice", vec![game(10, "Portal", 1)])
            .with_account(2, "bob", vec![game(20, "Dota 2", 2)]);
        let cache = AccountSnapshotCache::new(RefreshOrchestrator::default(), DEFAULT_FRESH_TTL);

        cache.ensure(&api, 1).await.unwrap();
        cache.ensure(&api, 2).await.unwrap();

        assert_eq!(cache.entry_count().await, 2);
        cache.ensure(&api, 1).await.unwrap();
        assert_eq!(api.calls().profile, 2, "alice must still be cached");
    }
}
