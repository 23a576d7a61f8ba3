//! Per-item fact caches, one per metric domain.
//!
//! A domain ([`FactDomain`]) supplies only its upstream call, its
//! usable/no-data classification and its labels. [`ItemFactCache`] wraps it
//! with an [`EntityCache`] keyed by `(account, item)` and the shared refresh
//! policy, and plugs into the emitter as a [`DomainCollector`].

use async_trait::async_trait;

use crate::account::AccountSnapshot;
use crate::cache::EntityCache;
use crate::collector::CollectorKind;
use crate::error::UpstreamError;
use crate::observation::ObservationSet;
use crate::refresh::{Ensured, EntrySource, Refreshed, RefreshOrchestrator, RefreshPolicy};
use crate::types::{AccountId, FactKey, ItemId};
use crate::upstream::{OwnedItem, SteamApi};

/// Label values common to every per-game sample of one account.
#[derive(Debug, Clone)]
pub struct ItemLabels<'a> {
    pub profile_name: &'a str,
    pub steam_id: String,
    pub item_name: &'a str,
    pub app_id: String,
}

impl<'a> ItemLabels<'a> {
    pub fn new(snapshot: &'a AccountSnapshot, item: &'a OwnedItem) -> Self {
        Self {
            profile_name: &snapshot.display_name,
            steam_id: snapshot.account_id.to_string(),
            item_name: &item.name,
            app_id: item.item_id.to_string(),
        }
    }

    /// Values for [`GAME_LABELS`](crate::metric_names::GAME_LABELS).
    pub fn game(&self) -> Vec<String> {
        vec![
            self.profile_name.to_string(),
            self.steam_id.clone(),
            self.item_name.to_string(),
            self.app_id.clone(),
        ]
    }
}

/// A metric domain that needs one upstream call per `(account, item)`.
#[async_trait]
pub trait FactDomain: Send + Sync {
    /// The cached fact. `Default` is the zero value emitted when the item
    /// has no data or the upstream call failed.
    type Value: Clone + Default + Send + Sync + 'static;

    fn kind(&self) -> CollectorKind;

    /// Perform the upstream call and classify its result.
    async fn fetch(
        &self,
        api: &dyn SteamApi,
        account: AccountId,
        item: ItemId,
    ) -> Result<Refreshed<Self::Value>, UpstreamError>;

    /// Record the samples for one item.
    fn observe(&self, labels: &ItemLabels<'_>, value: &Self::Value, feed: &mut ObservationSet);
}

/// One metric domain as seen by the emitter.
#[async_trait]
pub trait DomainCollector: Send + Sync {
    fn kind(&self) -> CollectorKind;

    /// Make sure the item's fact is fresh enough and record its samples.
    async fn collect(
        &self,
        api: &dyn SteamApi,
        snapshot: &AccountSnapshot,
        item: &OwnedItem,
        feed: &mut ObservationSet,
    );

    /// Number of cached entries, for health reporting.
    async fn entry_count(&self) -> usize {
        0
    }
}

/// Cache of one domain's facts keyed by `(account, item)`.
///
/// Failures never reach the emitter: they degrade to the zero value and are
/// retried after the retry TTL.
pub struct ItemFactCache<D: FactDomain> {
    domain: D,
    entries: EntityCache<FactKey, D::Value>,
    policy: RefreshPolicy,
    orchestrator: RefreshOrchestrator,
}

impl<D: FactDomain> ItemFactCache<D> {
    pub fn new(domain: D, orchestrator: RefreshOrchestrator, policy: RefreshPolicy) -> Self {
        let entries = EntityCache::new(domain.kind().as_str());
        Self {
            domain,
            entries,
            policy,
            orchestrator,
        }
    }

    /// Return the item's fact, fetching it if absent or stale.
    pub async fn ensure(
        &self,
        api: &dyn SteamApi,
        account: AccountId,
        item: ItemId,
    ) -> Ensured<D::Value> {
        let key = (account, item);
        let result = self
            .orchestrator
            .ensure(&self.entries, &key, &self.policy, || {
                self.domain.fetch(api, account, item)
            })
            .await;

        match result {
            Ok(ensured) => ensured,
            // Only reachable if the policy was built to surface failures.
            Err(e) => {
                tracing::warn!(
                    collector = %self.domain.kind(),
                    steam_id = account,
                    app_id = item,
                    error = %e,
                    "Fact unavailable, emitting zero",
                );
                Ensured {
                    value: D::Value::default(),
                    source: EntrySource::Degraded,
                }
            }
        }
    }
}

#[async_trait]
impl<D> DomainCollector for ItemFactCache<D>
where
    D: FactDomain + 'static,
{
    fn kind(&self) -> CollectorKind {
        self.domain.kind()
    }

    async fn collect(
        &self,
        api: &dyn SteamApi,
        snapshot: &AccountSnapshot,
        item: &OwnedItem,
        feed: &mut ObservationSet,
    ) {
        let fact = self.ensure(api, snapshot.account_id, item.item_id).await;
        let labels = ItemLabels::new(snapshot, item);
        self.domain.observe(&labels, &fact.value, feed);
    }

    async fn entry_count(&self) -> usize {
        self.entries.entry_count().await
    }
}
