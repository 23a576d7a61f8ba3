//! Scripted in-memory [`SteamApi`] for tests.
//!
//! Every call is counted per operation and per key, and each key can be
//! scripted to succeed, return no data, or fail. Unscripted profiles fail
//! with [`UpstreamError::ProfileNotFound`]; unscripted prices and achievement
//! lists succeed empty.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::UpstreamError;
use crate::types::{AccountId, FactKey, ItemId};
use crate::upstream::{AchievementRecord, OwnedItem, PriceOverview, SteamApi};

/// Number of upstream calls made, per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub profile: usize,
    pub owned_items: usize,
    pub price: usize,
    pub progress: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.profile + self.owned_items + self.price + self.progress
    }
}

#[derive(Default)]
struct Script {
    profiles: HashMap<AccountId, Result<String, UpstreamError>>,
    owned_items: HashMap<AccountId, Result<Vec<OwnedItem>, UpstreamError>>,
    prices: HashMap<ItemId, Result<Option<PriceOverview>, UpstreamError>>,
    progress: HashMap<FactKey, Result<Vec<AchievementRecord>, UpstreamError>>,
    calls: CallCounts,
    price_calls: HashMap<ItemId, usize>,
    progress_calls: HashMap<FactKey, usize>,
}

/// In-memory stand-in for the Steam Web API.
#[derive(Default)]
pub struct FakeSteamApi {
    script: Mutex<Script>,
    latency: Option<Duration>,
}

impl FakeSteamApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` (uses tokio time, so it is instant
    /// under a paused clock).
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Script a healthy account with the given persona name and games.
    pub fn with_account(self, account: AccountId, name: &str, items: Vec<OwnedItem>) -> Self {
        {
            let mut script = self.script();
            script.profiles.insert(account, Ok(name.to_string()));
            script.owned_items.insert(account, Ok(items));
        }
        self
    }

    pub fn with_price(self, item: ItemId, initial: i64, final_price: i64) -> Self {
        self.set_price(item, Some(PriceOverview { initial, final_price }));
        self
    }

    pub fn set_price(&self, item: ItemId, price: Option<PriceOverview>) {
        self.script().prices.insert(item, Ok(price));
    }

    pub fn fail_price(&self, item: ItemId, error: UpstreamError) {
        self.script().prices.insert(item, Err(error));
    }

    pub fn set_owned_items(&self, account: AccountId, items: Vec<OwnedItem>) {
        self.script().owned_items.insert(account, Ok(items));
    }

    pub fn fail_profile(&self, account: AccountId, error: UpstreamError) {
        self.script().profiles.insert(account, Err(error));
    }

    pub fn fail_owned_items(&self, account: AccountId, error: UpstreamError) {
        self.script().owned_items.insert(account, Err(error));
    }

    /// Restore a healthy profile after [`fail_profile`](Self::fail_profile).
    pub fn set_profile(&self, account: AccountId, name: &str) {
        self.script().profiles.insert(account, Ok(name.to_string()));
    }

    pub fn set_progress(&self, account: AccountId, item: ItemId, records: Vec<AchievementRecord>) {
        self.script().progress.insert((account, item), Ok(records));
    }

    pub fn fail_progress(&self, account: AccountId, item: ItemId, error: UpstreamError) {
        self.script().progress.insert((account, item), Err(error));
    }

    pub fn calls(&self) -> CallCounts {
        self.script().calls
    }

    pub fn price_calls(&self, item: ItemId) -> usize {
        self.script().price_calls.get(&item).copied().unwrap_or(0)
    }

    pub fn progress_calls(&self, account: AccountId, item: ItemId) -> usize {
        self.script()
            .progress_calls
            .get(&(account, item))
            .copied()
            .unwrap_or(0)
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl SteamApi for FakeSteamApi {
    async fn fetch_profile(&self, account: AccountId) -> Result<String, UpstreamError> {
        let result = {
            let mut script = self.script();
            script.calls.profile += 1;
            script
                .profiles
                .get(&account)
                .cloned()
                .unwrap_or(Err(UpstreamError::ProfileNotFound(account)))
        };
        self.delay().await;
        result
    }

    async fn fetch_owned_items(&self, account: AccountId) -> Result<Vec<OwnedItem>, UpstreamError> {
        let result = {
            let mut script = self.script();
            script.calls.owned_items += 1;
            script
                .owned_items
                .get(&account)
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        };
        self.delay().await;
        result
    }

    async fn fetch_item_price(&self, item: ItemId) -> Result<Option<PriceOverview>, UpstreamError> {
        let result = {
            let mut script = self.script();
            script.calls.price += 1;
            *script.price_calls.entry(item).or_default() += 1;
            script.prices.get(&item).cloned().unwrap_or(Ok(None))
        };
        self.delay().await;
        result
    }

    async fn fetch_item_progress(
        &self,
        account: AccountId,
        item: ItemId,
    ) -> Result<Vec<AchievementRecord>, UpstreamError> {
        let result = {
            let mut script = self.script();
            script.calls.progress += 1;
            *script.progress_calls.entry((account, item)).or_default() += 1;
            script
                .progress
                .get(&(account, item))
                .cloned()
                .unwrap_or_else(|| Ok(Vec::new()))
        };
        self.delay().await;
        result
    }
}
