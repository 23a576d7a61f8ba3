//! Boundary to the Steam Web API.
//!
//! The exporter only depends on the [`SteamApi`] trait; the `reqwest`
//! implementation lives in `steam-exporter-client` and tests use the
//! `FakeSteamApi` behind the `testing` feature.

use async_trait::async_trait;
use crate::error::UpstreamError;
use crate::types::{AccountId, ItemId};

/// One entry of an account's owned-games list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedItem {
    pub item_id: ItemId,
    pub name: String,
    /// Total playtime in minutes (`playtime_forever`).
    pub playtime_minutes: u64,
}

/// Store price of an app, in minor currency units (cents).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceOverview {
    pub initial: i64,
    pub final_price: i64,
}

/// A single achievement as reported for one player and one app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AchievementRecord {
    pub api_name: String,
    pub name: String,
    pub description: String,
    pub achieved: bool,
    /// Unix timestamp of the unlock, `0` when not achieved.
    pub unlock_time: u64,
}

/// The upstream calls the exporter needs.
///
/// Implementations perform exactly one request per call and never retry;
/// retry cadence is driven by cache TTLs.
#[async_trait]
pub trait SteamApi: Send + Sync {
    /// Resolve the persona name of an account.
    async fn fetch_profile(&self, account: AccountId) -> Result<String, UpstreamError>;

    /// List the games owned by an account, in upstream order.
    async fn fetch_owned_items(&self, account: AccountId) -> Result<Vec<OwnedItem>, UpstreamError>;

    /// Store price of an app. `Ok(None)` means the app has no listed price.
    async fn fetch_item_price(&self, item: ItemId) -> Result<Option<PriceOverview>, UpstreamError>;

    /// Achievement progress of an account in an app. An empty list means the
    /// app defines no achievements (or exposes no stats).
    async fn fetch_item_progress(
        &self,
        account: AccountId,
        item: ItemId,
    ) -> Result<Vec<AchievementRecord>, UpstreamError>;
}
