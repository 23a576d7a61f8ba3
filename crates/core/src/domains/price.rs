use async_trait::async_trait;

use crate::collector::CollectorKind;
use crate::error::UpstreamError;
use crate::facts::{FactDomain, ItemLabels};
use crate::metric_names::{STEAM_GAME_PRICE_FINAL, STEAM_GAME_PRICE_INITIAL};
use crate::observation::ObservationSet;
use crate::refresh::Refreshed;
use crate::types::{AccountId, ItemId};
use crate::upstream::{PriceOverview, SteamApi};

/// Store price of a game in minor currency units. Zero means "unknown".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceFact {
    pub initial: f64,
    pub final_price: f64,
}

impl PriceFact {
    /// Keep each tier only when positive.
    ///
    /// Returns [`Refreshed::NoData`] when neither tier is usable.
    pub fn classify(overview: Option<PriceOverview>) -> Refreshed<PriceFact> {
        let Some(overview) = overview else {
            return Refreshed::NoData;
        };
        let fact = PriceFact {
            initial: positive(overview.initial),
            final_price: positive(overview.final_price),
        };
        if fact == PriceFact::default() {
            Refreshed::NoData
        } else {
            Refreshed::Usable(fact)
        }
    }
}

fn positive(cents: i64) -> f64 {
    if cents > 0 {
        cents as f64
    } else {
        0.0
    }
}

/// Initial and final store price per game.
///
/// Prices are per app, not per account, but are keyed by
/// `(account, app)` like every other fact so each account's games refresh
/// independently.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceDomain;

#[async_trait]
impl FactDomain for PriceDomain {
    type Value = PriceFact;

    fn kind(&self) -> CollectorKind {
        CollectorKind::Price
    }

    async fn fetch(
        &self,
        api: &dyn SteamApi,
        _account: AccountId,
        item: ItemId,
    ) -> Result<Refreshed<PriceFact>, UpstreamError> {
        let overview = api.fetch_item_price(item).await?;
        Ok(PriceFact::classify(overview))
    }

    fn observe(&self, labels: &ItemLabels<'_>, value: &PriceFact, feed: &mut ObservationSet) {
        feed.push(&STEAM_GAME_PRICE_INITIAL, labels.game(), value.initial);
        feed.push(&STEAM_GAME_PRICE_FINAL, labels.game(), value.final_price);
    }
}
