use async_trait::async_trait;

use crate::account::AccountSnapshot;
use crate::collector::CollectorKind;
use crate::facts::{DomainCollector, ItemLabels};
use crate::metric_names::STEAM_PLAYTIME;
use crate::observation::ObservationSet;
use crate::upstream::{OwnedItem, SteamApi};

/// Minutes played per game.
///
/// The value is part of the owned-games list, so there is no per-item call,
/// no cache of its own and no failure tier: it is exactly as fresh as the
/// account snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaytimeDomain;

#[async_trait]
impl DomainCollector for PlaytimeDomain {
    fn kind(&self) -> CollectorKind {
        CollectorKind::Playtime
    }

    async fn collect(
        &self,
        _api: &dyn SteamApi,
        snapshot: &AccountSnapshot,
        item: &OwnedItem,
        feed: &mut ObservationSet,
    ) {
        let labels = ItemLabels::new(snapshot, item);
        feed.push(&STEAM_PLAYTIME, labels.game(), item.playtime_minutes as f64);
    }
}
