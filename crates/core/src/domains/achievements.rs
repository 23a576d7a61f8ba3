use async_trait::async_trait;

use crate::collector::CollectorKind;
use crate::error::UpstreamError;
use crate::facts::{FactDomain, ItemLabels};
use crate::metric_names::{
    STEAM_ACHIEVEMENTS_ACHIEVED, STEAM_ACHIEVEMENTS_REMAINING, STEAM_ACHIEVEMENTS_UNLOCKTIME,
};
use crate::observation::ObservationSet;
use crate::refresh::Refreshed;
use crate::types::{AccountId, ItemId};
use crate::upstream::{AchievementRecord, SteamApi};

/// One achievement of one player in one game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Achievement {
    pub api_name: String,
    pub name: String,
    pub description: String,
    pub achieved: bool,
    pub unlock_time: u64,
}

impl From<AchievementRecord> for Achievement {
    fn from(record: AchievementRecord) -> Self {
        Self {
            api_name: record.api_name,
            name: record.name,
            description: record.description,
            achieved: record.achieved,
            unlock_time: record.unlock_time,
        }
    }
}

/// Achievement progress of one player in one game.
///
/// The zero value (no achievements) is what gets emitted for games without
/// stats and for failed lookups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AchievementsFact {
    pub achievements: Vec<Achievement>,
}

impl AchievementsFact {
    pub fn achieved_count(&self) -> usize {
        self.achievements.iter().filter(|a| a.achieved).count()
    }

    pub fn remaining_count(&self) -> usize {
        self.achievements.len() - self.achieved_count()
    }

    /// An empty list means the game defines no achievements.
    pub fn classify(records: Vec<AchievementRecord>) -> Refreshed<AchievementsFact> {
        if records.is_empty() {
            return Refreshed::NoData;
        }
        Refreshed::Usable(AchievementsFact {
            achievements: records.into_iter().map(Achievement::from).collect(),
        })
    }
}

/// Per-achievement unlock times plus achieved/remaining counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct AchievementsDomain;

#[async_trait]
impl FactDomain for AchievementsDomain {
    type Value = AchievementsFact;

    fn kind(&self) -> CollectorKind {
        CollectorKind::Achievements
    }

    async fn fetch(
        &self,
        api: &dyn SteamApi,
        account: AccountId,
        item: ItemId,
    ) -> Result<Refreshed<AchievementsFact>, UpstreamError> {
        let records = api.fetch_item_progress(account, item).await?;
        Ok(AchievementsFact::classify(records))
    }

    fn observe(
        &self,
        labels: &ItemLabels<'_>,
        value: &AchievementsFact,
        feed: &mut ObservationSet,
    ) {
        for achievement in &value.achievements {
            feed.push(
                &STEAM_ACHIEVEMENTS_UNLOCKTIME,
                vec![
                    labels.profile_name.to_string(),
                    labels.steam_id.clone(),
                    labels.item_name.to_string(),
                    labels.app_id.clone(),
                    achievement.name.clone(),
                    achievement.api_name.clone(),
                    if achievement.achieved { "1" } else { "0" }.to_string(),
                    achievement.description.clone(),
                ],
                achievement.unlock_time as f64,
            );
        }
        feed.push(
            &STEAM_ACHIEVEMENTS_ACHIEVED,
            labels.game(),
            value.achieved_count() as f64,
        );
        feed.push(
            &STEAM_ACHIEVEMENTS_REMAINING,
            labels.game(),
            value.remaining_count() as f64,
        );
    }
}
