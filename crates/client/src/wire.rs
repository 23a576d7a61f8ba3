//! JSON shapes of the Steam endpoints we call, and their reduction to the
//! core upstream types.
//!
//! Only the fields the exporter reads are modelled; everything else is
//! ignored by serde.

use std::collections::HashMap;

use serde::Deserialize;
use steam_exporter_core::types::ItemId;
use steam_exporter_core::upstream::{AchievementRecord, OwnedItem, PriceOverview};

// ---- ISteamUser/GetPlayerSummaries/v2 ----

#[derive(Debug, Deserialize)]
pub struct PlayerSummariesResponse {
    pub response: PlayerSummaries,
}

#[derive(Debug, Deserialize)]
pub struct PlayerSummaries {
    #[serde(default)]
    pub players: Vec<PlayerSummary>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerSummary {
    pub steamid: String,
    pub personaname: String,
}

impl PlayerSummariesResponse {
    /// Persona name of `steam_id`, if the response contains that player.
    pub fn persona_name(self, steam_id: &str) -> Option<String> {
        self.response
            .players
            .into_iter()
            .find(|p| p.steamid == steam_id)
            .map(|p| p.personaname)
    }
}

// ---- IPlayerService/GetOwnedGames/v1 ----

#[derive(Debug, Deserialize)]
pub struct OwnedGamesResponse {
    pub response: OwnedGames,
}

/// Steam omits `games` entirely (not `[]`) for accounts that own nothing
/// or hide their library.
#[derive(Debug, Deserialize)]
pub struct OwnedGames {
    #[serde(default)]
    pub games: Vec<OwnedGame>,
}

#[derive(Debug, Deserialize)]
pub struct OwnedGame {
    pub appid: ItemId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub playtime_forever: u64,
}

impl From<OwnedGame> for OwnedItem {
    fn from(game: OwnedGame) -> Self {
        Self {
            item_id: game.appid,
            name: game.name,
            playtime_minutes: game.playtime_forever,
        }
    }
}

impl OwnedGamesResponse {
    pub fn into_items(self) -> Vec<OwnedItem> {
        self.response.games.into_iter().map(OwnedItem::from).collect()
    }
}

// ---- store.steampowered.com/api/appdetails ----

/// One value of the `appdetails` map, keyed by app id.
#[derive(Debug, Deserialize)]
pub struct AppDetails {
    pub success: bool,
    #[serde(default)]
    pub data: Option<AppData>,
}

/// With `filters=price_overview`, free or unreleased apps come back as
/// `"data": []` instead of an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AppData {
    Empty(Vec<serde_json::Value>),
    Details(AppDataDetails),
}

#[derive(Debug, Deserialize)]
pub struct AppDataDetails {
    #[serde(default)]
    pub price_overview: Option<StorePrice>,
}

#[derive(Debug, Deserialize)]
pub struct StorePrice {
    pub initial: i64,
    #[serde(rename = "final")]
    pub final_price: i64,
}

/// Extract the price of `item` from an `appdetails` body.
///
/// The store answers `null` for ids it does not know; that, `success: false`
/// and a missing or empty `data` all mean "no price".
pub fn parse_app_price(
    body: &str,
    item: ItemId,
) -> Result<Option<PriceOverview>, serde_json::Error> {
    let details: Option<HashMap<String, AppDetails>> = serde_json::from_str(body)?;
    let Some(mut details) = details else {
        return Ok(None);
    };

    let price = match details.remove(&item.to_string()) {
        Some(AppDetails {
            success: true,
            data: Some(AppData::Details(data)),
        }) => data.price_overview.map(|p| PriceOverview {
            initial: p.initial,
            final_price: p.final_price,
        }),
        _ => None,
    };
    Ok(price)
}

// ---- ISteamUserStats/GetPlayerAchievements/v1 ----

#[derive(Debug, Deserialize)]
pub struct PlayerAchievementsResponse {
    pub playerstats: PlayerStats,
}

#[derive(Debug, Deserialize)]
pub struct PlayerStats {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub achievements: Vec<PlayerAchievement>,
}

#[derive(Debug, Deserialize)]
pub struct PlayerAchievement {
    pub apiname: String,
    pub achieved: u8,
    #[serde(default)]
    pub unlocktime: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl From<PlayerAchievement> for AchievementRecord {
    fn from(a: PlayerAchievement) -> Self {
        Self {
            api_name: a.apiname,
            name: a.name,
            description: a.description,
            achieved: a.achieved != 0,
            unlock_time: a.unlocktime,
        }
    }
}

impl PlayerAchievementsResponse {
    /// `None` when Steam reports `success: false` (the app has no stats).
    pub fn into_records(self) -> Option<Vec<AchievementRecord>> {
        if !self.playerstats.success {
            return None;
        }
        Some(
            self.playerstats
                .achievements
                .into_iter()
                .map(AchievementRecord::from)
                .collect(),
        )
    }
}
