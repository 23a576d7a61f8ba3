//! REST client for the Steam Web API and store endpoints.

use std::fmt;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use steam_exporter_core::error::UpstreamError;
use steam_exporter_core::types::{AccountId, ItemId};
use steam_exporter_core::upstream::{AchievementRecord, OwnedItem, PriceOverview, SteamApi};

use crate::error::SteamApiError;
use crate::wire::{
    parse_app_price, OwnedGamesResponse, PlayerAchievementsResponse, PlayerSummariesResponse,
};

pub const DEFAULT_WEB_API_URL: &str = "https://api.steampowered.com";
pub const DEFAULT_STORE_URL: &str = "https://store.steampowered.com";

/// Endpoint and locale settings for [`SteamWebApi`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SteamWebApiOptions {
    /// Base URL of the Web API, without trailing slash.
    pub web_api_url: String,
    /// Base URL of the store, without trailing slash.
    pub store_url: String,
    /// Store region (`cc`) that prices are quoted for.
    pub country: String,
    /// Language (`l`) for game and achievement names.
    pub language: String,
}

impl Default for SteamWebApiOptions {
    fn default() -> Self {
        Self {
            web_api_url: DEFAULT_WEB_API_URL.to_string(),
            store_url: DEFAULT_STORE_URL.to_string(),
            country: "de".to_string(),
            language: "english".to_string(),
        }
    }
}

/// HTTP client for the Steam Web API.
///
/// Every method performs exactly one request; there are no retries here.
pub struct SteamWebApi {
    client: reqwest::Client,
    api_key: String,
    options: SteamWebApiOptions,
}

impl fmt::Debug for SteamWebApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SteamWebApi")
            .field("api_key", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl SteamWebApi {
    pub fn new(api_key: impl Into<String>, options: SteamWebApiOptions) -> Self {
        Self::with_client(reqwest::Client::new(), api_key, options)
    }

    /// Reuse an existing [`reqwest::Client`] (for its pool and timeouts).
    pub fn with_client(
        client: reqwest::Client,
        api_key: impl Into<String>,
        options: SteamWebApiOptions,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            options,
        }
    }

    /// `GET /ISteamUser/GetPlayerSummaries/v2` for one account.
    pub async fn player_summary(&self, account: AccountId) -> Result<String, SteamApiError> {
        let steam_id = account.to_string();
        let response = self
            .client
            .get(format!(
                "{}/ISteamUser/GetPlayerSummaries/v2/",
                self.options.web_api_url
            ))
            .query(&[("key", self.api_key.as_str()), ("steamids", steam_id.as_str())])
            .send()
            .await?;

        let summaries: PlayerSummariesResponse = Self::parse_response(response).await?;
        summaries
            .persona_name(&steam_id)
            .ok_or(SteamApiError::ProfileNotFound(account))
    }

    /// `GET /IPlayerService/GetOwnedGames/v1` including names and free games.
    pub async fn owned_games(&self, account: AccountId) -> Result<Vec<OwnedItem>, SteamApiError> {
        let steam_id = account.to_string();
        let response = self
            .client
            .get(format!(
                "{}/IPlayerService/GetOwnedGames/v1/",
                self.options.web_api_url
            ))
            .query(&[
                ("key", self.api_key.as_str()),
                ("steamid", steam_id.as_str()),
                ("include_appinfo", "1"),
                ("include_played_free_games", "1"),
                ("format", "json"),
            ])
            .send()
            .await?;

        let games: OwnedGamesResponse = Self::parse_response(response).await?;
        Ok(games.into_items())
    }

    /// `GET /api/appdetails` on the store, filtered to the price.
    pub async fn app_price(&self, item: ItemId) -> Result<Option<PriceOverview>, SteamApiError> {
        let app_id = item.to_string();
        let response = self
            .client
            .get(format!("{}/api/appdetails", self.options.store_url))
            .query(&[
                ("appids", app_id.as_str()),
                ("cc", self.options.country.as_str()),
                ("l", self.options.language.as_str()),
                ("filters", "price_overview"),
            ])
            .send()
            .await?;

        let body = Self::ensure_success(response).await?.text().await?;
        Ok(parse_app_price(&body, item)?)
    }

    /// `GET /ISteamUserStats/GetPlayerAchievements/v1`.
    ///
    /// Steam answers HTTP 400 with `success: false` for apps that have no
    /// stats; that is reported as an empty list rather than an error.
    pub async fn player_achievements(
        &self,
        account: AccountId,
        item: ItemId,
    ) -> Result<Vec<AchievementRecord>, SteamApiError> {
        let steam_id = account.to_string();
        let app_id = item.to_string();
        let response = self
            .client
            .get(format!(
                "{}/ISteamUserStats/GetPlayerAchievements/v1/",
                self.options.web_api_url
            ))
            .query(&[
                ("key", self.api_key.as_str()),
                ("steamid", steam_id.as_str()),
                ("appid", app_id.as_str()),
                ("l", self.options.language.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            let body = response.text().await?;
            return match serde_json::from_str::<PlayerAchievementsResponse>(&body) {
                Ok(stats) if !stats.playerstats.success => {
                    tracing::debug!(
                        steam_id = account,
                        app_id = item,
                        reason = stats.playerstats.error.as_deref().unwrap_or(""),
                        "App has no achievement stats",
                    );
                    Ok(Vec::new())
                }
                _ => Err(SteamApiError::ApiError {
                    status: status.as_u16(),
                    body,
                }),
            };
        }

        let stats: PlayerAchievementsResponse = Self::parse_response(response).await?;
        Ok(stats.into_records().unwrap_or_default())
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`SteamApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SteamApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SteamApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    ///
    /// The body is read as text first so malformed JSON surfaces as
    /// [`SteamApiError::Decode`] rather than a transport error.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SteamApiError> {
        let body = Self::ensure_success(response).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SteamApi for SteamWebApi {
    async fn fetch_profile(&self, account: AccountId) -> Result<String, UpstreamError> {
        Ok(self.player_summary(account).await?)
    }

    async fn fetch_owned_items(&self, account: AccountId) -> Result<Vec<OwnedItem>, UpstreamError> {
        Ok(self.owned_games(account).await?)
    }

    async fn fetch_item_price(&self, item: ItemId) -> Result<Option<PriceOverview>, UpstreamError> {
        Ok(self.app_price(item).await?)
    }

    async fn fetch_item_progress(
        &self,
        account: AccountId,
        item: ItemId,
    ) -> Result<Vec<AchievementRecord>, UpstreamError> {
        Ok(self.player_achievements(account, item).await?)
    }
}
