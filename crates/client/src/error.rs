use steam_exporter_core::error::UpstreamError;
use steam_exporter_core::types::AccountId;

/// Errors from the Steam HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum SteamApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Steam returned a non-2xx status code.
    #[error("Steam API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The body was not the JSON shape we expected.
    #[error("Failed to decode Steam response: {0}")]
    Decode(#[from] serde_json::Error),

    /// `GetPlayerSummaries` answered without a player for the id.
    #[error("No player summary for account {0}")]
    ProfileNotFound(AccountId),
}

impl From<SteamApiError> for UpstreamError {
    fn from(err: SteamApiError) -> Self {
        match err {
            SteamApiError::Request(e) if e.is_decode() => UpstreamError::Parse(e.to_string()),
            SteamApiError::Request(e) => UpstreamError::Transport(e.to_string()),
            SteamApiError::ApiError { status, body } => UpstreamError::Status { status, body },
            SteamApiError::Decode(e) => UpstreamError::Parse(e.to_string()),
            SteamApiError::ProfileNotFound(account) => UpstreamError::ProfileNotFound(account),
        }
    }
}
