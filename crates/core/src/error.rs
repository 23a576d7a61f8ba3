use std::time::Duration;

use crate::types::AccountId;

/// Failure of a single upstream call.
///
/// Every variant is treated as "upstream unavailable": item-level facts
/// degrade to zero with the retry TTL, account snapshots skip the account
/// for the current scrape. A successful call that simply carries no data is
/// not an error (see [`Refreshed::NoData`](crate::refresh::Refreshed)).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpstreamError {
    /// The request never produced a response (network, DNS, TLS, ...).
    #[error("Upstream request failed: {0}")]
    Transport(String),

    /// The API answered with a non-success status code.
    #[error("Upstream API error ({status}): {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Malformed upstream response: {0}")]
    Parse(String),

    /// The call did not finish within the configured upstream timeout.
    #[error("Upstream call timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The profile lookup succeeded but returned no player for the account.
    #[error("No profile returned for account {0}")]
    ProfileNotFound(AccountId),
}
