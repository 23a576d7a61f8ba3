//! Steam Web API client.
//!
//! [`SteamWebApi`] talks to the public Web API and the store `appdetails`
//! endpoint over [`reqwest`] and implements the core
//! [`SteamApi`](steam_exporter_core::upstream::SteamApi) trait.

pub mod api;
pub mod error;
pub mod wire;

pub use api::{SteamWebApi, SteamWebApiOptions};
pub use error::SteamApiError;
