//! Core of the Steam metrics exporter.
//!
//! Holds the staleness-aware caches that sit between a metrics scrape and
//! the Steam Web API, the refresh orchestration shared by every cache, the
//! per-domain fact definitions (playtime, price, achievements) and the
//! emitter that turns cache state into observations. HTTP and the concrete
//! Steam client live in sibling crates; this crate only sees the
//! [`upstream::SteamApi`] trait.

pub mod account;
pub mod cache;
pub mod collector;
pub mod domains;
pub mod emitter;
pub mod error;
pub mod facts;
pub mod metric_names;
pub mod observation;
pub mod refresh;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod types;
pub mod upstream;
