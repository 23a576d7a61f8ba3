//! In-memory cache primitives.
//!
//! [`CacheEntry`] is the value + freshness record; [`EntityCache`] is the
//! keyed store with one lock per key. Neither decides *when* to refresh;
//! that is the job of [`RefreshOrchestrator`](crate::refresh::RefreshOrchestrator).

pub mod entry;
pub mod store;

pub use entry::CacheEntry;
pub use store::EntityCache;
