use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::entry::CacheEntry;

/// The lock guarding a single key. Held across the upstream call that
/// refreshes the key, so concurrent scrapes never fetch the same key twice.
pub type Slot<T> = Arc<Mutex<Option<CacheEntry<T>>>>;

/// Keyed store of [`CacheEntry`] values with per-key mutual exclusion.
///
/// Slots are created lazily on first access and never removed; the key
/// space (tracked accounts times their games) is bounded and slow-changing.
/// The outer map lock is only held long enough to look up or insert a slot.
pub struct EntityCache<K, T> {
    /// Short name used in log events, e.g. `"price"`.
    name: &'static str,
    slots: RwLock<HashMap<K, Slot<T>>>,
}

impl<K, T> EntityCache<K, T>
where
    K: Eq + Hash + Clone,
{
    /// Create an empty cache.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            slots: RwLock::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Return the slot for `key`, creating an empty one if needed.
    pub async fn slot(&self, key: &K) -> Slot<T> {
        if let Some(slot) = self.slots.read().await.get(key) {
            return Arc::clone(slot);
        }
        let mut slots = self.slots.write().await;
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Copy of the entry stored for `key`, if any.
    ///
    /// Waits for an in-flight refresh of the same key to finish.
    #[cfg(test)]
    pub(crate) async fn peek(&self, key: &K) -> Option<CacheEntry<T>>
    where
        T: Clone,
    {
        let slot = self.slots.read().await.get(key).cloned()?;
        let guard = slot.lock().await;
        guard.clone()
    }

    /// Number of keys holding an entry.
    ///
    /// Slots locked by an in-flight refresh are skipped rather than waited
    /// on, so the count never blocks behind an upstream call.
    pub async fn entry_count(&self) -> usize {
        self.slots
            .read()
            .await
            .values()
            .filter(|slot| slot.try_lock().map(|g| g.is_some()).unwrap_or(false))
            .count()
    }
}
