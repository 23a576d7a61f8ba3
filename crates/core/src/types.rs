/// A 64-bit SteamID identifying a tracked account.
pub type AccountId = u64;

/// A Steam application id. Owned games are the cached "items".
pub type ItemId = u32;

/// Composite key of a per-item fact: the owning account and the item.
pub type FactKey = (AccountId, ItemId);
