//! Metric family definitions exposed on `/metrics`.
//!
//! Names, help strings and label schemas are fixed for the lifetime of the
//! process; observations reference a family by `&'static` pointer so label
//! values can be checked against the schema when they are recorded.

/// A gauge family with a fixed label schema.
#[derive(Debug, PartialEq, Eq)]
pub struct MetricFamily {
    pub name: &'static str,
    pub help: &'static str,
    pub labels: &'static [&'static str],
}

/// Label schema shared by every per-game family.
pub const GAME_LABELS: &[&str] = &["steam_profile_name", "steam_id", "name", "app_id"];

/// Label schema of the per-achievement unlock time family.
pub const ACHIEVEMENT_LABELS: &[&str] = &[
    "steam_profile_name",
    "steam_id",
    "game_name",
    "app_id",
    "name",
    "apiname",
    "achieved",
    "description",
];

/// Minutes played per game, taken straight from the owned-games list.
pub static STEAM_PLAYTIME: MetricFamily = MetricFamily {
    name: "steam_playtime",
    help: "Amount of time played on Steam by the specified user.",
    labels: GAME_LABELS,
};

/// Store price before discount, in minor currency units.
pub static STEAM_GAME_PRICE_INITIAL: MetricFamily = MetricFamily {
    name: "steam_game_price_initial",
    help: "Initial price of a game on Steam.",
    labels: GAME_LABELS,
};

/// Store price after discount, in minor currency units.
pub static STEAM_GAME_PRICE_FINAL: MetricFamily = MetricFamily {
    name: "steam_game_price_final",
    help: "Final price of a game on Steam.",
    labels: GAME_LABELS,
};

/// Unix unlock time per achievement; `0` while still locked.
pub static STEAM_ACHIEVEMENTS_UNLOCKTIME: MetricFamily = MetricFamily {
    name: "steam_achievements_unlocktime",
    help: "Unlock time of an achievement on Steam for the specified user.",
    labels: ACHIEVEMENT_LABELS,
};

pub static STEAM_ACHIEVEMENTS_ACHIEVED: MetricFamily = MetricFamily {
    name: "steam_achievements_achieved",
    help: "Number of achievements the specified user has unlocked in a game.",
    labels: GAME_LABELS,
};

pub static STEAM_ACHIEVEMENTS_REMAINING: MetricFamily = MetricFamily {
    name: "steam_achievements_remaining",
    help: "Number of achievements the specified user has not unlocked yet in a game.",
    labels: GAME_LABELS,
};
