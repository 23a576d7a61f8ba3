//! The metric domains walked by the emitter.
//!
//! Playtime comes straight from the account snapshot; price and
//! achievements need a per-game upstream call and are cached through
//! [`ItemFactCache`](crate::facts::ItemFactCache).

pub mod achievements;
pub mod playtime;
pub mod price;

pub use achievements::{Achievement, AchievementsDomain, AchievementsFact};
pub use playtime::PlaytimeDomain;
pub use price::{PriceDomain, PriceFact};
