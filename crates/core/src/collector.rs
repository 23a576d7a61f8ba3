//! Names of the collectors an operator can switch on.

use std::fmt;
use std::str::FromStr;

/// A collector selectable via configuration.
///
/// `Playtime`, `Price` and `Achievements` are metric domains walked by the
/// emitter; `Process` only adds the standard process metrics at exposition
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CollectorKind {
    Playtime,
    Price,
    Achievements,
    Process,
}

impl CollectorKind {
    pub const ALL: [CollectorKind; 4] = [
        CollectorKind::Playtime,
        CollectorKind::Price,
        CollectorKind::Achievements,
        CollectorKind::Process,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CollectorKind::Playtime => "playtime",
            CollectorKind::Price => "price",
            CollectorKind::Achievements => "achievements",
            CollectorKind::Process => "process",
        }
    }
}

impl fmt::Display for CollectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a collector name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown collector '{0}'")]
pub struct UnknownCollector(pub String);

impl FromStr for CollectorKind {
    type Err = UnknownCollector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        CollectorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| UnknownCollector(name.to_string()))
    }
}
