use chrono::{Datelike, NaiveDateTime, Weekday};

use crate::prices::VARIABLE;

/// Off-peak rate, read only by strategies that have an off-peak band.
pub const OFFPEAK: &str = "offpeak";

/// Night rate, read only by strategies that have a night band.
pub const NIGHT: &str = "night";

/// Rate class a strategy assigns to a reading.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Band {
    Peak,
    OffPeak,
    Night,
    Free,
}

impl Band {
    /// Price row field holding the rate of this band, `None` if it costs nothing.
    #[must_use]
    pub const fn field(self) -> Option<&'static str> {
        match self {
            Self::Peak => Some(VARIABLE),
            Self::OffPeak => Some(OFFPEAK),
            Self::Night => Some(NIGHT),
            Self::Free => None,
        }
    }
}

#[must_use]
pub fn is_weekend(timestamp: NaiveDateTime) -> bool {
    matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Whether `hour` falls in `[from, to)`.
#[must_use]
pub fn within(hour: u32, from: u32, to: u32) -> bool {
    (from..to).contains(&hour)
}
