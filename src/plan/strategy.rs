use chrono::{NaiveDateTime, Timelike};

use super::schedule::{Band, is_weekend, within};

/// Plan names that differ only by this suffix share a strategy.
const LOW_USER_SUFFIX: &str = "LowUser";

/// How a plan picks the rate of each reading.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Strategy {
    /// Every reading at the `variable` rate.
    Flat,
    ContactGoodCharge,
    ContactGoodNights,
    ContactGoodWeekends,
    ElectricKiwi,
    ElectricKiwiMoveMaster,
    FlickOffPeak,
    GenesisEv,
    ZEv,
    OctopusFixed,
}

impl Strategy {
    #[must_use]
    pub fn from_plan_name(name: &str) -> Self {
        match name.strip_suffix(LOW_USER_SUFFIX).unwrap_or(name) {
            "ContactGoodCharge" => Self::ContactGoodCharge,
            "ContactGoodNights" => Self::ContactGoodNights,
            "ContactGoodWeekends" => Self::ContactGoodWeekends,
            "ElectricKiwi" | "ElectricKiwiKiwi" | "ElectricKiwiPrepay300" => Self::ElectricKiwi,
            "ElectricKiwiMoveMaster" => Self::ElectricKiwiMoveMaster,
            "FlickOffPeak" => Self::FlickOffPeak,
            "GenesisEV" => Self::GenesisEv,
            "ZEv" => Self::ZEv,
            "OctopusFixed" => Self::OctopusFixed,
            _ => Self::Flat,
        }
    }

    #[must_use]
    pub fn is_custom(self) -> bool {
        self != Self::Flat
    }

    /// Bands this strategy may assign. The price row must carry a rate for each of them.
    #[must_use]
    pub const fn bands(self) -> &'static [Band] {
        match self {
            Self::Flat | Self::ContactGoodNights | Self::ContactGoodWeekends => &[Band::Peak],
            Self::ContactGoodCharge
            | Self::ElectricKiwi
            | Self::FlickOffPeak
            | Self::GenesisEv
            | Self::ZEv => &[Band::Peak, Band::OffPeak],
            Self::ElectricKiwiMoveMaster | Self::OctopusFixed => {
                &[Band::Peak, Band::OffPeak, Band::Night]
            }
        }
    }

    #[must_use]
    pub fn band(self, timestamp: NaiveDateTime) -> Band {
        let hour = timestamp.hour();
        let weekend = is_weekend(timestamp);

        match self {
            Self::Flat => Band::Peak,

            Self::ContactGoodCharge | Self::GenesisEv => {
                if within(hour, 7, 21) { Band::Peak } else { Band::OffPeak }
            }

            // Free from 9 pm to midnight.
            Self::ContactGoodNights => {
                if hour >= 21 { Band::Free } else { Band::Peak }
            }

            // Free from 9 am to 5 pm on weekends.
            Self::ContactGoodWeekends => {
                if weekend && within(hour, 9, 17) { Band::Free } else { Band::Peak }
            }

            Self::ElectricKiwi => {
                if !weekend && is_kiwi_peak(hour) { Band::Peak } else { Band::OffPeak }
            }

            Self::ElectricKiwiMoveMaster => {
                if !weekend && is_kiwi_peak(hour) {
                    Band::Peak
                } else if within(hour, 9, 17) || within(hour, 21, 23) {
                    Band::OffPeak
                } else {
                    Band::Night
                }
            }

            Self::FlickOffPeak => {
                if within(hour, 7, 11) || within(hour, 17, 21) { Band::Peak } else { Band::OffPeak }
            }

            Self::ZEv => {
                if within(hour, 3, 6) {
                    Band::Free
                } else if within(hour, 7, 21) {
                    Band::Peak
                } else {
                    Band::OffPeak
                }
            }

            Self::OctopusFixed if weekend => {
                if within(hour, 7, 23) { Band::OffPeak } else { Band::Night }
            }

            Self::OctopusFixed => {
                if within(hour, 7, 11) || within(hour, 17, 21) {
                    Band::Peak
                } else if within(hour, 11, 17) || within(hour, 21, 23) {
                    Band::OffPeak
                } else {
                    Band::Night
                }
            }
        }
    }

    /// Whether one off-peak hour a day is given away for free.
    #[must_use]
    pub const fn has_free_hour(self) -> bool {
        matches!(self, Self::ElectricKiwi | Self::ElectricKiwiMoveMaster)
    }

    /// Hours the free hour can land on.
    #[must_use]
    pub fn is_free_hour_candidate(self, hour: u32) -> bool {
        self.has_free_hour() && !is_kiwi_peak(hour)
    }
}

/// Electric Kiwi peak: 7–9 am and 5–9 pm.
fn is_kiwi_peak(hour: u32) -> bool {
    within(hour, 7, 9) || within(hour, 17, 21)
}
