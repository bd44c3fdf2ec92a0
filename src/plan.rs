pub mod schedule;
pub mod strategy;

use chrono::Timelike;

use self::{
    schedule::{Band, NIGHT, OFFPEAK},
    strategy::Strategy,
};
use crate::{
    prelude::*,
    prices::{BONUS, DAILY, FIXED, PriceRow, SURCHARGE},
    quantity::Cost,
    usage::{HALF_HOURS_PER_DAY, Reading, Usage},
};

/// What a plan costs over the usage period.
///
/// The bonus is a one-off deduction, so it stays out of anything scaled by time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bill {
    /// Energy and fixed charges, surcharge included.
    pub charges: Cost,
    pub bonus: Cost,
}

impl Bill {
    #[must_use]
    pub fn total(self) -> Cost {
        self.charges - self.bonus
    }
}

/// Fields that only make sense with time-of-use logic.
const STRATEGY_FIELDS: [&str; 2] = [OFFPEAK, NIGHT];

/// A price row together with the strategy its name selects.
#[derive(Copy, Clone, Debug)]
pub struct Plan<'a> {
    row: &'a PriceRow,
    strategy: Strategy,
}

impl<'a> Plan<'a> {
    /// Fails when the row carries time-of-use rates but its name has no strategy to use them.
    pub fn try_new(row: &'a PriceRow) -> Result<Self, Error> {
        let strategy = Strategy::from_plan_name(&row.name);
        if !strategy.is_custom() {
            if let Some(field) = STRATEGY_FIELDS.into_iter().find(|field| row.contains(field)) {
                return Err(Error::UnknownStrategy { plan: row.name.clone(), field });
            }
        }
        Ok(Self { row, strategy })
    }

    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.row.name
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.strategy.is_custom()
    }

    /// Cost of the plan over the whole usage period. [`Bill::total`] is the final figure.
    pub fn bill(&self, usage: &Usage) -> Result<Bill, Error> {
        let fixed = self.fixed()?;
        for field in self.strategy.bands().iter().filter_map(|band| band.field()) {
            self.row.require(field)?;
        }

        let mut energy = Cost::ZERO;
        for readings in usage.by_day().values() {
            energy += self.day_charge(readings)?;
        }
        let subtotal = energy + Cost(fixed) * usage.n_days() as f64;

        Ok(Bill {
            charges: self.with_surcharge(subtotal),
            bonus: self.row.get(BONUS).map_or(Cost::ZERO, Cost),
        })
    }

    /// Daily charge, falling back to the older `daily` column.
    fn fixed(&self) -> Result<f64, Error> {
        self.row.get(FIXED).or_else(|| self.row.get(DAILY)).ok_or_else(|| Error::MissingField {
            plan: self.row.name.clone(),
            field: FIXED,
        })
    }

    fn rate(&self, band: Band) -> Result<f64, Error> {
        band.field().map_or(Ok(0.0), |field| self.row.require(field))
    }

    /// Energy charge of a single day.
    fn day_charge(&self, readings: &[&Reading]) -> Result<Cost, Error> {
        let mut hourly = [Cost::ZERO; 24];
        for reading in readings {
            let rate = self.rate(self.strategy.band(reading.start))?;
            hourly[reading.start.hour() as usize] += rate * reading.consumption;
        }
        let total: Cost = hourly.iter().copied().sum();

        if self.strategy.has_free_hour() && readings.len() == HALF_HOURS_PER_DAY {
            if let Some(free) = self.free_hour(&hourly) {
                return Ok(total - free);
            }
        }
        Ok(total)
    }

    /// Charge of the most expensive hour eligible to be free, if any was charged at all.
    fn free_hour(&self, hourly: &[Cost; 24]) -> Option<Cost> {
        (0_u32..)
            .zip(hourly)
            .filter(|(hour, _)| self.strategy.is_free_hour_candidate(*hour))
            .map(|(_, charge)| *charge)
            .filter(|charge| *charge > Cost::ZERO)
            .reduce(|best, charge| if charge > best { charge } else { best })
    }

    /// Surcharge, shared by every strategy.
    fn with_surcharge(&self, subtotal: Cost) -> Cost {
        self.row.get(SURCHARGE).map_or(subtotal, |surcharge| subtotal * (1.0 + surcharge / 100.0))
    }
}
