use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use derive_more::{Add, AddAssign, Neg, Sub, Sum};

#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Add, AddAssign, Sub, Sum)]
pub struct KilowattHours(pub f64);

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} kWh", self.0)
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}kWh", self.0)
    }
}

/// Parse a CSV cell as a finite number. `NaN` and infinities are rejected.
#[must_use]
pub fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Money, in cents.
#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Add, AddAssign, Sub, Sum, Neg)]
pub struct Cost(pub f64);

impl Cost {
    pub const ZERO: Self = Self(0.0);

    #[must_use]
    pub const fn cents(self) -> f64 {
        self.0
    }

    #[must_use]
    pub const fn dollars(self) -> f64 {
        self.0 / 100.0
    }
}

impl Mul<f64> for Cost {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// Cents per kilowatt-hour times energy.
impl Mul<KilowattHours> for f64 {
    type Output = Cost;

    fn mul(self, rhs: KilowattHours) -> Self::Output {
        Cost(self * rhs.0)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0 < 0.0 {
            write!(f, "-${:.2}", -self.dollars())
        } else {
            write!(f, "${:.2}", self.dollars())
        }
    }
}

impl Debug for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}c", self.0)
    }
}
