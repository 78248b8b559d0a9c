use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Sub},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Quantity of goods (tonnes, trips, litres) as integer **thousandths** of a
/// unit.
///
/// ```rust
/// use quarry_engine::Quantity;
///
/// assert_eq!("12.5".parse::<Quantity>().unwrap(), Quantity::from_milli(12_500));
/// assert_eq!(Quantity::units(3).to_string(), "3");
/// assert_eq!(Quantity::from_milli(2_250).to_string(), "2.25");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Quantity(i64);

impl Quantity {
    pub const ZERO: Quantity = Quantity(0);
    /// Thousandths per unit.
    pub const SCALE: i64 = 1_000;

    #[must_use]
    pub const fn from_milli(milli: i64) -> Self {
        Self(milli)
    }

    #[must_use]
    pub const fn units(units: i64) -> Self {
        Self(units * Self::SCALE)
    }

    #[must_use]
    pub const fn milli(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = Self::SCALE.unsigned_abs();
        let (whole, frac) = (abs / scale, abs % scale);
        if frac == 0 {
            return write!(f, "{sign}{whole}");
        }
        let frac = format!("{frac:03}");
        write!(f, "{sign}{whole}.{}", frac.trim_end_matches('0'))
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Self::Output {
        Quantity(self.0 + rhs.0)
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, rhs: Quantity) {
        self.0 += rhs.0;
    }
}

impl Sub for Quantity {
    type Output = Quantity;

    fn sub(self, rhs: Quantity) -> Self::Output {
        Quantity(self.0 - rhs.0)
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::ZERO, Add::add)
    }
}

impl FromStr for Quantity {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::util::parse_fixed_point(s, 3)
            .map(Quantity)
            .map_err(|reason| EngineError::InvalidQuantity(reason.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_trims_trailing_zeros() {
        assert_eq!(Quantity::ZERO.to_string(), "0");
        assert_eq!(Quantity::from_milli(100_000).to_string(), "100");
        assert_eq!(Quantity::from_milli(1_500).to_string(), "1.5");
        assert_eq!(Quantity::from_milli(1_005).to_string(), "1.005");
        assert_eq!(Quantity::from_milli(-250).to_string(), "-0.25");
    }

    #[test]
    fn parse_rejects_four_decimals() {
        assert!("1.2345".parse::<Quantity>().is_err());
        assert_eq!(
            "1.2345".parse::<Quantity>().unwrap_err(),
            EngineError::InvalidQuantity("too many decimals".to_string())
        );
    }
}
