use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{EngineError, Quantity};

/// Signed money amount represented as integer **minor units** (cents).
///
/// Every monetary value in the engine (prices, fees, expenses, balances) is a
/// `Money`, so report totals never drift.
///
/// # Examples
///
/// ```rust
/// use quarry_engine::{Money, Quantity};
///
/// let price = Money::new(20_00);
/// assert_eq!(price.to_string(), "20.00");
/// assert_eq!(price.times(Quantity::units(100)), Money::new(2_000_00));
/// ```
///
/// Parsing from user input accepts `.` or `,` as decimal separator:
///
/// ```rust
/// use quarry_engine::Money;
///
/// assert_eq!("10".parse::<Money>().unwrap().minor(), 1000);
/// assert_eq!("10,5".parse::<Money>().unwrap().minor(), 1050);
/// assert!("12.345".parse::<Money>().is_err());
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Creates a new amount from whole major units.
    #[must_use]
    pub const fn major(units: i64) -> Self {
        Self(units * 100)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Multiplies a per-unit amount by a quantity, `None` if the result does
    /// not fit.
    ///
    /// The exact product is rounded half away from zero to the minor unit.
    #[must_use]
    pub fn checked_times(self, quantity: Quantity) -> Option<Money> {
        let scale = i128::from(Quantity::SCALE);
        let product = i128::from(self.0) * i128::from(quantity.milli());
        let rounded = if product >= 0 {
            (product + scale / 2) / scale
        } else {
            (product - scale / 2) / scale
        };
        i64::try_from(rounded).ok().map(Money)
    }

    /// Like [`Money::checked_times`], saturating at the `i64` bounds.
    ///
    /// Recorded prices and quantities are bounded so that stored rows never
    /// reach the bounds.
    #[must_use]
    pub fn times(self, quantity: Quantity) -> Money {
        self.checked_times(quantity).unwrap_or_else(|| {
            if self.is_negative() != quantity.is_negative() {
                Money(i64::MIN)
            } else {
                Money(i64::MAX)
            }
        })
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl FromStr for Money {
    type Err = EngineError;

    /// Parses a decimal string into minor units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`;
    /// rejects more than 2 fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let minor = crate::util::parse_fixed_point(s, 2)
            .map_err(|reason| EngineError::InvalidAmount(reason.to_string()))?;
        Ok(Money(minor))
    }
}
