use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};

/// Signed money amount represented as **integer cents**.
///
/// Every monetary value in the engine (pool balance, allowances, expense and
/// split amounts) is a `Cents` to avoid floating-point drift. The value is
/// signed: allowance `remaining` may legitimately go negative (overspend).
///
/// # Examples
///
/// ```rust
/// use engine::Cents;
///
/// let amount = Cents::new(12_34);
/// assert_eq!(amount.cents(), 1234);
/// assert_eq!(amount.to_string(), "12.34");
/// ```
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Cents(i64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    /// Creates a new amount from integer cents.
    #[must_use]
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Returns the raw value in cents.
    #[must_use]
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Returns `true` if the amount is 0.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if the amount is strictly positive.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Returns `true` if the amount is strictly negative.
    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Cents) -> Option<Cents> {
        self.0.checked_add(rhs.0).map(Cents)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Cents) -> Option<Cents> {
        self.0.checked_sub(rhs.0).map(Cents)
    }

    /// The smaller of the two amounts.
    #[must_use]
    pub fn min(self, rhs: Cents) -> Cents {
        Cents(self.0.min(rhs.0))
    }

    /// The larger of the two amounts.
    #[must_use]
    pub fn max(self, rhs: Cents) -> Cents {
        Cents(self.0.max(rhs.0))
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Cents {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Cents> for i64 {
    fn from(value: Cents) -> Self {
        value.0
    }
}

impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Cents) -> Self::Output {
        Cents(self.0 + rhs.0)
    }
}

impl AddAssign for Cents {
    fn add_assign(&mut self, rhs: Cents) {
        self.0 += rhs.0;
    }
}

impl Sub for Cents {
    type Output = Cents;

    fn sub(self, rhs: Cents) -> Self::Output {
        Cents(self.0 - rhs.0)
    }
}

impl SubAssign for Cents {
    fn sub_assign(&mut self, rhs: Cents) {
        self.0 -= rhs.0;
    }
}

impl Neg for Cents {
    type Output = Cents;

    fn neg(self) -> Self::Output {
        Cents(-self.0)
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Self {
        Cents(iter.map(|c| c.0).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_two_decimals() {
        assert_eq!(Cents::new(0).to_string(), "0.00");
        assert_eq!(Cents::new(1).to_string(), "0.01");
        assert_eq!(Cents::new(1050).to_string(), "10.50");
        assert_eq!(Cents::new(-1050).to_string(), "-10.50");
    }

    #[test]
    fn sum_and_signs() {
        let total: Cents = [Cents::new(100), Cents::new(-30)].into_iter().sum();
        assert_eq!(total, Cents::new(70));
        assert!(Cents::new(-1).is_negative());
        assert!(Cents::new(1).is_positive());
        assert!(Cents::ZERO.is_zero());
    }
}
