//! Value objects: equality by value, not identity.

use core::iter::Sum;
use core::ops::{Add, AddAssign};
use serde::{Deserialize, Serialize};

/// Monetary amount in the smallest currency unit (euro cents).
///
/// Signed so that aggregates over malformed orders (negative quantities are not
/// rejected by the ledger) stay representable instead of wrapping.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn from_euros(euros: i64) -> Self {
        Self(euros.saturating_mul(100))
    }

    pub fn cents(self) -> i64 {
        self.0
    }

    /// Multiply by a count of units, saturating at the numeric bounds.
    pub fn times(self, units: i64) -> Self {
        Self(self.0.saturating_mul(units))
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}€{}.{:02}", abs / 100, abs % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn times_and_sum() {
        let unit = Money::from_euros(10);
        assert_eq!(unit.times(5), Money::from_euros(50));
        let total: Money = [Money::from_cents(150), Money::from_cents(250)].into_iter().sum();
        assert_eq!(total, Money::from_cents(400));
    }

    #[test]
    fn display_formats_cents() {
        assert_eq!(Money::from_cents(1234).to_string(), "€12.34");
        assert_eq!(Money::from_cents(-5).to_string(), "-€0.05");
    }
}
