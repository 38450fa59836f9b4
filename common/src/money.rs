//! [`Money`]-related definitions.

use std::{fmt, iter::Sum, str::FromStr};

use rust_decimal::Decimal;

/// Non-negative amount of money.
///
/// The CRM operates in a single currency, so only the amount is carried.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Deserialize, serde::Serialize),
    serde(transparent)
)]
pub struct Money(Decimal);

impl Money {
    /// [`Money`] amount of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a new [`Money`] if the given `amount` is non-negative.
    #[must_use]
    pub fn new(amount: Decimal) -> Option<Self> {
        (amount >= Decimal::ZERO).then_some(Self(amount))
    }

    /// Returns the [`Decimal`] amount of this [`Money`].
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.0
    }

    /// Adds the given [`Money`] to this one.
    ///
    /// [`None`] is returned on arithmetic overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Subtracts the given [`Money`] from this one, flooring at zero.
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        if rhs.0 >= self.0 {
            Self::ZERO
        } else {
            Self(self.0 - rhs.0)
        }
    }

    /// Multiplies this [`Money`] by the given non-negative quantity.
    ///
    /// [`None`] is returned on arithmetic overflow or a negative `quantity`.
    #[must_use]
    pub fn checked_mul(self, quantity: Decimal) -> Option<Self> {
        if quantity < Decimal::ZERO {
            return None;
        }
        self.0.checked_mul(quantity).map(Self)
    }

    /// Sums the given [`Money`] amounts.
    ///
    /// [`None`] is returned on arithmetic overflow.
    pub fn checked_sum(iter: impl IntoIterator<Item = Self>) -> Option<Self> {
        iter.into_iter()
            .try_fold(Self::ZERO, |acc, m| acc.checked_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s).map_err(|_| "invalid amount")?;
        Self::new(amount).ok_or("negative amount")
    }
}

impl From<u64> for Money {
    fn from(amount: u64) -> Self {
        Self(Decimal::from(amount))
    }
}

impl Sum<Money> for Option<Money> {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        Money::checked_sum(iter)
    }
}
