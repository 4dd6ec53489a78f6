//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are stored as `numeric` in the data store and travel as JSON
//! numbers or strings; both deserialize into an exact [`Decimal`].

use core::fmt;
use core::iter::Sum;
use core::ops::Add;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in the store currency (dollars, not cents).
///
/// Arithmetic is exact: a cart subtotal is the plain decimal sum of its
/// lines, with no rounding beyond the precision the store already holds.
///
/// ```
/// use rust_decimal::Decimal;
/// use shopfront_core::Price;
///
/// let shoe = Price::new(Decimal::from(40));
/// let total: Price = [shoe.times(1), shoe.times(1)].into_iter().sum();
/// assert_eq!(total.to_string(), "$80.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Zero dollars.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The exact decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Price of `quantity` units, saturating at the largest representable
    /// amount.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Whether the amount is strictly positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Discount of `self` relative to a higher `original` price, as a whole
    /// percentage rounded half away from zero.
    ///
    /// Returns `None` when `original` is not positive or the ratio does not
    /// fit in a decimal.
    #[must_use]
    pub fn discount_percent_from(&self, original: Self) -> Option<i64> {
        if !original.is_positive() {
            return None;
        }
        let ratio = original
            .0
            .checked_sub(self.0)?
            .checked_div(original.0)?
            .checked_mul(Decimal::ONE_HUNDRED)?;
        let rounded = ratio.round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        i64::try_from(rounded).ok()
    }
}

impl fmt::Display for Price {
    /// Formats as `$` followed by the amount.
    ///
    /// Amounts with at most two decimal places are padded to cents; amounts
    /// stored with finer precision are printed in full rather than rounded.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.scale() <= 2 {
            write!(f, "${:.2}", self.0)
        } else {
            write!(f, "${}", self.0.normalize())
        }
    }
}

impl Add for Price {
    type Output = Self;

    /// Saturates at the largest representable amount.
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}
