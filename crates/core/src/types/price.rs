//! Monetary amounts using decimal arithmetic.
//!
//! Prices and order totals are [`rust_decimal::Decimal`] values wrapped in a
//! [`Price`] newtype that rejects negative amounts and surfaces arithmetic
//! overflow instead of wrapping. Floating point is never used for money.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors from constructing or combining [`Price`] values.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative")]
    Negative,
    /// Decimal arithmetic overflowed.
    #[error("price arithmetic overflow")]
    Overflow,
}

/// A non-negative monetary amount.
///
/// The invariant `amount >= 0` is established at construction and preserved
/// by every operation, matching the `price >= 0` and `total_amount >= 0`
/// check constraints on the corresponding columns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// A zero amount, the identity for [`Price::checked_add`].
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a `Price` from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a unit count (line-item extension: price x quantity).
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the product exceeds decimal range.
    pub fn checked_mul(&self, quantity: u32) -> Result<Self, PriceError> {
        self.0
            .checked_mul(Decimal::from(quantity))
            .map(Self)
            .ok_or(PriceError::Overflow)
    }

    /// Add another price (order-total accumulation).
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Overflow` if the sum exceeds decimal range.
    pub fn checked_add(&self, other: Self) -> Result<Self, PriceError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(PriceError::Overflow)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

// SQLx support (with postgres feature): stored as NUMERIC
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // The check constraint keeps stored amounts non-negative
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_rejects_negative() {
        assert_eq!(Price::new(dec("-0.01")), Err(PriceError::Negative));
        assert!(Price::new(Decimal::ZERO).is_ok());
        assert!(Price::new(dec("199.99")).is_ok());
    }

    #[test]
    fn test_line_item_extension() {
        let unit = Price::new(Decimal::from(100)).unwrap();
        let extended = unit.checked_mul(2).unwrap();
        assert_eq!(extended.amount(), Decimal::from(200));
    }

    #[test]
    fn test_total_accumulation() {
        let a = Price::new(dec("149.50")).unwrap();
        let b = Price::new(dec("0.50")).unwrap();
        let total = Price::ZERO
            .checked_add(a)
            .unwrap()
            .checked_add(b)
            .unwrap();
        assert_eq!(total.amount(), dec("150.00"));
    }

    #[test]
    fn test_mul_overflow() {
        let huge = Price::new(Decimal::MAX).unwrap();
        assert_eq!(huge.checked_mul(2), Err(PriceError::Overflow));
    }

    #[test]
    fn test_serde_validates_on_deserialize() {
        let price = Price::new(dec("19.99")).unwrap();
        let json = serde_json::to_string(&price).unwrap();
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);

        // A negative amount must not sneak in through a request body
        assert!(serde_json::from_str::<Price>("\"-5\"").is_err());
    }
}
