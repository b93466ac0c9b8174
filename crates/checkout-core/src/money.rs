//! # Money
//!
//! Fixed-point currency amounts for checkout.
//!
//! An amount is split into whole `units` and fractional `nanos` (billionths of a
//! unit). Both parts always share a sign, and `|nanos| < 1_000_000_000`. Arithmetic
//! is carried out on the combined nano count in `i128`, so sums and line totals are
//! exact and overflow is reported instead of wrapped.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of nanos in one whole currency unit
pub const NANOS_PER_UNIT: i32 = 1_000_000_000;

const NANOS_MOD: i128 = NANOS_PER_UNIT as i128;

/// Errors raised by money arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The value breaks the nanos bound, the sign rule, or has a bad currency code
    #[error("invalid money value {units}.{nanos} {currency_code}: {reason}")]
    InvalidMoney {
        currency_code: String,
        units: i64,
        nanos: i32,
        reason: &'static str,
    },

    /// Operands carry different currencies
    #[error("currency mismatch: {left} vs {right}")]
    CurrencyMismatch { left: String, right: String },

    /// Result does not fit in the units field
    #[error("arithmetic overflow in {currency_code} amount")]
    ArithmeticOverflow { currency_code: String },
}

/// Result type alias for money operations
pub type MoneyResult<T> = Result<T, MoneyError>;

/// An exact amount in a single currency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// ISO 4217 style code, e.g. "USD"
    pub currency_code: String,
    /// Whole units, may be negative
    pub units: i64,
    /// Fractional part in billionths, same sign as `units`
    pub nanos: i32,
}

impl Money {
    /// Create a validated amount
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> MoneyResult<Self> {
        let money = Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        };
        money.validate()?;
        Ok(money)
    }

    /// Zero in the given currency
    pub fn zero(currency_code: impl Into<String>) -> Self {
        Self {
            currency_code: currency_code.into(),
            units: 0,
            nanos: 0,
        }
    }

    /// Whole-unit amount (no fractional part)
    pub fn from_units(currency_code: impl Into<String>, units: i64) -> Self {
        Self {
            currency_code: currency_code.into(),
            units,
            nanos: 0,
        }
    }

    /// Check the nanos bound, the sign rule and the currency code.
    pub fn validate(&self) -> MoneyResult<()> {
        let invalid = |reason| MoneyError::InvalidMoney {
            currency_code: self.currency_code.clone(),
            units: self.units,
            nanos: self.nanos,
            reason,
        };

        if self.currency_code.is_empty()
            || !self.currency_code.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(invalid("currency code must be non-empty ASCII letters"));
        }
        if self.nanos <= -NANOS_PER_UNIT || self.nanos >= NANOS_PER_UNIT {
            return Err(invalid("nanos out of range"));
        }
        if (self.units > 0 && self.nanos < 0) || (self.units < 0 && self.nanos > 0) {
            return Err(invalid("units and nanos have opposite signs"));
        }
        Ok(())
    }

    /// Returns true if the value passes [`Money::validate`]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn is_zero(&self) -> bool {
        self.units == 0 && self.nanos == 0
    }

    pub fn is_positive(&self) -> bool {
        self.units > 0 || (self.units == 0 && self.nanos > 0)
    }

    pub fn is_negative(&self) -> bool {
        self.units < 0 || (self.units == 0 && self.nanos < 0)
    }

    /// Returns true if both amounts carry the same non-empty currency code
    pub fn same_currency(&self, other: &Money) -> bool {
        !self.currency_code.is_empty() && self.currency_code == other.currency_code
    }

    /// Flip the sign of the amount.
    ///
    /// `i64::MIN` units cannot be negated and yield `ArithmeticOverflow`.
    pub fn negate(&self) -> MoneyResult<Money> {
        let units = self
            .units
            .checked_neg()
            .ok_or_else(|| self.overflow())?;
        Ok(Money {
            currency_code: self.currency_code.clone(),
            units,
            nanos: -self.nanos,
        })
    }

    /// Add two amounts with carry between nanos and units.
    ///
    /// A zero operand adopts the other operand's currency, so a zero of any
    /// currency can seed an accumulator.
    pub fn sum(&self, other: &Money) -> MoneyResult<Money> {
        self.validate()?;
        other.validate()?;

        if other.is_zero() {
            return Ok(self.clone());
        }
        if self.is_zero() {
            return Ok(other.clone());
        }
        if !self.same_currency(other) {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency_code.clone(),
                right: other.currency_code.clone(),
            });
        }

        let total = self.total_nanos() + other.total_nanos();
        Self::from_total_nanos(&self.currency_code, total)
    }

    /// Like [`Money::sum`], for call sites where both operands are known to share
    /// a currency.
    ///
    /// # Panics
    ///
    /// Panics on any `sum` error. A failure here is a logic defect in the caller.
    pub fn must_sum(&self, other: &Money) -> Money {
        match self.sum(other) {
            Ok(total) => total,
            Err(e) => panic!("money invariant violated: {e}"),
        }
    }

    /// Multiply by a quantity, e.g. unit price times items ordered.
    pub fn multiply(&self, quantity: u32) -> MoneyResult<Money> {
        self.validate()?;
        let total = self
            .total_nanos()
            .checked_mul(i128::from(quantity))
            .ok_or_else(|| self.overflow())?;
        Self::from_total_nanos(&self.currency_code, total)
    }

    fn total_nanos(&self) -> i128 {
        i128::from(self.units) * NANOS_MOD + i128::from(self.nanos)
    }

    // Truncating division keeps the remainder's sign equal to the dividend's,
    // so units and nanos come out sign-normalized.
    fn from_total_nanos(currency_code: &str, total: i128) -> MoneyResult<Money> {
        let units = i64::try_from(total / NANOS_MOD).map_err(|_| MoneyError::ArithmeticOverflow {
            currency_code: currency_code.to_string(),
        })?;
        let nanos = (total % NANOS_MOD) as i32;
        let money = Money {
            currency_code: currency_code.to_string(),
            units,
            nanos,
        };
        money.validate()?;
        Ok(money)
    }

    fn overflow(&self) -> MoneyError {
        MoneyError::ArithmeticOverflow {
            currency_code: self.currency_code.clone(),
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        write!(
            f,
            "{}{}.{:09} {}",
            sign,
            self.units.unsigned_abs(),
            self.nanos.unsigned_abs(),
            self.currency_code
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(units: i64, nanos: i32) -> Money {
        Money::new("USD", units, nanos).unwrap()
    }

    #[test]
    fn test_validate() {
        assert!(usd(1, 500_000_000).is_valid());
        assert!(Money::new("USD", -1, -500_000_000).is_ok());
        assert!(Money::new("USD", 0, -5).is_ok());

        assert!(matches!(
            Money::new("USD", 1, -1),
            Err(MoneyError::InvalidMoney { .. })
        ));
        assert!(matches!(
            Money::new("USD", -1, 1),
            Err(MoneyError::InvalidMoney { .. })
        ));
        assert!(matches!(
            Money::new("USD", 0, NANOS_PER_UNIT),
            Err(MoneyError::InvalidMoney { .. })
        ));
        assert!(matches!(
            Money::new("", 1, 0),
            Err(MoneyError::InvalidMoney { .. })
        ));
    }

    #[test]
    fn test_sign_predicates() {
        assert!(Money::zero("EUR").is_zero());
        assert!(usd(0, 1).is_positive());
        assert!(usd(0, -1).is_negative());
        assert!(!usd(0, 0).is_positive());
        assert!(!usd(0, 0).is_negative());
    }

    #[test]
    fn test_sum_carries_nanos() {
        let total = usd(0, 900_000_000).sum(&usd(0, 200_000_000)).unwrap();
        assert_eq!(total, usd(1, 100_000_000));

        let total = usd(3, 999_999_999).sum(&usd(0, 1)).unwrap();
        assert_eq!(total, usd(4, 0));
    }

    #[test]
    fn test_sum_mixed_signs_normalizes() {
        let total = usd(-1, -500_000_000).sum(&usd(0, 200_000_000)).unwrap();
        assert_eq!(total, usd(-1, -300_000_000));

        let total = usd(1, 0).sum(&usd(0, -300_000_000)).unwrap();
        assert_eq!(total, usd(0, 700_000_000));

        let total = usd(2, 100_000_000).sum(&usd(-3, 0)).unwrap();
        assert_eq!(total, usd(0, -900_000_000));
    }

    #[test]
    fn test_sum_with_negation_is_zero() {
        for m in [usd(10, 0), usd(0, 1), usd(-7, -250_000_000), usd(123_456, 999_999_999)] {
            let total = m.sum(&m.negate().unwrap()).unwrap();
            assert!(total.is_zero());
            assert_eq!(total.currency_code, "USD");
        }
    }

    #[test]
    fn test_sum_currency_mismatch() {
        let eur = Money::from_units("EUR", 3);
        let err = usd(1, 0).sum(&eur).unwrap_err();
        assert_eq!(
            err,
            MoneyError::CurrencyMismatch {
                left: "USD".into(),
                right: "EUR".into()
            }
        );
    }

    #[test]
    fn test_sum_zero_adopts_other_currency() {
        let eur = Money::from_units("EUR", 3);
        assert_eq!(Money::zero("USD").sum(&eur).unwrap(), eur);
        assert_eq!(eur.sum(&Money::zero("USD")).unwrap(), eur);
    }

    #[test]
    fn test_sum_overflow() {
        let err = usd(i64::MAX, 0).sum(&usd(1, 0)).unwrap_err();
        assert!(matches!(err, MoneyError::ArithmeticOverflow { .. }));

        let err = usd(i64::MAX, 999_999_999).sum(&usd(0, 1)).unwrap_err();
        assert!(matches!(err, MoneyError::ArithmeticOverflow { .. }));
    }

    #[test]
    fn test_sum_rejects_invalid_operand() {
        let bad = Money {
            currency_code: "USD".into(),
            units: 1,
            nanos: -1,
        };
        assert!(matches!(
            usd(1, 0).sum(&bad),
            Err(MoneyError::InvalidMoney { .. })
        ));
    }

    #[test]
    fn test_negate_min_overflows() {
        let m = Money::from_units("USD", i64::MIN);
        assert!(matches!(m.negate(), Err(MoneyError::ArithmeticOverflow { .. })));
    }

    #[test]
    #[should_panic(expected = "money invariant violated")]
    fn test_must_sum_panics_on_mismatch() {
        usd(1, 0).must_sum(&Money::from_units("JPY", 100));
    }

    #[test]
    fn test_multiply() {
        assert_eq!(usd(10, 0).multiply(2).unwrap(), usd(20, 0));
        assert_eq!(usd(0, 600_000_000).multiply(3).unwrap(), usd(1, 800_000_000));
        assert_eq!(usd(-1, -500_000_000).multiply(2).unwrap(), usd(-3, 0));
        assert!(usd(5, 0).multiply(0).unwrap().is_zero());
        assert!(matches!(
            usd(i64::MAX / 2, 0).multiply(3),
            Err(MoneyError::ArithmeticOverflow { .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(usd(25, 0).to_string(), "25.000000000 USD");
        assert_eq!(usd(0, -50_000_000).to_string(), "-0.050000000 USD");
        assert_eq!(usd(-3, -1).to_string(), "-3.000000001 USD");
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(usd(5, 990_000_000)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"currency_code": "USD", "units": 5, "nanos": 990000000})
        );
    }
}
