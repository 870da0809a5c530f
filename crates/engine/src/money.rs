use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use crate::{Currency, EngineError};

/// Signed money amount represented as **integer minor units** (cents).
///
/// The API sends amounts as floating-point major units; they are converted
/// once with [`Money::from_major`] and every sum, difference and comparison
/// afterwards runs on integers, so totals never drift and do not depend on
/// the order they were added in.
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let amount = Money::from_major(12.34, Currency::Eur);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.format(Currency::Eur), "12.34€");
/// ```
///
/// Parsing from user input (accepts `.` or `,` as decimal separator; rejects
/// more fraction digits than the currency has):
///
/// ```rust
/// use engine::{Currency, Money};
///
/// assert_eq!(Money::parse_major("10,5", Currency::Eur).unwrap().minor(), 1050);
/// assert!(Money::parse_major("12.345", Currency::Eur).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Converts a wire amount (major units) to minor units, rounding to the
    /// nearest minor unit. Non-finite input maps to zero and out-of-range
    /// values saturate.
    #[must_use]
    pub fn from_major(value: f64, currency: Currency) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        Self((value * currency.scale() as f64).round() as i64)
    }

    /// Converts back to major units for the wire.
    #[must_use]
    pub fn to_major(self, currency: Currency) -> f64 {
        self.0 as f64 / currency.scale() as f64
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

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Returns `max(self, 0)`.
    #[must_use]
    pub fn clamp_non_negative(self) -> Self {
        Self(self.0.max(0))
    }

    /// Formats the amount with the currency's fraction digits and symbol,
    /// e.g. `-10.50€`.
    #[must_use]
    pub fn format(self, currency: Currency) -> String {
        let scale = currency.scale().unsigned_abs();
        let digits = usize::from(currency.minor_units());
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let major = abs / scale;
        let fraction = abs % scale;
        if digits == 0 {
            return format!("{sign}{major}{}", currency.symbol());
        }
        format!(
            "{sign}{major}.{fraction:0digits$}{}",
            currency.symbol()
        )
    }

    /// Parses a decimal string in major units.
    ///
    /// Accepts `.` or `,` as decimal separator and an optional leading `+`/`-`.
    ///
    /// Validation rules:
    /// - at most `currency.minor_units()` fractional digits
    /// - rejects empty/invalid strings
    pub fn parse_major(s: &str, currency: Currency) -> Result<Self, EngineError> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim();
        if rest.is_empty() {
            return Err(empty());
        }

        let rest = rest.replace(',', ".");
        let mut parts = rest.split('.');
        let major_str = parts.next().ok_or_else(invalid)?;
        let fraction_str = parts.next();

        if parts.next().is_some() {
            return Err(invalid());
        }

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let major: i64 = major_str.parse().map_err(|_| overflow())?;

        let digits = usize::from(currency.minor_units());
        let fraction: i64 = match fraction_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                if frac.len() > digits {
                    return Err(EngineError::InvalidAmount("too many decimals".to_string()));
                }
                let padded = format!("{frac:0<digits$}");
                padded.parse::<i64>().map_err(|_| invalid())?
            }
        };

        let total = major
            .checked_mul(currency.scale())
            .and_then(|v| v.checked_add(fraction))
            .ok_or_else(overflow)?;

        let signed = if negative {
            total.checked_neg().ok_or_else(overflow)?
        } else {
            total
        };

        Ok(Money(signed))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(Currency::default()))
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
        Money(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(self.0.saturating_neg())
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
