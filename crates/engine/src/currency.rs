use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Currency used to display and parse amounts.
///
/// The server stores plain numbers without a currency; the client picks the
/// currency from configuration and uses it only for formatting and parsing.
///
/// ## Minor units
///
/// Amounts are held as an `i64` number of **minor units** (see `Money`).
/// `minor_units()` returns how many decimal digits separate major from minor
/// units. Example: EUR has 2 minor units, so `10.50 EUR` ⇄ `1050`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Eur,
    Usd,
    Gbp,
}

impl Currency {
    /// Canonical currency code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
        }
    }

    /// Symbol appended to formatted amounts.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Currency::Eur => "€",
            Currency::Usd => "$",
            Currency::Gbp => "£",
        }
    }

    /// Number of fraction digits used when formatting/parsing amounts.
    #[must_use]
    pub const fn minor_units(self) -> u8 {
        match self {
            Currency::Eur | Currency::Usd | Currency::Gbp => 2,
        }
    }

    /// Minor units per major unit (`100` for two fraction digits).
    #[must_use]
    pub const fn scale(self) -> i64 {
        10_i64.pow(self.minor_units() as u32)
    }
}

impl core::fmt::Display for Currency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<&str> for Currency {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "EUR" => Ok(Currency::Eur),
            "USD" => Ok(Currency::Usd),
            "GBP" => Ok(Currency::Gbp),
            other => Err(EngineError::UnsupportedCurrency(other.to_string())),
        }
    }
}
