//! Type-safe price representation using decimal arithmetic.
//!
//! Amounts are kept in the currency's standard unit (rupees, dollars), which
//! is also what the payment service expects when creating a payment intent.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., rupees, not paisa).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Whether the amount reaches the payment service's minimum charge.
    #[must_use]
    pub fn meets_minimum_charge(&self) -> bool {
        self.amount >= self.currency_code.minimum_charge()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.2}",
            self.currency_code.symbol(),
            self.amount.round_dp(2)
        )
    }
}

/// Error returned when a currency code is not supported.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported currency: {0}")]
pub struct CurrencyCodeError(pub String);

/// ISO 4217 currency codes accepted by the payment service.
///
/// Serialized lower-case, matching the payment service's wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyCode {
    #[default]
    PKR,
    USD,
    EUR,
    GBP,
    INR,
}

impl CurrencyCode {
    /// Lower-case code as sent to the payment service.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::PKR => "pkr",
            Self::USD => "usd",
            Self::EUR => "eur",
            Self::GBP => "gbp",
            Self::INR => "inr",
        }
    }

    /// Display symbol.
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::PKR => "Rs",
            Self::USD => "$",
            Self::EUR => "€",
            Self::GBP => "£",
            Self::INR => "₹",
        }
    }

    /// Smallest amount the payment service will charge in this currency.
    ///
    /// Roughly USD 0.50 everywhere, so processing fees are covered.
    #[must_use]
    pub const fn minimum_charge(&self) -> Decimal {
        match self {
            Self::PKR => Decimal::from_parts(185, 0, 0, false, 0),
            Self::USD | Self::EUR => Decimal::from_parts(50, 0, 0, false, 2),
            Self::GBP => Decimal::from_parts(30, 0, 0, false, 2),
            Self::INR => Decimal::from_parts(42, 0, 0, false, 0),
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = CurrencyCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pkr" => Ok(Self::PKR),
            "usd" => Ok(Self::USD),
            "eur" => Ok(Self::EUR),
            "gbp" => Ok(Self::GBP),
            "inr" => Ok(Self::INR),
            _ => Err(CurrencyCodeError(s.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_minimum_charges() {
        assert_eq!(CurrencyCode::PKR.minimum_charge(), Decimal::new(185, 0));
        assert_eq!(CurrencyCode::USD.minimum_charge(), Decimal::new(50, 2));
        assert_eq!(CurrencyCode::EUR.minimum_charge(), Decimal::new(50, 2));
        assert_eq!(CurrencyCode::GBP.minimum_charge(), Decimal::new(30, 2));
        assert_eq!(CurrencyCode::INR.minimum_charge(), Decimal::new(42, 0));
    }

    #[test]
    fn test_meets_minimum_charge() {
        assert!(!Price::new(Decimal::new(184, 0), CurrencyCode::PKR).meets_minimum_charge());
        assert!(Price::new(Decimal::new(185, 0), CurrencyCode::PKR).meets_minimum_charge());
        assert!(Price::new(Decimal::new(50, 2), CurrencyCode::USD).meets_minimum_charge());
    }

    #[test]
    fn test_display() {
        let price = Price::new(Decimal::new(4505, 1), CurrencyCode::PKR);
        assert_eq!(price.to_string(), "Rs 450.50");
        let price = Price::new(Decimal::new(3, 0), CurrencyCode::USD);
        assert_eq!(price.to_string(), "$ 3.00");
    }

    #[test]
    fn test_currency_parse_is_case_insensitive() {
        assert_eq!(CurrencyCode::from_str("PKR").unwrap(), CurrencyCode::PKR);
        assert_eq!(CurrencyCode::from_str(" usd ").unwrap(), CurrencyCode::USD);
        assert!(CurrencyCode::from_str("jpy").is_err());
    }

    #[test]
    fn test_currency_serializes_lowercase() {
        let json = serde_json::to_string(&CurrencyCode::GBP).unwrap();
        assert_eq!(json, "\"gbp\"");
    }
}
