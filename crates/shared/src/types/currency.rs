//! Currencies a journal can be kept in.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` everywhere; this module only names
//! the currency.

use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Peruvian Sol, the local (functional) currency.
    Pen,
    /// US Dollar
    Usd,
    /// Euro
    Eur,
}

impl Currency {
    /// The functional currency every ledger line is translated into.
    pub const LOCAL: Self = Self::Pen;

    /// Returns true for the local currency.
    #[must_use]
    pub const fn is_local(self) -> bool {
        matches!(self, Self::Pen)
    }

    /// Returns the ISO 4217 code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Pen => "PEN",
            Self::Usd => "USD",
            Self::Eur => "EUR",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PEN" => Ok(Self::Pen),
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_local_currency() {
        assert_eq!(Currency::LOCAL, Currency::Pen);
        assert!(Currency::Pen.is_local());
        assert!(!Currency::Usd.is_local());
        assert!(!Currency::Eur.is_local());
    }

    #[test]
    fn test_currency_display() {
        assert_eq!(Currency::Pen.to_string(), "PEN");
        assert_eq!(Currency::Usd.to_string(), "USD");
        assert_eq!(Currency::Eur.to_string(), "EUR");
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(Currency::from_str("PEN").unwrap(), Currency::Pen);
        assert_eq!(Currency::from_str("usd").unwrap(), Currency::Usd);
        assert_eq!(Currency::from_str(" eur ").unwrap(), Currency::Eur);

        assert!(Currency::from_str("XXX").is_err());
        assert!(Currency::from_str("").is_err());
    }

    #[test]
    fn test_currency_serde_uppercase() {
        assert_eq!(serde_json::to_string(&Currency::Pen).unwrap(), "\"PEN\"");
        let parsed: Currency = serde_json::from_str("\"USD\"").unwrap();
        assert_eq!(parsed, Currency::Usd);
    }
}
