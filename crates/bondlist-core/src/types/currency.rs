//! Bond currency as labelled by the exchange listing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Settlement currency of a bond.
///
/// The listing labels currencies by their Russian names ("Рубль", "Доллар США")
/// while other sources use codes or symbols; [`Currency::parse`] accepts all of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Currency {
    /// Russian rouble, the domestic currency.
    #[default]
    Rub,
    /// United States dollar.
    Usd,
    /// Euro.
    Eur,
    /// Any other currency, kept as labelled.
    Other(String),
}

impl Currency {
    /// Maps a code, Russian name, or symbol to a currency.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        match label.to_uppercase().as_str() {
            "RUB" | "RUR" | "SUR" | "РУБЛЬ" | "РУБ" | "₽" => Currency::Rub,
            "USD" | "ДОЛЛАР США" | "$" => Currency::Usd,
            "EUR" | "ЕВРО" | "€" => Currency::Eur,
            _ => Currency::Other(label.to_string()),
        }
    }

    /// ISO code, or the original label for unknown currencies.
    pub fn code(&self) -> &str {
        match self {
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Other(label) => label,
        }
    }

    /// Returns true for the domestic currency.
    pub fn is_domestic(&self) -> bool {
        matches!(self, Currency::Rub)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<String> for Currency {
    fn from(label: String) -> Self {
        Currency::parse(&label)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.code().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_names() {
        assert_eq!(Currency::parse("Рубль"), Currency::Rub);
        assert_eq!(Currency::parse("Доллар США"), Currency::Usd);
        assert_eq!(Currency::parse("Евро"), Currency::Eur);
    }

    #[test]
    fn test_codes_and_symbols() {
        assert_eq!(Currency::parse("SUR"), Currency::Rub);
        assert_eq!(Currency::parse(" usd "), Currency::Usd);
        assert_eq!(Currency::parse("€"), Currency::Eur);
        assert_eq!(Currency::parse("CNY"), Currency::Other("CNY".into()));
        assert_eq!(Currency::parse("CNY").code(), "CNY");
    }

    #[test]
    fn test_serde_as_code() {
        assert_eq!(serde_json::to_string(&Currency::Usd).unwrap(), "\"USD\"");
        let c: Currency = serde_json::from_str("\"Рубль\"").unwrap();
        assert!(c.is_domestic());
    }
}
