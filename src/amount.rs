//! Tolerant parsing of monetary strings written by a language model.
//!
//! Nothing in here fails: text without a recognisable number is worth `0.0`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:,\d{3})*(?:\.\d+)?").expect("hardcoded regex should be valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    Dollar,
    Euro,
    Pound,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Dollar, Currency::Euro, Currency::Pound];

    pub fn symbol(self) -> char {
        match self {
            Currency::Dollar => '$',
            Currency::Euro => '€',
            Currency::Pound => '£',
        }
    }

    pub fn from_symbol(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|currency| currency.symbol() == c)
    }
}

/// True when `text` contains at least one of the recognised currency symbols.
pub fn contains_currency_symbol(text: &str) -> bool {
    text.chars().any(|c| Currency::from_symbol(c).is_some())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonetaryAmount {
    pub value: f64,
    /// First symbol seen in the source text, if any.
    pub currency: Option<Currency>,
}

impl MonetaryAmount {
    pub fn parse(text: &str) -> Self {
        Self {
            value: parse_amount(text),
            currency: text.chars().find_map(Currency::from_symbol),
        }
    }
}

impl fmt::Display for MonetaryAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.value < 0.0 { "-" } else { "" };
        match self.currency {
            Some(currency) => write!(f, "{}{}{:.2}", sign, currency.symbol(), self.value.abs()),
            None => write!(f, "{}{:.2}", sign, self.value.abs()),
        }
    }
}

/// Extract the first signed number from `text`, ignoring currency symbols,
/// whitespace and thousands separators.
///
/// ```
/// use statement_analyst::parse_amount;
///
/// assert_eq!(parse_amount("$1,234.56"), 1234.56);
/// assert_eq!(parse_amount("-€45"), -45.0);
/// assert_eq!(parse_amount("not a number"), 0.0);
/// ```
pub fn parse_amount(text: &str) -> f64 {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && Currency::from_symbol(*c).is_none())
        .collect();

    let Some(found) = NUMBER_PATTERN.find(&cleaned) else {
        return 0.0;
    };

    found.as_str().replace(',', "").parse::<f64>().unwrap_or(0.0)
}
