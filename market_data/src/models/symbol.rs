//! Trading pair symbols.
//!
//! User input such as `btc`, ` ETH/usdt ` or `SOL` is normalized into a
//! [`Symbol`] with an upper-case base and quote. A missing quote falls back to
//! the caller-supplied default (normally `USDT`).

use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

pub const DEFAULT_QUOTE: &str = "USDT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Symbol is empty")]
    Empty,

    #[error("Invalid symbol '{input}': {message}")]
    Invalid { input: String, message: String },
}

/// A normalized `BASE/QUOTE` trading pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    base: String,
    quote: String,
}

impl Symbol {
    /// Normalize user input into a pair, appending `default_quote` when the
    /// input carries no `/` separator.
    pub fn parse_with_quote(input: &str, default_quote: &str) -> Result<Self, SymbolError> {
        let cleaned = input.trim().to_uppercase();
        if cleaned.is_empty() {
            return Err(SymbolError::Empty);
        }

        let (base, quote) = match cleaned.split_once('/') {
            Some((base, quote)) => (base.trim().to_string(), quote.trim().to_string()),
            None => (cleaned.clone(), default_quote.trim().to_uppercase()),
        };

        let invalid = |message: &str| SymbolError::Invalid {
            input: input.to_string(),
            message: message.to_string(),
        };

        if base.len() < 2 {
            return Err(invalid("base asset must have at least two characters"));
        }
        if quote.is_empty() {
            return Err(invalid("quote asset is empty"));
        }
        let alnum = |s: &str| s.chars().all(|c| c.is_ascii_alphanumeric());
        if !alnum(&base) || !alnum(&quote) {
            return Err(invalid("only ASCII letters and digits are allowed"));
        }

        Ok(Self { base, quote })
    }

    /// Normalize with the [`DEFAULT_QUOTE`].
    pub fn parse(input: &str) -> Result<Self, SymbolError> {
        Self::parse_with_quote(input, DEFAULT_QUOTE)
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Concatenated pair as most exchange REST APIs expect it (`BTCUSDT`).
    pub fn exchange_pair(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
