//! Bar interval expressed as amount × unit.
//!
//! A [`TimeFrame`] pairs a non-zero amount with a [`TimeFrameUnit`]. The string
//! form is the compact exchange notation used on the command line and as map
//! keys in results: `5m`, `1h`, `4h`, `12h`, `1d`, `1w`, `1M`.
//!
//! ```
//! use market_data::models::timeframe::{TimeFrame, TimeFrameUnit};
//!
//! let tf: TimeFrame = "4h".parse().unwrap();
//! assert_eq!(tf.amount.get(), 4);
//! assert_eq!(tf.unit, TimeFrameUnit::Hour);
//! assert_eq!(tf.to_string(), "4h");
//! ```

use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeFrameError {
    #[error("Invalid amount for {unit:?}: {message}")]
    InvalidAmount {
        unit: TimeFrameUnit,
        message: String,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeFrameUnit {
    Minute,
    Hour,
    Day,
    Week,
    /// Calendar month, approximated as 30 days where a duration is needed.
    Month,
}

impl TimeFrameUnit {
    const fn minutes(self) -> u64 {
        match self {
            TimeFrameUnit::Minute => 1,
            TimeFrameUnit::Hour => 60,
            TimeFrameUnit::Day => 1_440,
            TimeFrameUnit::Week => 10_080,
            TimeFrameUnit::Month => 43_200,
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            TimeFrameUnit::Minute => "m",
            TimeFrameUnit::Hour => "h",
            TimeFrameUnit::Day => "d",
            TimeFrameUnit::Week => "w",
            TimeFrameUnit::Month => "M",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeFrame {
    pub amount: NonZeroU32,
    pub unit: TimeFrameUnit,
}

impl TimeFrame {
    pub const fn new(amount: NonZeroU32, unit: TimeFrameUnit) -> Self {
        Self { amount, unit }
    }

    fn checked(amount: u32, unit: TimeFrameUnit) -> Result<Self, TimeFrameError> {
        let amount = NonZeroU32::new(amount).ok_or_else(|| TimeFrameError::InvalidAmount {
            unit,
            message: "amount must be greater than zero".into(),
        })?;
        Ok(Self::new(amount, unit))
    }

    pub fn minutes(amount: u32) -> Result<Self, TimeFrameError> {
        Self::checked(amount, TimeFrameUnit::Minute)
    }

    pub fn hours(amount: u32) -> Result<Self, TimeFrameError> {
        Self::checked(amount, TimeFrameUnit::Hour)
    }

    pub fn days(amount: u32) -> Result<Self, TimeFrameError> {
        Self::checked(amount, TimeFrameUnit::Day)
    }

    /// Length of one bar in minutes.
    pub fn in_minutes(&self) -> u64 {
        u64::from(self.amount.get()) * self.unit.minutes()
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount.get(), self.unit.suffix())
    }
}

impl FromStr for TimeFrame {
    type Err = TimeFrameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| TimeFrameError::InvalidInput {
                message: format!("missing unit in timeframe '{s}'"),
            })?;
        let (digits, unit) = s.split_at(split);
        if digits.is_empty() {
            return Err(TimeFrameError::InvalidInput {
                message: format!("missing amount in timeframe '{s}'"),
            });
        }
        let amount: u32 = digits.parse().map_err(|_| TimeFrameError::InvalidInput {
            message: format!("amount out of range in timeframe '{s}'"),
        })?;

        // `M` is month and `m` is minute; every other unit is case-insensitive.
        let unit = match unit {
            "m" | "min" => TimeFrameUnit::Minute,
            "M" | "mo" => TimeFrameUnit::Month,
            u => match u.to_ascii_lowercase().as_str() {
                "h" | "hr" => TimeFrameUnit::Hour,
                "d" => TimeFrameUnit::Day,
                "w" | "wk" => TimeFrameUnit::Week,
                _ => {
                    return Err(TimeFrameError::InvalidInput {
                        message: format!("unknown timeframe unit '{unit}'"),
                    });
                }
            },
        };
        Self::checked(amount, unit)
    }
}

impl TryFrom<String> for TimeFrame {
    type Error = TimeFrameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeFrame> for String {
    fn from(tf: TimeFrame) -> Self {
        tf.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exchange_notation() {
        let cases = [
            ("1m", 1, TimeFrameUnit::Minute),
            ("5m", 5, TimeFrameUnit::Minute),
            ("1h", 1, TimeFrameUnit::Hour),
            ("12h", 12, TimeFrameUnit::Hour),
            ("1d", 1, TimeFrameUnit::Day),
            ("1D", 1, TimeFrameUnit::Day),
            ("1w", 1, TimeFrameUnit::Week),
            ("1M", 1, TimeFrameUnit::Month),
        ];
        for (input, amount, unit) in cases {
            let tf: TimeFrame = input.parse().unwrap();
            assert_eq!(tf.amount.get(), amount, "{input}");
            assert_eq!(tf.unit, unit, "{input}");
        }
    }

    #[test]
    fn display_round_trips_canonical_labels() {
        for label in ["5m", "1h", "4h", "12h", "1d", "1w", "1M"] {
            let tf: TimeFrame = label.parse().unwrap();
            assert_eq!(tf.to_string(), label);
        }
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in ["", "h", "0m", "5", "5x", "-1h", "99999999999m"] {
            assert!(bad.parse::<TimeFrame>().is_err(), "{bad:?} should fail");
        }
    }

    #[test]
    fn zero_amount_is_invalid_amount() {
        match TimeFrame::hours(0) {
            Err(TimeFrameError::InvalidAmount { unit, .. }) => {
                assert_eq!(unit, TimeFrameUnit::Hour)
            }
            other => panic!("expected InvalidAmount, got {other:?}"),
        }
    }

    #[test]
    fn minutes_per_bar() {
        assert_eq!(TimeFrame::minutes(5).unwrap().in_minutes(), 5);
        assert_eq!(TimeFrame::hours(4).unwrap().in_minutes(), 240);
        assert_eq!(TimeFrame::days(1).unwrap().in_minutes(), 1_440);
    }

    #[test]
    fn serializes_as_label() {
        let tf = TimeFrame::hours(12).unwrap();
        assert_eq!(serde_json::to_string(&tf).unwrap(), "\"12h\"");
        let back: TimeFrame = serde_json::from_str("\"12h\"").unwrap();
        assert_eq!(back, tf);
    }
}
