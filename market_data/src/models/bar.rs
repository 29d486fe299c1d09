//! Canonical in-memory representation of a time-series bar (OHLCV).
//!
//! This struct is the standard output of every
//! [`DataProvider`](crate::providers::DataProvider) implementation, whatever
//! the exchange it talks to.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single time-series bar (OHLCV) for a given timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    /// Open time of the bar (UTC).
    pub timestamp: DateTime<Utc>,

    /// Opening price.
    pub open: f64,

    /// Highest price during the bar interval.
    pub high: f64,

    /// Lowest price during the bar interval.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Base-asset volume traded during the bar interval.
    pub volume: f64,

    /// Trade count for the bar. Not all providers supply this.
    pub trade_count: Option<u64>,
}

impl Bar {
    /// True range against the previous bar's close.
    ///
    /// Without a previous close this is just `high - low`.
    pub fn true_range(&self, prev_close: Option<f64>) -> f64 {
        let range = self.high - self.low;
        match prev_close {
            Some(pc) => range
                .max((self.high - pc).abs())
                .max((self.low - pc).abs()),
            None => range,
        }
    }

    pub(crate) fn prices(&self) -> [f64; 4] {
        [self.open, self.high, self.low, self.close]
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn bar(high: f64, low: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            open: low,
            high,
            low,
            close: high,
            volume: 1.0,
            trade_count: None,
        }
    }

    #[test]
    fn true_range_uses_gaps() {
        let b = bar(105.0, 100.0);
        assert_eq!(b.true_range(None), 5.0);
        assert_eq!(b.true_range(Some(102.0)), 5.0);
        // gap down from 110
        assert_eq!(b.true_range(Some(110.0)), 10.0);
        // gap up from 90
        assert_eq!(b.true_range(Some(90.0)), 15.0);
    }
}
