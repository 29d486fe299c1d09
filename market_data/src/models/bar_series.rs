//! A collection of time-series bars for a specific symbol and timeframe.

use serde::Serialize;
use thiserror::Error;

use crate::models::{bar::Bar, symbol::Symbol, timeframe::TimeFrame};

#[derive(Debug, Error, PartialEq)]
pub enum BarSeriesError {
    #[error("Bar series for {symbol} {timeframe} is empty")]
    Empty { symbol: String, timeframe: String },

    #[error("Bar {index} has a non-positive or non-finite price")]
    InvalidPrice { index: usize },

    #[error("Bar {index} is not strictly after the previous bar")]
    OutOfOrder { index: usize },
}

/// Represents a complete set of time-series data for a single symbol.
///
/// Bars are kept in chronological order; the last element is the latest bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    /// The pair this data represents (e.g. `BTC/USDT`).
    pub symbol: Symbol,
    /// The time interval for each bar in the series.
    pub timeframe: TimeFrame,
    /// The collection of OHLCV bars, oldest first.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: Symbol, timeframe: TimeFrame, bars: Vec<Bar>) -> Self {
        Self {
            symbol,
            timeframe,
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    /// The most recent bar.
    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// The trailing `n` bars, or every bar when the series is shorter.
    pub fn tail(&self, n: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }

    /// Check the invariants downstream computation relies on: at least one
    /// bar, positive finite prices, strictly increasing timestamps.
    pub fn validate(&self) -> Result<(), BarSeriesError> {
        if self.bars.is_empty() {
            return Err(BarSeriesError::Empty {
                symbol: self.symbol.to_string(),
                timeframe: self.timeframe.to_string(),
            });
        }
        for (index, bar) in self.bars.iter().enumerate() {
            if bar.prices().iter().any(|p| !p.is_finite() || *p <= 0.0) {
                return Err(BarSeriesError::InvalidPrice { index });
            }
            if index > 0 && bar.timestamp <= self.bars[index - 1].timestamp {
                return Err(BarSeriesError::OutOfOrder { index });
            }
        }
        Ok(())
    }
}
