//! Error taxonomy of the signal pipeline.

use market_data::models::{symbol::SymbolError, timeframe::TimeFrameError};
use thiserror::Error;

/// Errors surfaced by the analysis entry points.
///
/// A degenerate trade plan (stop equal to entry) is not an error: its
/// risk/reward ratio resolves to 0.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SignalError {
    /// Malformed symbol or timeframe from the caller.
    #[error("Invalid input: {message}")]
    InputInvalid {
        /// What was wrong with the input.
        message: String,
    },

    /// The data source failed, timed out, or returned unusable bars.
    #[error("No data for {symbol} {timeframe}: {reason}")]
    DataUnavailable {
        /// Pair the fetch was for.
        symbol: String,
        /// Timeframe label the fetch was for.
        timeframe: String,
        /// Underlying failure.
        reason: String,
    },

    /// Too few bars for every indicator to be defined on the latest bar.
    #[error("Insufficient history: need {required} bars, have {available}")]
    InsufficientHistory {
        /// Minimum bar count for a complete snapshot.
        required: usize,
        /// Bars actually available.
        available: usize,
    },
}

impl From<SymbolError> for SignalError {
    fn from(e: SymbolError) -> Self {
        SignalError::InputInvalid {
            message: e.to_string(),
        }
    }
}

impl From<TimeFrameError> for SignalError {
    fn from(e: TimeFrameError) -> Self {
        SignalError::InputInvalid {
            message: e.to_string(),
        }
    }
}
