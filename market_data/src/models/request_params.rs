use serde::Serialize;

use crate::models::{symbol::Symbol, timeframe::TimeFrame};

/// Universal parameters for requesting the most recent bars of one pair.
///
/// Validation of the timeframe against what an exchange actually offers is
/// left to each [`DataProvider`](crate::providers::DataProvider)
/// implementation.
#[derive(Clone, Debug, Serialize)]
pub struct BarsRequestParams {
    /// The pair to request.
    pub symbol: Symbol,

    /// The time interval for each bar.
    pub timeframe: TimeFrame,

    /// How many of the most recent bars to return, oldest first.
    pub limit: u32,
}

impl BarsRequestParams {
    pub fn new(symbol: Symbol, timeframe: TimeFrame, limit: u32) -> Self {
        Self {
            symbol,
            timeframe,
            limit,
        }
    }
}
