use snafu::ensure;

use crate::{
    models::{
        request_params::BarsRequestParams,
        timeframe::{TimeFrame, TimeFrameUnit},
    },
    providers::{ProviderError, ValidationSnafu},
};

/// Largest `limit` the klines endpoint accepts.
pub const MAX_LIMIT: u32 = 1000;

/// Binance only serves a fixed set of kline intervals.
pub fn validate_timeframe(timeframe: &TimeFrame) -> Result<(), ProviderError> {
    let amount = timeframe.amount.get();
    let supported = match timeframe.unit {
        TimeFrameUnit::Minute => [1, 3, 5, 15, 30].contains(&amount),
        TimeFrameUnit::Hour => [1, 2, 4, 6, 8, 12].contains(&amount),
        TimeFrameUnit::Day => [1, 3].contains(&amount),
        TimeFrameUnit::Week | TimeFrameUnit::Month => amount == 1,
    };
    ensure!(
        supported,
        ValidationSnafu {
            message: format!("interval {timeframe} is not offered by Binance"),
        }
    );
    Ok(())
}

pub fn validate_limit(limit: u32) -> Result<(), ProviderError> {
    ensure!(
        (1..=MAX_LIMIT).contains(&limit),
        ValidationSnafu {
            message: format!("limit must be between 1 and {MAX_LIMIT}, got {limit}"),
        }
    );
    Ok(())
}

/// Query string for `GET /api/v3/klines`.
pub fn construct_params(params: &BarsRequestParams) -> Vec<(&'static str, String)> {
    vec![
        ("symbol", params.symbol.exchange_pair()),
        ("interval", params.timeframe.to_string()),
        ("limit", params.limit.to_string()),
    ]
}
