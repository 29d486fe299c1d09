use chrono::{DateTime, Utc};
use serde::{Deserialize, de::IgnoredAny};

use crate::{
    models::bar::Bar,
    providers::{DecodeSnafu, ProviderError},
};

/// One row of the klines response.
///
/// Binance encodes each kline as a positional array with prices as strings:
/// `[open_time, open, high, low, close, volume, close_time, quote_volume,
/// trades, taker_base, taker_quote, ignore]`.
#[derive(Deserialize, Debug)]
pub struct BinanceKline(
    pub i64,
    pub String,
    pub String,
    pub String,
    pub String,
    pub String,
    pub IgnoredAny,
    pub IgnoredAny,
    pub u64,
    pub IgnoredAny,
    pub IgnoredAny,
    pub IgnoredAny,
);

/// Error body returned with non-2xx statuses.
#[derive(Deserialize, Debug)]
pub struct BinanceApiError {
    pub code: i64,
    pub msg: String,
}

fn price(field: &str, raw: &str) -> Result<f64, ProviderError> {
    raw.parse::<f64>().map_err(|_| {
        DecodeSnafu {
            message: format!("{field} is not a number: {raw:?}"),
        }
        .build()
    })
}

impl TryFrom<BinanceKline> for Bar {
    type Error = ProviderError;

    fn try_from(k: BinanceKline) -> Result<Self, Self::Error> {
        let timestamp = DateTime::<Utc>::from_timestamp_millis(k.0).ok_or_else(|| {
            DecodeSnafu {
                message: format!("open time out of range: {}", k.0),
            }
            .build()
        })?;
        Ok(Bar {
            timestamp,
            open: price("open", &k.1)?,
            high: price("high", &k.2)?,
            low: price("low", &k.3)?,
            close: price("close", &k.4)?,
            volume: price("volume", &k.5)?,
            trade_count: Some(k.8),
        })
    }
}

/// Decode a full klines body into bars, oldest first.
pub fn decode_klines(body: &str) -> Result<Vec<Bar>, ProviderError> {
    let rows: Vec<BinanceKline> = serde_json::from_str(body).map_err(|e| {
        DecodeSnafu {
            message: e.to_string(),
        }
        .build()
    })?;
    rows.into_iter().map(Bar::try_from).collect()
}

/// Best-effort extraction of `msg` from an error body.
pub fn api_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<BinanceApiError>(body)
        .ok()
        .map(|e| format!("{} (code {})", e.msg, e.code))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"[
        [1499040000000, "0.01634790", "0.80000000", "0.01575800", "0.01577100",
         "148976.11427815", 1499644799999, "2434.19055334", 308,
         "1756.87402397", "28.46694368", "0"],
        [1499043600000, "0.01577100", "0.01600000", "0.01570000", "0.01590000",
         "1000.0", 1499047199999, "15.9", 12, "500.0", "7.9", "0"]
    ]"#;

    #[test]
    fn decodes_positional_rows() {
        let bars = decode_klines(BODY).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp.timestamp_millis(), 1_499_040_000_000);
        assert_eq!(bars[0].open, 0.0163479);
        assert_eq!(bars[0].high, 0.8);
        assert_eq!(bars[0].close, 0.015771);
        assert_eq!(bars[0].trade_count, Some(308));
        assert_eq!(bars[1].close, 0.0159);
    }

    #[test]
    fn empty_array_is_empty_bars() {
        assert!(decode_klines("[]").unwrap().is_empty());
    }

    #[test]
    fn non_numeric_price_is_decode_error() {
        let body = r#"[[1499040000000, "abc", "1", "1", "1", "1", 0, "0", 1, "0", "0", "0"]]"#;
        let err = decode_klines(body).unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
        assert!(err.to_string().contains("open"));
    }

    #[test]
    fn wrong_shape_is_decode_error() {
        let err = decode_klines(r#"{"code":-1121,"msg":"Invalid symbol."}"#).unwrap_err();
        assert!(matches!(err, ProviderError::Decode { .. }));
    }

    #[test]
    fn extracts_api_error_message() {
        let msg = api_error_message(r#"{"code":-1121,"msg":"Invalid symbol."}"#).unwrap();
        assert_eq!(msg, "Invalid symbol. (code -1121)");
        assert!(api_error_message("<html>").is_none());
    }
}
