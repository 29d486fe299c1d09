//! Analyzer configuration.
//!
//! Every field has a default, so an empty TOML file (or no file at all) gives
//! the stock setup: timeframes 5m/1h/4h/12h/1d with 1h as primary, 100 bars per
//! request, a 20-bar level window, and lookbacks 15m/1h/8h/24h.
//!
//! ```toml
//! timeframes = ["15m", "1h", "1d"]
//! primary_timeframe = "1h"
//! fetch_timeout_ms = 5000
//!
//! [thresholds]
//! rsi_oversold = 30.0
//! rsi_overbought = 70.0
//!
//! [[lookbacks]]
//! label = "4h"
//! minutes = 240
//! ```

use std::{collections::HashSet, path::Path, time::Duration};

use market_data::{
    models::{
        symbol::DEFAULT_QUOTE,
        timeframe::{
            TimeFrame,
            TimeFrameUnit::{Day, Hour, Minute},
        },
    },
    providers::binance_rest::{BinanceConfig, params::MAX_LIMIT, provider::DEFAULT_BASE_URL},
};
use nonzero_ext::nonzero;
use serde::{Deserialize, Serialize};
use shared_utils::config::{ConfigError, load_toml_path, load_toml_str};

use crate::{
    indicators::IndicatorParams, recommendation::VoteThresholds, trade_plan::TradeLevelParams,
};

/// A trailing period for price-change reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookbackCfg {
    /// Label used as the result key (e.g. `"24h"`).
    pub label: String,
    /// Length of the lookback in minutes.
    pub minutes: u32,
}

impl LookbackCfg {
    fn new(label: &str, minutes: u32) -> Self {
        Self {
            label: label.to_string(),
            minutes,
        }
    }
}

/// Exchange connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderCfg {
    /// REST base URL.
    pub base_url: String,
    /// Minimum spacing between requests.
    pub min_request_interval_ms: u64,
    /// HTTP timeout per request.
    pub request_timeout_ms: u64,
}

impl Default for ProviderCfg {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_request_interval_ms: 1200,
            request_timeout_ms: 10_000,
        }
    }
}

impl ProviderCfg {
    /// Connection settings for the Binance provider, API key taken from the
    /// environment when present.
    pub fn to_binance_config(&self) -> BinanceConfig {
        BinanceConfig {
            base_url: self.base_url.clone(),
            min_request_interval: Duration::from_millis(self.min_request_interval_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            api_key: None,
        }
        .with_env_key()
    }
}

/// Settings for [`Analyzer`](crate::analysis::Analyzer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    /// Quote asset appended to bare symbols.
    pub quote_currency: String,
    /// Timeframes evaluated in enhanced mode, in report order.
    pub timeframes: Vec<TimeFrame>,
    /// Timeframe that supplies price, levels and the trade plan.
    pub primary_timeframe: TimeFrame,
    /// Bars requested per timeframe.
    pub bars_per_request: u32,
    /// Trailing bars scanned for support/resistance.
    pub level_window: usize,
    /// Deadline for a single fetch.
    pub fetch_timeout_ms: u64,
    /// Fetches in flight at once for one request.
    pub max_concurrent_fetches: usize,
    /// Price-change lookbacks, in report order.
    pub lookbacks: Vec<LookbackCfg>,
    /// Indicator periods.
    pub indicators: IndicatorParams,
    /// RSI vote band.
    pub thresholds: VoteThresholds,
    /// ATR multiples for trade levels.
    pub trade_levels: TradeLevelParams,
    /// Exchange connection.
    pub provider: ProviderCfg,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            quote_currency: DEFAULT_QUOTE.to_string(),
            timeframes: vec![
                TimeFrame::new(nonzero!(5u32), Minute),
                TimeFrame::new(nonzero!(1u32), Hour),
                TimeFrame::new(nonzero!(4u32), Hour),
                TimeFrame::new(nonzero!(12u32), Hour),
                TimeFrame::new(nonzero!(1u32), Day),
            ],
            primary_timeframe: TimeFrame::new(nonzero!(1u32), Hour),
            bars_per_request: 100,
            level_window: crate::levels::DEFAULT_WINDOW,
            fetch_timeout_ms: 10_000,
            max_concurrent_fetches: 3,
            lookbacks: vec![
                LookbackCfg::new("15m", 15),
                LookbackCfg::new("1h", 60),
                LookbackCfg::new("8h", 480),
                LookbackCfg::new("24h", 1440),
            ],
            indicators: IndicatorParams::default(),
            thresholds: VoteThresholds::default(),
            trade_levels: TradeLevelParams::default(),
            provider: ProviderCfg::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Parse and validate a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let cfg: Self = load_toml_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a TOML file.
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let cfg: Self = load_toml_path(path)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Per-fetch deadline.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Reject settings that would make every analysis fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.quote_currency.trim().is_empty() {
            return invalid("quote_currency cannot be empty".into());
        }
        if self.timeframes.is_empty() {
            return invalid("timeframes cannot be empty".into());
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.timeframes.iter().find(|t| !seen.insert(**t)) {
            return invalid(format!("duplicate timeframe {dup}"));
        }
        if !self.timeframes.contains(&self.primary_timeframe) {
            return invalid(format!(
                "primary_timeframe {} is not one of the timeframes",
                self.primary_timeframe
            ));
        }

        let p = &self.indicators;
        let periods = [
            p.sma_period,
            p.ema_period,
            p.rsi_period,
            p.macd_fast,
            p.macd_slow,
            p.macd_signal,
            p.atr_period,
        ];
        if periods.contains(&0) {
            return invalid("indicator periods must be greater than zero".into());
        }
        if p.macd_fast >= p.macd_slow {
            return invalid("macd_fast must be shorter than macd_slow".into());
        }
        if (self.bars_per_request as usize) < p.min_history() {
            return invalid(format!(
                "bars_per_request {} is below the {} bars indicators need",
                self.bars_per_request,
                p.min_history()
            ));
        }
        if self.bars_per_request > MAX_LIMIT {
            return invalid(format!(
                "bars_per_request {} exceeds the exchange limit of {MAX_LIMIT}",
                self.bars_per_request
            ));
        }

        if self.thresholds.rsi_oversold > self.thresholds.rsi_overbought {
            return invalid("rsi_oversold must not exceed rsi_overbought".into());
        }
        if self.level_window == 0 {
            return invalid("level_window must be greater than zero".into());
        }
        if self.fetch_timeout_ms == 0 {
            return invalid("fetch_timeout_ms must be greater than zero".into());
        }
        if self.max_concurrent_fetches == 0 {
            return invalid("max_concurrent_fetches must be greater than zero".into());
        }
        if let Some(lb) = self.lookbacks.iter().find(|l| l.minutes == 0) {
            return invalid(format!("lookback {} must span at least one minute", lb.label));
        }
        if self.provider.min_request_interval_ms == 0 {
            return invalid("provider.min_request_interval_ms must be greater than zero".into());
        }
        Ok(())
    }
}
