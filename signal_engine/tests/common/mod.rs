#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use market_data::{
    models::{
        bar::Bar, bar_series::BarSeries, request_params::BarsRequestParams, symbol::Symbol,
        timeframe::TimeFrame,
    },
    providers::{DataProvider, InternalSnafu, ProviderError, ValidationSnafu},
};
use signal_engine::config::AnalyzerConfig;

pub fn tf(label: &str) -> TimeFrame {
    label.parse().unwrap()
}

pub fn btc() -> Symbol {
    Symbol::parse("BTC").unwrap()
}

/// Bars with `open` at the previous close and wicks `spread` beyond the body.
pub fn bars_from_closes(closes: &[f64], spread: f64, timeframe: TimeFrame) -> Vec<Bar> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let step = chrono::Duration::minutes(timeframe.in_minutes() as i64);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: start + step * i as i32,
                open,
                high: open.max(close) + spread,
                low: open.min(close) - spread,
                close,
                volume: 1_000.0,
                trade_count: None,
            }
        })
        .collect()
}

pub fn flat(n: usize, price: f64) -> Vec<f64> {
    vec![price; n]
}

/// Accelerating uptrend: every close 1% above the previous one.
pub fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 * 1.01_f64.powi(i as i32)).collect()
}

/// A wavy series whose indicators are all defined and non-degenerate.
pub fn wave(n: usize, base: f64) -> Vec<f64> {
    (0..n)
        .map(|i| base + (i as f64 * 0.7).sin() * 3.0 + i as f64 * 0.05)
        .collect()
}

/// Config over `timeframes` with `1h` as primary and no lookbacks.
pub fn config_for(timeframes: &[&str]) -> AnalyzerConfig {
    AnalyzerConfig {
        timeframes: timeframes.iter().map(|t| tf(t)).collect(),
        primary_timeframe: tf("1h"),
        lookbacks: Vec::new(),
        fetch_timeout_ms: 1_000,
        ..AnalyzerConfig::default()
    }
}

#[derive(Clone)]
pub enum Script {
    Closes(Vec<f64>),
    Slow(Duration, Vec<f64>),
    Fail(String),
    Reject(String),
}

/// Provider answering per timeframe label from a fixed script.
///
/// Unscripted timeframes fail. Responses are trimmed to the requested limit,
/// keeping the newest bars.
pub struct ScriptedProvider {
    scripts: HashMap<String, Script>,
    spread: f64,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    requests: Mutex<Vec<(String, u32)>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            scripts: HashMap::new(),
            spread: 0.5,
            delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, timeframe: &str, script: Script) -> Self {
        self.scripts.insert(timeframe.to_string(), script);
        self
    }

    pub fn closes(self, timeframe: &str, closes: Vec<f64>) -> Self {
        self.with(timeframe, Script::Closes(closes))
    }

    pub fn spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    /// Delay applied to every response.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<(String, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DataProvider for ScriptedProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let label = params.timeframe.to_string();
        self.requests
            .lock()
            .unwrap()
            .push((label.clone(), params.limit));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let closes = match self.scripts.get(&label) {
            Some(Script::Closes(closes)) => closes.clone(),
            Some(Script::Slow(delay, closes)) => {
                tokio::time::sleep(*delay).await;
                closes.clone()
            }
            Some(Script::Fail(message)) => {
                return InternalSnafu {
                    message: message.clone(),
                }
                .fail();
            }
            Some(Script::Reject(message)) => {
                return ValidationSnafu {
                    message: message.clone(),
                }
                .fail();
            }
            None => {
                return InternalSnafu {
                    message: format!("no script for {label}"),
                }
                .fail();
            }
        };

        let keep = closes.len().min(params.limit as usize);
        let closes = &closes[closes.len() - keep..];
        Ok(BarSeries::new(
            params.symbol,
            params.timeframe,
            bars_from_closes(closes, self.spread, params.timeframe),
        ))
    }
}
