//! Indicator engine.
//!
//! Every function returns a vector aligned with its input: index `i` of the
//! output belongs to bar `i`, and `None` marks bars without enough history for
//! the indicator to be defined. Nothing here panics or errors on short or flat
//! input.
//!
//! | indicator       | first defined index (default periods) |
//! |-----------------|---------------------------------------|
//! | SMA(20)         | 19                                    |
//! | EMA(20)         | 19 (seeded with the SMA)              |
//! | RSI(14)         | 14                                    |
//! | ATR(14)         | 14                                    |
//! | MACD(12,26)     | 25                                    |
//! | signal/hist (9) | 34                                    |
//!
//! A recommendation additionally requires [`IndicatorParams::min_history`]
//! bars (35 with the defaults, slow + signal).

use market_data::models::bar_series::BarSeries;
use serde::{Deserialize, Serialize};

use crate::errors::SignalError;

/// Bars needed before a recommendation is attempted with default periods.
pub const MIN_HISTORY: usize = 35;

/// Indicator periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorParams {
    /// Simple moving average period.
    pub sma_period: usize,
    /// Exponential moving average period.
    pub ema_period: usize,
    /// RSI period.
    pub rsi_period: usize,
    /// MACD fast EMA period.
    pub macd_fast: usize,
    /// MACD slow EMA period.
    pub macd_slow: usize,
    /// MACD signal EMA period.
    pub macd_signal: usize,
    /// ATR period.
    pub atr_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_period: 20,
            ema_period: 20,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            atr_period: 14,
        }
    }
}

impl IndicatorParams {
    /// Bars required before the latest snapshot is trusted for a
    /// recommendation.
    pub fn min_history(&self) -> usize {
        [
            self.macd_slow + self.macd_signal,
            self.sma_period,
            self.ema_period,
            self.rsi_period + 1,
            self.atr_period + 1,
        ]
        .into_iter()
        .max()
        .unwrap_or(MIN_HISTORY)
    }
}

/// Simple moving average.
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }
    for (i, window) in values.windows(period).enumerate() {
        out[i + period - 1] = Some(window.iter().sum::<f64>() / period as f64);
    }
    out
}

/// Exponential moving average over a series whose defined values form one
/// contiguous run (leading `None`s allowed).
///
/// `alpha = 2 / (period + 1)`, seeded with the SMA of the first `period`
/// defined values.
fn ema_of_defined(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    let Some(start) = values.iter().position(Option::is_some) else {
        return out;
    };
    if period == 0 || values.len() - start < period {
        return out;
    }

    let seed_end = start + period;
    let seed: Option<f64> = values[start..seed_end].iter().copied().sum();
    let Some(seed) = seed else {
        return out;
    };

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut prev = seed / period as f64;
    out[seed_end - 1] = Some(prev);
    for (i, v) in values.iter().enumerate().skip(seed_end) {
        let Some(v) = v else { break };
        // prev + alpha * (v - prev) keeps a flat series exactly flat.
        prev += alpha * (v - prev);
        out[i] = Some(prev);
    }
    out
}

/// Exponential moving average seeded with the SMA of the first `period` values.
pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let defined: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
    ema_of_defined(&defined, period)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // No losses: 100 on any gain, neutral 50 on a flat window.
        return if avg_gain == 0.0 { 50.0 } else { 100.0 };
    }
    let rs = avg_gain / avg_loss;
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}

/// Relative Strength Index with Wilder's smoothing (`1/period`).
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let p = period as f64;

    let mut avg_gain = changes[..period].iter().map(|c| c.max(0.0)).sum::<f64>() / p;
    let mut avg_loss = changes[..period].iter().map(|c| (-c).max(0.0)).sum::<f64>() / p;
    out[period] = Some(rsi_from_averages(avg_gain, avg_loss));

    for (i, &c) in changes.iter().enumerate().skip(period) {
        avg_gain = (avg_gain * (p - 1.0) + c.max(0.0)) / p;
        avg_loss = (avg_loss * (p - 1.0) + (-c).max(0.0)) / p;
        // changes[i] is the move into bar i + 1
        out[i + 1] = Some(rsi_from_averages(avg_gain, avg_loss));
    }
    out
}

/// MACD line, signal line and histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Macd {
    /// Fast EMA minus slow EMA.
    pub line: Vec<Option<f64>>,
    /// EMA of the MACD line.
    pub signal: Vec<Option<f64>>,
    /// Line minus signal.
    pub histogram: Vec<Option<f64>>,
}

/// Moving Average Convergence Divergence.
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);
    let line: Vec<Option<f64>> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    // The signal needs `slow + signal` bars of history, one more than its
    // EMA seed alone would require.
    let first_signal = (fast.max(slow) + signal).saturating_sub(1);
    let signal_line: Vec<Option<f64>> = ema_of_defined(&line, signal)
        .into_iter()
        .enumerate()
        .map(|(i, v)| if i < first_signal { None } else { v })
        .collect();
    let histogram = line
        .iter()
        .zip(&signal_line)
        .map(|(l, s)| Some((*l)? - (*s)?))
        .collect();
    Macd {
        line,
        signal: signal_line,
        histogram,
    }
}

/// True range per bar. The first bar has no previous close and uses
/// `high - low`.
pub fn true_range(series: &BarSeries) -> Vec<f64> {
    let mut prev_close = None;
    series
        .bars
        .iter()
        .map(|bar| {
            let tr = bar.true_range(prev_close);
            prev_close = Some(bar.close);
            tr
        })
        .collect()
}

/// Average True Range with Wilder's smoothing.
///
/// Seeded with the mean true range of bars `1..=period` (the first bar has no
/// previous close and is skipped), so the first value lands on index `period`.
pub fn atr(series: &BarSeries, period: usize) -> Vec<Option<f64>> {
    let tr = true_range(series);
    let mut out = vec![None; tr.len()];
    if period == 0 || tr.len() <= period {
        return out;
    }
    let p = period as f64;
    let mut prev = tr[1..=period].iter().sum::<f64>() / p;
    out[period] = Some(prev);
    for i in period + 1..tr.len() {
        prev = (prev * (p - 1.0) + tr[i]) / p;
        out[i] = Some(prev);
    }
    out
}

/// Indicator values for one bar. `None` means undefined.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct IndicatorSnapshot {
    /// Closing price of the bar.
    pub close: f64,
    /// SMA of closes.
    pub sma20: Option<f64>,
    /// EMA of closes.
    pub ema20: Option<f64>,
    /// RSI of closes.
    pub rsi14: Option<f64>,
    /// MACD line.
    pub macd: Option<f64>,
    /// MACD signal line.
    pub macd_signal: Option<f64>,
    /// MACD histogram.
    pub macd_hist: Option<f64>,
    /// Average true range.
    pub atr14: Option<f64>,
}

/// A snapshot in which every indicator is defined and finite.
///
/// Only [`IndicatorSnapshot::complete`] builds one, so the recommendation
/// engine cannot be handed missing values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompleteSnapshot {
    /// Closing price of the bar.
    pub close: f64,
    /// SMA of closes.
    pub sma20: f64,
    /// EMA of closes.
    pub ema20: f64,
    /// RSI of closes, in `[0, 100]`.
    pub rsi14: f64,
    /// MACD line.
    pub macd: f64,
    /// MACD signal line.
    pub macd_signal: f64,
    /// MACD histogram.
    pub macd_hist: f64,
    /// Average true range.
    pub atr14: f64,
}

impl IndicatorSnapshot {
    /// All values present and finite, or `None`.
    pub fn complete(&self) -> Option<CompleteSnapshot> {
        let s = CompleteSnapshot {
            close: self.close,
            sma20: self.sma20?,
            ema20: self.ema20?,
            rsi14: self.rsi14?,
            macd: self.macd?,
            macd_signal: self.macd_signal?,
            macd_hist: self.macd_hist?,
            atr14: self.atr14?,
        };
        let all_finite = [
            s.close,
            s.sma20,
            s.ema20,
            s.rsi14,
            s.macd,
            s.macd_signal,
            s.macd_hist,
            s.atr14,
        ]
        .iter()
        .all(|v| v.is_finite());
        all_finite.then_some(s)
    }
}

/// Per-bar indicator values for one [`BarSeries`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    snapshots: Vec<IndicatorSnapshot>,
    min_history: usize,
}

impl IndicatorSeries {
    /// Compute every indicator for every bar of `series`.
    pub fn compute(series: &BarSeries, params: &IndicatorParams) -> Self {
        let closes = series.closes();
        let sma = sma(&closes, params.sma_period);
        let ema = ema(&closes, params.ema_period);
        let rsi = rsi(&closes, params.rsi_period);
        let macd = macd(&closes, params.macd_fast, params.macd_slow, params.macd_signal);
        let atr = atr(series, params.atr_period);

        let snapshots = (0..closes.len())
            .map(|i| IndicatorSnapshot {
                close: closes[i],
                sma20: sma[i],
                ema20: ema[i],
                rsi14: rsi[i],
                macd: macd.line[i],
                macd_signal: macd.signal[i],
                macd_hist: macd.histogram[i],
                atr14: atr[i],
            })
            .collect();

        Self {
            snapshots,
            min_history: params.min_history(),
        }
    }

    /// Snapshots in bar order.
    pub fn snapshots(&self) -> &[IndicatorSnapshot] {
        &self.snapshots
    }

    /// Number of bars covered.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// True when computed over an empty series.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot of the latest bar, possibly incomplete.
    pub fn latest(&self) -> Option<&IndicatorSnapshot> {
        self.snapshots.last()
    }

    /// Latest snapshot, provided the series is long enough for a
    /// recommendation and every value on the latest bar is defined.
    pub fn latest_complete(&self) -> Result<CompleteSnapshot, SignalError> {
        let insufficient = || SignalError::InsufficientHistory {
            required: self.min_history,
            available: self.snapshots.len(),
        };
        if self.snapshots.len() < self.min_history {
            return Err(insufficient());
        }
        self.latest()
            .and_then(IndicatorSnapshot::complete)
            .ok_or_else(insufficient)
    }
}
