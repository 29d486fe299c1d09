//! Nearest support and resistance around the current price.

use market_data::models::{bar::Bar, bar_series::BarSeries};
use serde::Serialize;

/// Trailing bars scanned when no window is configured.
pub const DEFAULT_WINDOW: usize = 20;

/// Support below and resistance above the current price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelSet {
    /// Highest low under the price, or the window low.
    pub support: f64,
    /// Lowest high over the price, or the window high.
    pub resistance: f64,
}

impl LevelSet {
    /// How far support sits under `price`, in percent of `price`.
    pub fn support_distance_pct(&self, price: f64) -> f64 {
        pct_of(price - self.support, price)
    }

    /// How far resistance sits over `price`, in percent of `price`.
    pub fn resistance_distance_pct(&self, price: f64) -> f64 {
        pct_of(self.resistance - price, price)
    }
}

fn pct_of(delta: f64, base: f64) -> f64 {
    if base == 0.0 { 0.0 } else { delta / base * 100.0 }
}

/// Levels from an explicit slice of bars.
///
/// Support is the highest `low` strictly below `current_price`; without one,
/// the lowest `low` of the slice. Resistance is the lowest `high` strictly
/// above `current_price`; without one, the highest `high`. `None` only for an
/// empty slice.
pub fn levels_in(bars: &[Bar], current_price: f64) -> Option<LevelSet> {
    if bars.is_empty() {
        return None;
    }

    let lows = bars.iter().map(|b| b.low);
    let highs = bars.iter().map(|b| b.high);

    let support = lows
        .clone()
        .filter(|&low| low < current_price)
        .reduce(f64::max)
        .or_else(|| lows.reduce(f64::min))?;
    let resistance = highs
        .clone()
        .filter(|&high| high > current_price)
        .reduce(f64::min)
        .or_else(|| highs.reduce(f64::max))?;

    Some(LevelSet {
        support,
        resistance,
    })
}

/// Levels over the trailing `window` bars of `series`.
///
/// A series shorter than `window` uses every bar it has; a zero window is
/// treated as one bar.
pub fn support_resistance(
    series: &BarSeries,
    window: usize,
    current_price: f64,
) -> Option<LevelSet> {
    levels_in(series.tail(window.max(1)), current_price)
}
