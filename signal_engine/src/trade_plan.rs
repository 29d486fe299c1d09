//! Entry, stop and target prices for a recommendation.
//!
//! Entry is always the current price. Stops and targets blend a volatility
//! distance (multiples of ATR) with the nearest support/resistance:
//!
//! - Buy: stop is the higher of `entry - 2·ATR` and `support - 0.5·ATR`;
//!   target is the lower of `entry + 3·ATR` and resistance.
//! - Sell: stop is the lower of `entry + 2·ATR` and `resistance + 0.5·ATR`;
//!   target is the higher of `entry - 3·ATR` and support.
//! - Hold: stop `support - 0.5·ATR`, target resistance. These are shown for
//!   information and do not imply a direction.

use serde::{Deserialize, Serialize};

use crate::{levels::LevelSet, recommendation::Recommendation};

/// ATR multiples used for stops and targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TradeLevelParams {
    /// Volatility stop distance from entry.
    pub stop_atr: f64,
    /// Volatility target distance from entry.
    pub target_atr: f64,
    /// Buffer beyond support/resistance for level-based stops.
    pub level_buffer_atr: f64,
}

impl Default for TradeLevelParams {
    fn default() -> Self {
        Self {
            stop_atr: 2.0,
            target_atr: 3.0,
            level_buffer_atr: 0.5,
        }
    }
}

/// Suggested trade levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradePlan {
    /// Entry price (the current price).
    pub entry: f64,
    /// Stop-loss price.
    pub stop: f64,
    /// Take-profit price.
    pub target: f64,
    /// `|entry - stop|` as a percentage of entry.
    pub stop_pct: f64,
    /// `|target - entry|` as a percentage of entry.
    pub target_pct: f64,
    /// Reward over risk; 0 when the stop sits on the entry.
    pub risk_reward: f64,
}

fn pct_of_entry(distance: f64, entry: f64) -> f64 {
    if entry == 0.0 {
        0.0
    } else {
        (distance / entry).abs() * 100.0
    }
}

/// Derive a [`TradePlan`] for `recommendation` at `price`.
pub fn plan_trade(
    recommendation: Recommendation,
    price: f64,
    atr: f64,
    levels: &LevelSet,
    params: &TradeLevelParams,
) -> TradePlan {
    let entry = price;
    let buffer = params.level_buffer_atr * atr;

    let (stop, target) = match recommendation {
        Recommendation::Buy => (
            (entry - params.stop_atr * atr).max(levels.support - buffer),
            (entry + params.target_atr * atr).min(levels.resistance),
        ),
        Recommendation::Sell => (
            (entry + params.stop_atr * atr).min(levels.resistance + buffer),
            (entry - params.target_atr * atr).max(levels.support),
        ),
        Recommendation::Hold => (levels.support - buffer, levels.resistance),
    };

    let risk = (entry - stop).abs();
    let reward = (target - entry).abs();
    let risk_reward = if risk > 0.0 { reward / risk } else { 0.0 };

    TradePlan {
        entry,
        stop,
        target,
        stop_pct: pct_of_entry(entry - stop, entry),
        target_pct: pct_of_entry(target - entry, entry),
        risk_reward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels(support: f64, resistance: f64) -> LevelSet {
        LevelSet {
            support,
            resistance,
        }
    }

    fn plan(rec: Recommendation, price: f64, atr: f64, l: LevelSet) -> TradePlan {
        plan_trade(rec, price, atr, &l, &TradeLevelParams::default())
    }

    #[test]
    fn buy_scenario() {
        let p = plan(Recommendation::Buy, 100.0, 2.0, levels(97.0, 105.0));
        assert_eq!(p.entry, 100.0);
        assert_eq!(p.stop, 96.0);
        assert_eq!(p.target, 105.0);
        assert_eq!(p.risk_reward, 1.25);
        assert!((p.stop_pct - 4.0).abs() < 1e-12);
        assert!((p.target_pct - 5.0).abs() < 1e-12);
    }

    #[test]
    fn buy_takes_the_tighter_stop_and_nearer_target() {
        // support far below: volatility stop wins; resistance far above: ATR target wins
        let p = plan(Recommendation::Buy, 100.0, 1.0, levels(80.0, 150.0));
        assert_eq!(p.stop, 98.0);
        assert_eq!(p.target, 103.0);
        assert_eq!(p.risk_reward, 1.5);
    }

    #[test]
    fn sell_mirrors_buy() {
        let p = plan(Recommendation::Sell, 100.0, 2.0, levels(95.0, 103.0));
        // min(104, 104)
        assert_eq!(p.stop, 104.0);
        // max(94, 95)
        assert_eq!(p.target, 95.0);
        assert_eq!(p.risk_reward, 1.25);
    }

    #[test]
    fn hold_shows_informational_levels() {
        let p = plan(Recommendation::Hold, 100.0, 2.0, levels(97.0, 105.0));
        assert_eq!(p.stop, 96.0);
        assert_eq!(p.target, 105.0);
    }

    #[test]
    fn zero_risk_yields_zero_ratio() {
        // zero ATR and support at the price: stop lands on entry
        let p = plan(Recommendation::Buy, 100.0, 0.0, levels(100.0, 100.0));
        assert_eq!(p.stop, 100.0);
        assert_eq!(p.risk_reward, 0.0);
        assert_eq!(p.stop_pct, 0.0);
    }

    #[test]
    fn flat_market_hold() {
        let p = plan(Recommendation::Hold, 100.0, 0.0, levels(100.0, 100.0));
        assert_eq!(p.risk_reward, 0.0);
        assert!(p.risk_reward.is_finite());
    }
}
