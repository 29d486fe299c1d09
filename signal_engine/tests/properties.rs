mod common;

use common::{bars_from_closes, tf};
use proptest::prelude::*;
use signal_engine::{
    indicators::{CompleteSnapshot, rsi},
    levels::levels_in,
    recommendation::{Recommendation, VoteThresholds, recommend},
    trade_plan::{TradeLevelParams, plan_trade},
};

fn closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..1_000.0, 2..120)
}

fn snapshot() -> impl Strategy<Value = CompleteSnapshot> {
    (
        1.0f64..1_000.0,
        1.0f64..1_000.0,
        1.0f64..1_000.0,
        0.0f64..=100.0,
        -10.0f64..10.0,
        -10.0f64..10.0,
        0.0f64..50.0,
    )
        .prop_map(|(close, sma20, ema20, rsi14, macd, macd_signal, atr14)| {
            CompleteSnapshot {
                close,
                sma20,
                ema20,
                rsi14,
                macd,
                macd_signal,
                macd_hist: macd - macd_signal,
                atr14,
            }
        })
}

fn recommendation() -> impl Strategy<Value = Recommendation> {
    prop_oneof![
        Just(Recommendation::Buy),
        Just(Recommendation::Sell),
        Just(Recommendation::Hold),
    ]
}

proptest! {
    #[test]
    fn rsi_stays_in_range(closes in closes(), period in 2usize..30) {
        for value in rsi(&closes, period).into_iter().flatten() {
            prop_assert!((0.0..=100.0).contains(&value), "rsi {value}");
        }
    }

    #[test]
    fn votes_are_bounded_and_hold_has_no_confidence(snapshot in snapshot()) {
        let signal = recommend(&snapshot, &VoteThresholds::default());
        prop_assert!((-4..=4).contains(&signal.net_score));
        prop_assert!((0.0..=100.0).contains(&signal.confidence));
        prop_assert_eq!(signal.confidence, f64::from(signal.net_score.abs()) * 25.0);
        match signal.recommendation {
            Recommendation::Hold => prop_assert_eq!(signal.net_score, 0),
            Recommendation::Buy => prop_assert!(signal.net_score > 0),
            Recommendation::Sell => prop_assert!(signal.net_score < 0),
        }
    }

    #[test]
    fn levels_bracket_price_when_the_window_straddles_it(
        closes in closes(),
        pick in any::<prop::sample::Index>(),
    ) {
        let bars = bars_from_closes(&closes, 0.5, tf("1h"));
        let price = closes[pick.index(closes.len())];
        let levels = levels_in(&bars, price).unwrap();

        let lowest = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let highest = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        prop_assert!(lowest < price && price < highest);
        prop_assert!(levels.support < price);
        prop_assert!(price < levels.resistance);
        prop_assert!(levels.support >= lowest && levels.resistance <= highest);
    }

    #[test]
    fn risk_reward_is_never_negative(
        recommendation in recommendation(),
        price in 1.0f64..1_000.0,
        atr in 0.0f64..20.0,
        below in 0.0f64..50.0,
        above in 0.0f64..50.0,
    ) {
        let levels = signal_engine::levels::LevelSet {
            support: price - below,
            resistance: price + above,
        };
        let plan = plan_trade(recommendation, price, atr, &levels, &TradeLevelParams::default());

        prop_assert_eq!(plan.entry, price);
        prop_assert!(plan.risk_reward >= 0.0);
        if plan.stop == plan.entry {
            prop_assert_eq!(plan.risk_reward, 0.0);
        }
    }
}
