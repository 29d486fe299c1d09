//! Rule-based recommendation engine.
//!
//! Four independent votes are cast on the latest complete snapshot:
//!
//! 1. RSI below the oversold threshold is bullish, above the overbought
//!    threshold bearish, anything in between abstains.
//! 2. MACD above its signal line is bullish, below bearish.
//! 3. Close above the SMA is bullish, below bearish.
//! 4. Close above the EMA is bullish, below bearish.
//!
//! All comparisons are strict; exact equality abstains. The net score
//! (bullish minus bearish) picks the direction and `|net| / 4 * 100` is the
//! confidence. A zero net score is `Hold` with confidence 0.

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

use crate::indicators::CompleteSnapshot;

/// Directional call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Recommendation {
    /// Net bullish votes.
    Buy,
    /// Net bearish votes.
    Sell,
    /// Votes cancel out.
    Hold,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recommendation::Buy => "Buy",
            Recommendation::Sell => "Sell",
            Recommendation::Hold => "Hold",
        };
        f.write_str(s)
    }
}

/// Outcome of a single rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Vote {
    /// Counts +1 towards buying.
    Bullish,
    /// Counts +1 towards selling.
    Bearish,
    /// No contribution.
    Abstain,
}

impl Vote {
    /// Bullish when `value > reference`, bearish when below, abstain on equality.
    fn above(value: f64, reference: f64) -> Self {
        match value.partial_cmp(&reference) {
            Some(Ordering::Greater) => Vote::Bullish,
            Some(Ordering::Less) => Vote::Bearish,
            _ => Vote::Abstain,
        }
    }

    fn score(self) -> i8 {
        match self {
            Vote::Bullish => 1,
            Vote::Bearish => -1,
            Vote::Abstain => 0,
        }
    }
}

/// RSI band outside of which the RSI rule votes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VoteThresholds {
    /// RSI strictly below this votes bullish.
    pub rsi_oversold: f64,
    /// RSI strictly above this votes bearish.
    pub rsi_overbought: f64,
}

impl Default for VoteThresholds {
    fn default() -> Self {
        Self {
            rsi_oversold: 40.0,
            rsi_overbought: 60.0,
        }
    }
}

/// The four votes behind a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Votes {
    /// RSI band rule.
    pub rsi: Vote,
    /// MACD versus signal line.
    pub macd: Vote,
    /// Close versus SMA.
    pub sma: Vote,
    /// Close versus EMA.
    pub ema: Vote,
}

impl Votes {
    fn iter(&self) -> impl Iterator<Item = Vote> {
        [self.rsi, self.macd, self.sma, self.ema].into_iter()
    }

    /// Number of bullish votes.
    pub fn bullish(&self) -> usize {
        self.iter().filter(|v| *v == Vote::Bullish).count()
    }

    /// Number of bearish votes.
    pub fn bearish(&self) -> usize {
        self.iter().filter(|v| *v == Vote::Bearish).count()
    }

    /// Bullish minus bearish, in `-4..=4`.
    pub fn net_score(&self) -> i8 {
        self.iter().map(Vote::score).sum()
    }
}

/// A recommendation with its confidence and the votes that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Signal {
    /// Direction.
    pub recommendation: Recommendation,
    /// Percentage in `[0, 100]`, in steps of 25.
    pub confidence: f64,
    /// Bullish minus bearish votes.
    pub net_score: i8,
    /// Individual votes.
    pub votes: Votes,
}

const MAX_VOTES: f64 = 4.0;

/// Cast the four votes on `snapshot` and turn them into a [`Signal`].
///
/// Pure and stateless; the same snapshot always yields the same signal.
pub fn recommend(snapshot: &CompleteSnapshot, thresholds: &VoteThresholds) -> Signal {
    let rsi = if snapshot.rsi14 < thresholds.rsi_oversold {
        Vote::Bullish
    } else if snapshot.rsi14 > thresholds.rsi_overbought {
        Vote::Bearish
    } else {
        Vote::Abstain
    };

    let votes = Votes {
        rsi,
        macd: Vote::above(snapshot.macd, snapshot.macd_signal),
        sma: Vote::above(snapshot.close, snapshot.sma20),
        ema: Vote::above(snapshot.close, snapshot.ema20),
    };

    let net_score = votes.net_score();
    let (recommendation, confidence) = match net_score.cmp(&0) {
        Ordering::Greater => (Recommendation::Buy, f64::from(net_score.abs()) / MAX_VOTES * 100.0),
        Ordering::Less => (Recommendation::Sell, f64::from(net_score.abs()) / MAX_VOTES * 100.0),
        Ordering::Equal => (Recommendation::Hold, 0.0),
    };

    Signal {
        recommendation,
        confidence,
        net_score,
        votes,
    }
}
