//! Plain-text rendering of analysis results.

use std::fmt;

use crate::{
    analysis::{MultiTimeframeResult, TimeframeAnalysis, TimeframeOutcome},
    recommendation::{Signal, Vote},
};

/// Displays an analysis result as a human-readable report.
///
/// ```ignore
/// println!("{}", Report(&result));
/// ```
pub struct Report<'a, T>(pub &'a T);

struct Price(f64);

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = if self.0.abs() >= 1.0 {
            format!("{:.2}", self.0)
        } else {
            format!("{:.6}", self.0)
        };
        f.pad(&text)
    }
}

struct Pct(f64);

impl fmt::Display for Pct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.2}%", self.0)
    }
}

fn vote_label(vote: Vote) -> &'static str {
    match vote {
        Vote::Bullish => "bullish",
        Vote::Bearish => "bearish",
        Vote::Abstain => "neutral",
    }
}

/// Blank line, then `title` underlined with dashes.
fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "{title}")?;
    writeln!(f, "{}", "-".repeat(title.len()))
}

fn write_signal(f: &mut fmt::Formatter<'_>, signal: &Signal) -> fmt::Result {
    write!(
        f,
        "{} ({:.0}% confidence, score {:+})",
        signal.recommendation, signal.confidence, signal.net_score
    )
}

impl fmt::Display for Report<'_, MultiTimeframeResult> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        writeln!(f, "{} analysis", r.symbol)?;
        writeln!(f, "Price: {}", Price(r.current_price))?;

        heading(f, "Signals")?;
        for (timeframe, outcome) in &r.timeframes {
            let marker = if *timeframe == r.primary_timeframe { "*" } else { " " };
            write!(f, " {marker}{:>4}  ", timeframe.to_string())?;
            match outcome {
                TimeframeOutcome::Available { signal, indicators } => {
                    write_signal(f, signal)?;
                    writeln!(f, "  RSI {:.1}", indicators.rsi14)?;
                }
                TimeframeOutcome::Unavailable { reason } => {
                    writeln!(f, "unavailable: {reason}")?;
                }
            }
        }

        if !r.price_changes.is_empty() {
            heading(f, "Price change")?;
            for (label, change) in &r.price_changes {
                writeln!(f, "  {label:>4}  {}", Pct(*change))?;
            }
        }

        heading(f, &format!("Key levels ({})", r.primary_timeframe))?;
        writeln!(
            f,
            "  Resistance  {}  ({})",
            Price(r.levels.resistance),
            Pct(r.levels.resistance_distance_pct(r.current_price))
        )?;
        writeln!(
            f,
            "  Support     {}  ({})",
            Price(r.levels.support),
            Pct(-r.levels.support_distance_pct(r.current_price))
        )?;
        writeln!(f, "  ATR         {}", Price(r.atr))?;

        let plan = &r.trade_plan;
        heading(f, "Trading levels")?;
        writeln!(f, "  Entry   {}", Price(plan.entry))?;
        writeln!(f, "  Stop    {}  ({:.2}%)", Price(plan.stop), plan.stop_pct)?;
        writeln!(f, "  Target  {}  ({:.2}%)", Price(plan.target), plan.target_pct)?;
        write!(f, "  R/R     {:.2}", plan.risk_reward)
    }
}

impl fmt::Display for Report<'_, TimeframeAnalysis> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.0;
        let ind = &a.indicators;
        let votes = &a.signal.votes;

        writeln!(f, "{} {} ({} bars)", a.symbol, a.timeframe, a.bars)?;
        writeln!(f, "Price: {}", Price(a.price))?;
        write!(f, "Signal: ")?;
        write_signal(f, &a.signal)?;
        writeln!(f)?;
        heading(f, "Indicators")?;
        writeln!(f, "  RSI(14)      {:>10.2}  {}", ind.rsi14, vote_label(votes.rsi))?;
        writeln!(
            f,
            "  MACD         {:>10.4}  {}",
            ind.macd,
            vote_label(votes.macd)
        )?;
        writeln!(f, "  MACD signal  {:>10.4}", ind.macd_signal)?;
        writeln!(f, "  MACD hist    {:>10.4}", ind.macd_hist)?;
        writeln!(f, "  SMA(20)      {:>10}  {}", Price(ind.sma20), vote_label(votes.sma))?;
        writeln!(f, "  EMA(20)      {:>10}  {}", Price(ind.ema20), vote_label(votes.ema))?;
        write!(
            f,
            "  ATR(14)      {:>10}  ({:.2}% of price)",
            Price(ind.atr14),
            a.atr_pct
        )
    }
}
