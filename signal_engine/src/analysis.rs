//! Single- and multi-timeframe analysis of one symbol.
//!
//! [`Analyzer::analyze_timeframe`] is the simple mode: one fetch, one signal,
//! any failure surfaced to the caller. [`Analyzer::analyze`] fans out over the
//! configured timeframes with bounded concurrency. A timeframe that fails is
//! reported as [`TimeframeOutcome::Unavailable`] without affecting the others,
//! except the primary timeframe, which also supplies the current price, key
//! levels and the trade plan and therefore has to succeed.

use futures::{StreamExt, stream};
use indexmap::IndexMap;
use market_data::{
    models::{
        bar_series::BarSeries,
        request_params::BarsRequestParams,
        symbol::Symbol,
        timeframe::{
            TimeFrame,
            TimeFrameUnit::{Hour, Minute},
        },
    },
    providers::{DataProvider, ProviderError},
};
use nonzero_ext::nonzero;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    config::{AnalyzerConfig, LookbackCfg},
    errors::SignalError,
    indicators::{CompleteSnapshot, IndicatorSeries},
    levels::{LevelSet, support_resistance},
    recommendation::{Signal, recommend},
    trade_plan::{TradePlan, plan_trade},
};

/// Result of the simple, single-timeframe mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeframeAnalysis {
    /// Pair analysed.
    pub symbol: Symbol,
    /// Timeframe analysed.
    pub timeframe: TimeFrame,
    /// Latest close.
    pub price: f64,
    /// Indicator values on the latest bar.
    pub indicators: CompleteSnapshot,
    /// Recommendation for the latest bar.
    pub signal: Signal,
    /// ATR as a percentage of the latest close.
    pub atr_pct: f64,
    /// Bars the indicators were computed over.
    pub bars: usize,
}

/// Evaluation of one timeframe in the multi-timeframe mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TimeframeOutcome {
    /// The timeframe produced a recommendation.
    Available {
        /// Recommendation for the latest bar.
        signal: Signal,
        /// Indicator values it was derived from.
        indicators: CompleteSnapshot,
    },
    /// The timeframe could not be evaluated.
    Unavailable {
        /// Why.
        reason: String,
    },
}

impl TimeframeOutcome {
    /// The signal, when available.
    pub fn signal(&self) -> Option<&Signal> {
        match self {
            TimeframeOutcome::Available { signal, .. } => Some(signal),
            TimeframeOutcome::Unavailable { .. } => None,
        }
    }
}

/// Aggregate of the multi-timeframe mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiTimeframeResult {
    /// Pair analysed.
    pub symbol: Symbol,
    /// Latest close on the primary timeframe.
    pub current_price: f64,
    /// Timeframe supplying price, levels and the trade plan.
    pub primary_timeframe: TimeFrame,
    /// One outcome per configured timeframe, in configured order.
    pub timeframes: IndexMap<TimeFrame, TimeframeOutcome>,
    /// ATR on the primary timeframe.
    pub atr: f64,
    /// Key levels on the primary timeframe.
    pub levels: LevelSet,
    /// Trade levels for the primary recommendation.
    pub trade_plan: TradePlan,
    /// Percent change per configured lookback label, in configured order.
    pub price_changes: IndexMap<String, f64>,
}

impl MultiTimeframeResult {
    /// Outcome of the primary timeframe's signal.
    pub fn primary_signal(&self) -> Option<&Signal> {
        self.timeframes
            .get(&self.primary_timeframe)
            .and_then(TimeframeOutcome::signal)
    }
}

struct Evaluated {
    series: BarSeries,
    snapshot: CompleteSnapshot,
    signal: Signal,
}

/// Runs the indicator pipeline against a [`DataProvider`].
pub struct Analyzer<P> {
    provider: P,
    config: AnalyzerConfig,
}

impl<P: DataProvider> Analyzer<P> {
    /// Wrap a provider. The config is assumed to be validated.
    pub fn new(provider: P, config: AnalyzerConfig) -> Self {
        Self { provider, config }
    }

    /// Active configuration.
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Underlying data source.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Normalize user input into a pair, appending the configured quote
    /// asset when none is given.
    pub fn parse_symbol(&self, input: &str) -> Result<Symbol, SignalError> {
        Ok(Symbol::parse_with_quote(input, &self.config.quote_currency)?)
    }

    /// Simple mode: analyse one timeframe. Every failure is returned.
    pub async fn analyze_timeframe(
        &self,
        symbol: &Symbol,
        timeframe: TimeFrame,
    ) -> Result<TimeframeAnalysis, SignalError> {
        let Evaluated {
            series,
            snapshot,
            signal,
        } = self.evaluate(symbol, timeframe).await?;

        let atr_pct = if snapshot.close > 0.0 {
            snapshot.atr14 / snapshot.close * 100.0
        } else {
            0.0
        };
        info!(
            %symbol,
            %timeframe,
            recommendation = %signal.recommendation,
            confidence = signal.confidence,
            "timeframe analysed"
        );

        Ok(TimeframeAnalysis {
            symbol: symbol.clone(),
            timeframe,
            price: snapshot.close,
            indicators: snapshot,
            signal,
            atr_pct,
            bars: series.len(),
        })
    }

    /// Multi-timeframe mode.
    ///
    /// Fails with [`SignalError::DataUnavailable`] only when the primary
    /// timeframe cannot be evaluated.
    pub async fn analyze(&self, symbol: &Symbol) -> Result<MultiTimeframeResult, SignalError> {
        let cfg = &self.config;
        let concurrency = cfg.max_concurrent_fetches.max(1);

        let evaluated: Vec<(TimeFrame, Result<Evaluated, SignalError>)> =
            stream::iter(cfg.timeframes.iter().copied())
                .map(|timeframe| async move { (timeframe, self.evaluate(symbol, timeframe).await) })
                .buffered(concurrency)
                .collect()
                .await;

        let mut timeframes = IndexMap::with_capacity(evaluated.len());
        let mut primary: Option<Result<Evaluated, SignalError>> = None;
        for (timeframe, result) in evaluated {
            let outcome = match &result {
                Ok(ev) => TimeframeOutcome::Available {
                    signal: ev.signal,
                    indicators: ev.snapshot,
                },
                Err(e) => {
                    warn!(%symbol, %timeframe, error = %e, "timeframe unavailable");
                    TimeframeOutcome::Unavailable {
                        reason: e.to_string(),
                    }
                }
            };
            timeframes.insert(timeframe, outcome);
            if timeframe == cfg.primary_timeframe {
                primary = Some(result);
            }
        }

        let primary_unavailable = |reason: String| SignalError::DataUnavailable {
            symbol: symbol.to_string(),
            timeframe: cfg.primary_timeframe.to_string(),
            reason: format!("could not fetch data, check symbol: {reason}"),
        };
        let primary = match primary {
            Some(Ok(ev)) => ev,
            Some(Err(e)) => return Err(primary_unavailable(e.to_string())),
            None => return Err(primary_unavailable("primary timeframe not evaluated".into())),
        };

        let current_price = primary.snapshot.close;
        let atr = primary.snapshot.atr14;
        let levels = support_resistance(&primary.series, cfg.level_window, current_price)
            .ok_or_else(|| primary_unavailable("no bars in level window".into()))?;
        let trade_plan = plan_trade(
            primary.signal.recommendation,
            current_price,
            atr,
            &levels,
            &cfg.trade_levels,
        );

        let price_changes = stream::iter(cfg.lookbacks.iter())
            .map(|lookback| async move {
                let change = self.price_change(symbol, lookback, current_price).await;
                (lookback.label.clone(), change)
            })
            .buffered(concurrency)
            .collect::<IndexMap<_, _>>()
            .await;

        info!(
            %symbol,
            price = current_price,
            recommendation = %primary.signal.recommendation,
            confidence = primary.signal.confidence,
            "multi-timeframe analysis complete"
        );

        Ok(MultiTimeframeResult {
            symbol: symbol.clone(),
            current_price,
            primary_timeframe: cfg.primary_timeframe,
            timeframes,
            atr,
            levels,
            trade_plan,
            price_changes,
        })
    }

    async fn evaluate(
        &self,
        symbol: &Symbol,
        timeframe: TimeFrame,
    ) -> Result<Evaluated, SignalError> {
        let series = self
            .fetch(symbol, timeframe, self.config.bars_per_request)
            .await?;
        let snapshot =
            IndicatorSeries::compute(&series, &self.config.indicators).latest_complete()?;
        let signal = recommend(&snapshot, &self.config.thresholds);
        Ok(Evaluated {
            series,
            snapshot,
            signal,
        })
    }

    /// Fetch under the configured deadline and reject unusable series.
    async fn fetch(
        &self,
        symbol: &Symbol,
        timeframe: TimeFrame,
        limit: u32,
    ) -> Result<BarSeries, SignalError> {
        let unavailable = |reason: String| SignalError::DataUnavailable {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            reason,
        };

        debug!(%symbol, %timeframe, limit, "fetching bars");
        let params = BarsRequestParams::new(symbol.clone(), timeframe, limit);
        let timeout = self.config.fetch_timeout();
        let series = match tokio::time::timeout(timeout, self.provider.fetch_bars(params)).await {
            Err(_) => {
                return Err(unavailable(format!(
                    "timed out after {} ms",
                    timeout.as_millis()
                )));
            }
            Ok(Err(ProviderError::Validation { message, .. })) => {
                return Err(SignalError::InputInvalid { message });
            }
            Ok(Err(e)) => return Err(unavailable(e.to_string())),
            Ok(Ok(series)) => series,
        };

        series.validate().map_err(|e| unavailable(e.to_string()))?;
        Ok(series)
    }

    async fn price_change(
        &self,
        symbol: &Symbol,
        lookback: &LookbackCfg,
        current_price: f64,
    ) -> f64 {
        match self.try_price_change(symbol, lookback.minutes, current_price).await {
            Ok(change) => change,
            Err(e) => {
                warn!(
                    %symbol,
                    lookback = %lookback.label,
                    error = %e,
                    "price change unavailable, reporting 0"
                );
                0.0
            }
        }
    }

    async fn try_price_change(
        &self,
        symbol: &Symbol,
        minutes: u32,
        current_price: f64,
    ) -> Result<f64, SignalError> {
        let (timeframe, limit) = lookback_request(minutes);
        let series = self.fetch(symbol, timeframe, limit).await?;
        let oldest = series.first().map(|bar| bar.close).unwrap_or_default();
        percent_change(oldest, current_price).ok_or_else(|| SignalError::DataUnavailable {
            symbol: symbol.to_string(),
            timeframe: timeframe.to_string(),
            reason: format!("unusable reference close {oldest}"),
        })
    }
}

/// Bar size and count that span `minutes` back from the latest bar.
fn lookback_request(minutes: u32) -> (TimeFrame, u32) {
    if minutes <= 60 {
        (TimeFrame::new(nonzero!(1u32), Minute), minutes + 1)
    } else if minutes <= 480 {
        (TimeFrame::new(nonzero!(5u32), Minute), minutes / 5 + 1)
    } else {
        (TimeFrame::new(nonzero!(1u32), Hour), minutes / 60 + 1)
    }
}

fn percent_change(reference: f64, current: f64) -> Option<f64> {
    (reference.is_finite() && reference > 0.0 && current.is_finite())
        .then(|| (current - reference) / reference * 100.0)
}
