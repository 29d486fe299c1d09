//! Signal generation over OHLCV bars.
//!
//! The pipeline runs bottom-up: [`indicators`] turns a bar series into
//! per-bar indicator values, [`recommendation`] votes on the latest complete
//! snapshot, [`levels`] finds nearby support and resistance, [`trade_plan`]
//! derives entry/stop/target prices, and [`analysis`] fans all of it out over
//! several timeframes for one symbol.

#![warn(missing_docs)]

pub mod analysis;
pub mod config;
pub mod errors;
pub mod indicators;
pub mod levels;
pub mod recommendation;
pub mod report;
pub mod trade_plan;
