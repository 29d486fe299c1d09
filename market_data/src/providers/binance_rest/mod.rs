//! Binance spot market data over the public REST API.

pub mod params;
pub mod provider;
pub mod response;

pub use provider::{BinanceConfig, BinanceProvider};
