//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, which serves as a unified interface
//! for fetching recent bar data from any exchange (e.g., Binance).
//!
//! Each concrete provider implementation should implement [`DataProvider`] to handle
//! vendor-specific API logic and validation.
//!
//! The trait is designed for async usage and supports dynamic dispatch (`dyn DataProvider`)
//! for runtime selection of providers.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data::models::{bar_series::BarSeries, request_params::BarsRequestParams};
//! use market_data::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
//!         Ok(BarSeries::new(params.symbol, params.timeframe, vec![]))
//!     }
//! }
//! ```

pub mod binance_rest;

use std::sync::Arc;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu};

use crate::models::{bar_series::BarSeries, request_params::BarsRequestParams};

/// Trait for fetching time-series bar data from a market data provider.
///
/// Implementations must be safe to share between the concurrent fetches of
/// one request, and are assumed to be rate limited by the exchange.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetches the most recent `params.limit` bars for one pair and timeframe.
    ///
    /// # Returns
    ///
    /// * `Ok(BarSeries)` - Bars in chronological order. May be empty.
    /// * `Err(ProviderError)` - Invalid symbol or timeframe, or a transport failure.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError>;
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for Arc<P> {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        (**self).fetch_bars(params).await
    }
}

#[async_trait]
impl<P: DataProvider + ?Sized> DataProvider for Box<P> {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        (**self).fetch_bars(params).await
    }
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },

    /// A rate-limit setting of zero.
    #[snafu(display("Invalid rate limit: {message}"))]
    InvalidRateLimit {
        message: String,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API returned a specific error message (e.g., invalid symbol).
    #[snafu(display("API error ({status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// The response body could not be turned into bars.
    #[snafu(display("Malformed provider response: {message}"))]
    Decode {
        message: String,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },
}
