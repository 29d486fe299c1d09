//! Market data models and providers.
//!
//! [`models`] holds the vendor-agnostic OHLCV types every downstream
//! computation consumes; [`providers`] defines the [`providers::DataProvider`]
//! trait and the concrete exchange clients implementing it.

pub mod models;
pub mod providers;
