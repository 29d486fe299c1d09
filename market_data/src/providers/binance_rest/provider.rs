use std::time::Duration;

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota};
use nonzero_ext::nonzero;
use reqwest::{Client, header};
use secrecy::{ExposeSecret, SecretString};
use shared_utils::env::get_env_var_opt;
use snafu::{OptionExt, ResultExt};
use tracing::debug;

use crate::{
    models::{bar_series::BarSeries, request_params::BarsRequestParams},
    providers::{
        ApiSnafu, ClientBuildSnafu, DataProvider, InvalidApiKeySnafu, InvalidRateLimitSnafu,
        ProviderError, ProviderInitError, ReqwestSnafu,
        binance_rest::{
            params::{construct_params, validate_limit, validate_timeframe},
            response::{api_error_message, decode_klines},
        },
    },
};

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";
const KLINES_PATH: &str = "/api/v3/klines";
const API_KEY_VAR: &str = "BINANCE_API_KEY";

/// Connection settings for [`BinanceProvider`].
#[derive(Clone, Debug)]
pub struct BinanceConfig {
    pub base_url: String,
    /// Minimum spacing between two requests from this client.
    pub min_request_interval: Duration,
    /// Upper bound for a single HTTP exchange.
    pub request_timeout: Duration,
    /// Optional key; public market data works without one.
    pub api_key: Option<SecretString>,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            min_request_interval: Duration::from_millis(1200),
            request_timeout: Duration::from_secs(10),
            api_key: None,
        }
    }
}

impl BinanceConfig {
    /// Pick up `BINANCE_API_KEY` from the environment when it is set.
    pub fn with_env_key(mut self) -> Self {
        if let Some(key) = get_env_var_opt(API_KEY_VAR) {
            self.api_key = Some(SecretString::from(key));
        }
        self
    }
}

pub struct BinanceProvider {
    client: Client,
    base_url: String,
    limiter: DefaultDirectRateLimiter,
}

impl BinanceProvider {
    /// Creates a new Binance provider.
    ///
    /// Every request waits on a direct rate limiter that admits one request
    /// per `min_request_interval`.
    pub fn new(config: BinanceConfig) -> Result<Self, ProviderInitError> {
        let mut headers = header::HeaderMap::new();
        if let Some(key) = &config.api_key {
            headers.insert(
                "X-MBX-APIKEY",
                header::HeaderValue::from_str(key.expose_secret()).context(InvalidApiKeySnafu)?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .context(ClientBuildSnafu)?;

        let quota = Quota::with_period(config.min_request_interval)
            .context(InvalidRateLimitSnafu {
                message: "min_request_interval must be greater than zero",
            })?
            .allow_burst(nonzero!(1u32));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            limiter: DefaultDirectRateLimiter::direct(quota),
        })
    }
}

#[async_trait]
impl DataProvider for BinanceProvider {
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        // Reject bad input before spending rate-limit budget on it.
        validate_timeframe(&params.timeframe)?;
        validate_limit(params.limit)?;

        self.limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, KLINES_PATH);
        debug!(
            symbol = %params.symbol,
            timeframe = %params.timeframe,
            limit = params.limit,
            "requesting klines"
        );

        let response = self
            .client
            .get(&url)
            .query(&construct_params(&params))
            .send()
            .await
            .context(ReqwestSnafu)?;

        let status = response.status();
        let body = response.text().await.context(ReqwestSnafu)?;

        if !status.is_success() {
            let message = api_error_message(&body).unwrap_or_else(|| {
                if body.is_empty() {
                    "Unknown API error".to_string()
                } else {
                    body.clone()
                }
            });
            return ApiSnafu {
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        let bars = decode_klines(&body)?;
        Ok(BarSeries::new(params.symbol, params.timeframe, bars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_is_rejected() {
        let config = BinanceConfig {
            min_request_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            BinanceProvider::new(config),
            Err(ProviderInitError::InvalidRateLimit { .. })
        ));
    }

    #[test]
    fn header_unsafe_key_is_rejected() {
        let config = BinanceConfig {
            api_key: Some(SecretString::from("bad\nkey".to_string())),
            ..Default::default()
        };
        assert!(matches!(
            BinanceProvider::new(config),
            Err(ProviderInitError::InvalidApiKey { .. })
        ));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = BinanceConfig {
            base_url: "https://example.test/".into(),
            ..Default::default()
        };
        let provider = BinanceProvider::new(config).unwrap();
        assert_eq!(provider.base_url, "https://example.test");
    }
}
