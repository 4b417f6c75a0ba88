//! Coinbase v2 REST client
//!
//! Public, unauthenticated endpoints only: server time, prices, the currency
//! list and exchange rates.

use super::types::{CurrencyInfo, DataEnvelope, ExchangeRates, PriceQuote, ServerTime};
use crate::application::{SampleError, SampleSource};
use crate::domain::{MarketType, Sample, TradingPair};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum CoinbaseError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("no data in response from {0}")]
    NoData(String),

    #[error("Deserialization failed: {0}")]
    DeserializeFailed(String),

    #[error("invalid price '{0}'")]
    InvalidPrice(String),

    #[error("invalid server time: {0}")]
    InvalidTime(String),
}

impl CoinbaseError {
    /// Whether the same request may succeed later
    pub fn is_retryable(&self) -> bool {
        match self {
            CoinbaseError::RequestFailed(e) => !e.is_decode() && !e.is_builder(),
            CoinbaseError::RateLimitExceeded => true,
            CoinbaseError::ApiError { status, .. } => *status >= 500,
            CoinbaseError::NoData(_)
            | CoinbaseError::DeserializeFailed(_)
            | CoinbaseError::InvalidPrice(_)
            | CoinbaseError::InvalidTime(_) => false,
        }
    }
}

impl From<CoinbaseError> for SampleError {
    fn from(e: CoinbaseError) -> Self {
        if e.is_retryable() {
            SampleError::Retryable(e.to_string())
        } else {
            SampleError::Fatal(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CoinbaseError>;

/// Coinbase API client
pub struct CoinbaseClient {
    base_url: String,
    client: Client,
}

impl CoinbaseClient {
    /// Create a client against `base_url` with a per-request timeout
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(request_timeout.min(Duration::from_secs(10)))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30))
            .user_agent(concat!("crypto-alert/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` and unwrap the `data` envelope
    async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate limit exceeded on Coinbase API");
            return Err(CoinbaseError::RateLimitExceeded);
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CoinbaseError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let envelope: DataEnvelope<T> = serde_json::from_str(&body)
            .map_err(|e| CoinbaseError::DeserializeFailed(format!("{}: {}", path, e)))?;

        envelope
            .data
            .ok_or_else(|| CoinbaseError::NoData(path.to_string()))
    }

    /// `GET /v2/time`
    pub async fn get_server_time(&self) -> Result<ServerTime> {
        self.get_data("/v2/time").await
    }

    /// Server time as a UTC timestamp
    pub async fn server_now(&self) -> Result<DateTime<Utc>> {
        let time = self.get_server_time().await?;
        parse_server_time(&time)
    }

    /// `GET /v2/prices/{BASE}-{QUOTE}/{type}`
    pub async fn get_price(&self, pair: &TradingPair, market_type: MarketType) -> Result<f64> {
        let path = format!("/v2/prices/{}/{}", pair.symbol(), market_type);
        let quote: PriceQuote = self.get_data(&path).await?;
        parse_amount(&quote.amount)
    }

    /// `GET /v2/currencies`, returns the currency ids
    pub async fn get_currencies(&self) -> Result<Vec<String>> {
        let currencies: Vec<CurrencyInfo> = self.get_data("/v2/currencies").await?;
        Ok(currencies.into_iter().map(|c| c.id.to_uppercase()).collect())
    }

    /// `GET /v2/exchange-rates`
    pub async fn get_exchange_rates(&self) -> Result<ExchangeRates> {
        self.get_data("/v2/exchange-rates").await
    }
}

/// Prices must be finite and strictly positive
pub fn parse_amount(amount: &str) -> Result<f64> {
    match amount.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(CoinbaseError::InvalidPrice(amount.to_string())),
    }
}

/// Prefer the ISO field, fall back to the epoch seconds
pub fn parse_server_time(time: &ServerTime) -> Result<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&time.iso) {
        return Ok(parsed.with_timezone(&Utc));
    }
    DateTime::<Utc>::from_timestamp(time.epoch, 0)
        .ok_or_else(|| CoinbaseError::InvalidTime(format!("iso={} epoch={}", time.iso, time.epoch)))
}

// =============================================================================
// Sample source
// =============================================================================

/// Samples one pair: price plus Coinbase server time
pub struct CoinbaseSampleSource {
    client: Arc<CoinbaseClient>,
    pair: TradingPair,
    market_type: MarketType,
}

impl CoinbaseSampleSource {
    pub fn new(client: Arc<CoinbaseClient>, pair: TradingPair, market_type: MarketType) -> Self {
        Self {
            client,
            pair,
            market_type,
        }
    }

    pub fn pair(&self) -> &TradingPair {
        &self.pair
    }
}

#[async_trait]
impl SampleSource for CoinbaseSampleSource {
    async fn fetch(&self) -> std::result::Result<Sample, SampleError> {
        let price = self.client.get_price(&self.pair, self.market_type).await?;
        let timestamp = self.client.server_now().await?;
        debug!("[Coinbase] {} {} = {} at {}", self.pair, self.market_type, price, timestamp);
        Ok(Sample::new(price, timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("64012.35").unwrap(), 64012.35);
        assert_eq!(parse_amount(" 0.00001234 ").unwrap(), 0.00001234);
        assert!(matches!(parse_amount("0"), Err(CoinbaseError::InvalidPrice(_))));
        assert!(matches!(parse_amount("-1.5"), Err(CoinbaseError::InvalidPrice(_))));
        assert!(matches!(parse_amount("NaN"), Err(CoinbaseError::InvalidPrice(_))));
        assert!(matches!(parse_amount("abc"), Err(CoinbaseError::InvalidPrice(_))));
    }

    #[test]
    fn test_parse_server_time() {
        let time = ServerTime {
            iso: "2024-05-01T12:00:00Z".to_string(),
            epoch: 0,
        };
        assert_eq!(parse_server_time(&time).unwrap().timestamp(), 1714564800);

        let epoch_only = ServerTime {
            iso: String::new(),
            epoch: 1714564800,
        };
        assert_eq!(parse_server_time(&epoch_only).unwrap().timestamp(), 1714564800);
    }

    #[test]
    fn test_error_classification() {
        assert!(CoinbaseError::RateLimitExceeded.is_retryable());
        assert!(CoinbaseError::ApiError { status: 503, body: String::new() }.is_retryable());
        assert!(!CoinbaseError::ApiError { status: 404, body: String::new() }.is_retryable());
        assert!(!CoinbaseError::NoData("/v2/time".to_string()).is_retryable());

        let fatal: SampleError = CoinbaseError::InvalidPrice("x".to_string()).into();
        assert!(!fatal.is_retryable());
        let retryable: SampleError = CoinbaseError::RateLimitExceeded.into();
        assert!(retryable.is_retryable());
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = CoinbaseClient::new("https://api.coinbase.com/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "https://api.coinbase.com");
    }
}
