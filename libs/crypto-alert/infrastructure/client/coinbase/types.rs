//! Coinbase v2 response types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every v2 endpoint wraps its payload in `{"data": ...}`
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: Option<T>,
}

/// `GET /v2/time`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerTime {
    /// RFC 3339 timestamp
    pub iso: String,
    /// Seconds since the Unix epoch
    pub epoch: i64,
}

/// `GET /v2/prices/{pair}/{type}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Decimal price, sent as a string
    pub amount: String,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// One entry of `GET /v2/currencies`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub min_size: Option<String>,
}

/// `GET /v2/exchange-rates`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRates {
    pub currency: String,
    pub rates: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_envelope() {
        let json = r#"{"data":{"base":"BTC","currency":"USD","amount":"64012.35"}}"#;
        let envelope: DataEnvelope<PriceQuote> = serde_json::from_str(json).unwrap();
        let quote = envelope.data.unwrap();
        assert_eq!(quote.amount, "64012.35");
        assert_eq!(quote.base.as_deref(), Some("BTC"));
    }

    #[test]
    fn test_missing_data_is_none() {
        let envelope: DataEnvelope<ServerTime> =
            serde_json::from_str(r#"{"errors":[{"id":"not_found"}]}"#).unwrap();
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_server_time() {
        let json = r#"{"data":{"iso":"2024-05-01T12:00:00Z","epoch":1714564800}}"#;
        let envelope: DataEnvelope<ServerTime> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.data.unwrap().epoch, 1714564800);
    }

    #[test]
    fn test_exchange_rates() {
        let json = r#"{"data":{"currency":"USD","rates":{"EUR":"0.92","BTC":"0.0000156"}}}"#;
        let envelope: DataEnvelope<ExchangeRates> = serde_json::from_str(json).unwrap();
        let rates = envelope.data.unwrap();
        assert_eq!(rates.currency, "USD");
        assert_eq!(rates.rates.len(), 2);
    }

    #[test]
    fn test_currency_list() {
        let json = r#"{"data":[{"id":"USD","name":"US Dollar","min_size":"0.01"},{"id":"EUR"}]}"#;
        let envelope: DataEnvelope<Vec<CurrencyInfo>> = serde_json::from_str(json).unwrap();
        let ids: Vec<_> = envelope.data.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["USD", "EUR"]);
    }
}
