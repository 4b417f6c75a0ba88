//! Price samples and the pair they belong to

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::monitor_config::MonitorConfigError;

// =============================================================================
// Sample
// =============================================================================

/// A single price observation, produced once per tick by the sample source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Quoted price of one unit of base in quote currency
    pub price: f64,

    /// Server time the price was observed at
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    pub fn new(price: f64, timestamp: DateTime<Utc>) -> Self {
        Self { price, timestamp }
    }

    /// Whether the price is usable as a sample (finite and strictly positive)
    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

// =============================================================================
// TradingPair
// =============================================================================

/// Base/quote symbol pair, e.g. BTC-USD
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    pub base: String,
    pub quote: String,
}

impl TradingPair {
    /// Create a pair, normalizing both symbols to upper case
    pub fn new(base: impl AsRef<str>, quote: impl AsRef<str>) -> Self {
        Self {
            base: base.as_ref().trim().to_uppercase(),
            quote: quote.as_ref().trim().to_uppercase(),
        }
    }

    /// Exchange product symbol (BASE-QUOTE)
    pub fn symbol(&self) -> String {
        format!("{}-{}", self.base, self.quote)
    }

    /// Same pair with base and quote exchanged
    pub fn swapped(&self) -> Self {
        Self {
            base: self.quote.clone(),
            quote: self.base.clone(),
        }
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.quote)
    }
}

// =============================================================================
// MarketType
// =============================================================================

/// Which side of the market the price is quoted for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Buy,
    Sell,
    Spot,
}

impl MarketType {
    pub const ALL: [MarketType; 3] = [MarketType::Buy, MarketType::Sell, MarketType::Spot];

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Buy => "buy",
            MarketType::Sell => "sell",
            MarketType::Spot => "spot",
        }
    }

    /// Comma-separated list of accepted values, for error messages
    pub fn available() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketType {
    type Err = MonitorConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(MarketType::Buy),
            "sell" => Ok(MarketType::Sell),
            "spot" => Ok(MarketType::Spot),
            _ => Err(MonitorConfigError::UnknownMarketType {
                value: s.to_string(),
                available: Self::available(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_is_normalized() {
        let pair = TradingPair::new(" btc", "usd ");
        assert_eq!(pair.base, "BTC");
        assert_eq!(pair.quote, "USD");
        assert_eq!(pair.symbol(), "BTC-USD");
        assert_eq!(pair.swapped().symbol(), "USD-BTC");
    }

    #[test]
    fn test_market_type_parse_is_case_insensitive() {
        assert_eq!("SPOT".parse::<MarketType>().unwrap(), MarketType::Spot);
        assert_eq!("Buy".parse::<MarketType>().unwrap(), MarketType::Buy);
        assert_eq!("sell".parse::<MarketType>().unwrap(), MarketType::Sell);
    }

    #[test]
    fn test_unknown_market_type_lists_valid_set() {
        let err = "margin".parse::<MarketType>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("margin"));
        assert!(msg.contains("buy, sell, spot"));
    }

    #[test]
    fn test_sample_price_validity() {
        let now = Utc::now();
        assert!(Sample::new(1.5, now).has_valid_price());
        assert!(!Sample::new(0.0, now).has_valid_price());
        assert!(!Sample::new(-3.0, now).has_valid_price());
        assert!(!Sample::new(f64::NAN, now).has_valid_price());
    }
}
