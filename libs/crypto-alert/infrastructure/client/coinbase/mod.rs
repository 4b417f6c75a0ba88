//! Coinbase v2 API
//!
//! ```rust,ignore
//! use crypto_alert::infrastructure::client::coinbase::{CoinbaseClient, SymbolCatalog};
//!
//! let client = CoinbaseClient::new("https://api.coinbase.com", Duration::from_secs(10))?;
//! let catalog = SymbolCatalog::load(&client).await;
//! let resolved = catalog.validate_pair(&TradingPair::new("USD", "BTC"))?;
//! assert_eq!(resolved.pair.symbol(), "BTC-USD");
//! ```

mod catalog;
mod client;
mod types;

pub use catalog::{CatalogError, CatalogOrigin, ResolvedPair, SymbolCatalog, BACKUP_CRYPTOS, BACKUP_CURRENCIES};
pub use client::{parse_amount, parse_server_time, CoinbaseClient, CoinbaseError, CoinbaseSampleSource, Result};
pub use types::{CurrencyInfo, ExchangeRates, PriceQuote, ServerTime};
