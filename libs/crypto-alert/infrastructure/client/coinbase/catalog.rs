//! Symbol catalog and pair validation
//!
//! Coinbase only prices `CRYPTO-CURRENCY` pairs. The catalog knows which
//! symbols are fiat currencies and which are cryptos, validates a configured
//! pair against both lists and swaps it when it was given the wrong way round.
//! Falling back to the built-in lists and rejecting the pair are both
//! reported to the operator through the alert sink.

use super::client::CoinbaseClient;
use crate::application::{report_startup_failure, send_startup_notice, AlertSink};
use crate::domain::{StartupNotice, TradingPair};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{info, warn};

pub const BACKUP_CURRENCIES: [&str; 8] = ["USD", "EUR", "GBP", "CNY", "JPY", "CAD", "AUD", "RUB"];

pub const BACKUP_CRYPTOS: [&str; 12] = [
    "BTC", "ETH", "USDT", "ADA", "DOGE", "AVAX", "DOT", "SHIB", "XTZ", "SOL", "ICP", "LTC",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("crypto '{symbol}' is not available, choose among: {available}")]
    CryptoNotAvailable { symbol: String, available: String },

    #[error("currency '{symbol}' is not available, choose among: {available}")]
    CurrencyNotAvailable { symbol: String, available: String },

    #[error("'{base}' and '{quote}' are both cryptos")]
    BothCrypto { base: String, quote: String },

    #[error("'{base}' and '{quote}' are both currencies")]
    BothCurrency { base: String, quote: String },
}

/// Where the symbol lists came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    Live,
    Backup,
}

/// A validated pair, in the order Coinbase expects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPair {
    pub pair: TradingPair,
    /// The configured pair was given currency-first and has been swapped
    pub swapped: bool,
}

#[derive(Debug, Clone)]
pub struct SymbolCatalog {
    currencies: BTreeSet<String>,
    cryptos: BTreeSet<String>,
    currency_origin: CatalogOrigin,
    crypto_origin: CatalogOrigin,
    /// Why each backup list is in use, empty for a live catalog
    fallbacks: Vec<String>,
}

fn to_set<I, S>(symbols: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    symbols
        .into_iter()
        .map(|s| s.as_ref().trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl SymbolCatalog {
    pub fn from_lists<I, J, S, T>(currencies: I, cryptos: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            currencies: to_set(currencies),
            cryptos: to_set(cryptos),
            currency_origin: CatalogOrigin::Live,
            crypto_origin: CatalogOrigin::Live,
            fallbacks: Vec::new(),
        }
    }

    /// Built-in lists, used when the API cannot be reached
    pub fn backup() -> Self {
        Self {
            currencies: to_set(BACKUP_CURRENCIES),
            cryptos: to_set(BACKUP_CRYPTOS),
            currency_origin: CatalogOrigin::Backup,
            crypto_origin: CatalogOrigin::Backup,
            fallbacks: vec!["built-in backup lists in use".to_string()],
        }
    }

    /// Fetch both lists, falling back to the backup lists on any failure.
    ///
    /// Cryptos are derived as the exchange-rate keys that are not currencies,
    /// which only works against the full currency list, so a backup currency
    /// list forces the backup crypto list too.
    pub async fn load(client: &CoinbaseClient) -> Self {
        let mut fallbacks = Vec::new();
        let mut fall_back = |reason: String| {
            warn!("[Catalog] {}", reason);
            fallbacks.push(reason);
        };

        let (currencies, currency_origin) = match client.get_currencies().await {
            Ok(list) if !list.is_empty() => (to_set(list), CatalogOrigin::Live),
            Ok(_) => {
                fall_back(format!("Currency list is empty, using backup list: {}", BACKUP_CURRENCIES.join(", ")));
                (to_set(BACKUP_CURRENCIES), CatalogOrigin::Backup)
            }
            Err(e) => {
                fall_back(format!(
                    "Failed to fetch currency list ({}), using backup list: {}",
                    e,
                    BACKUP_CURRENCIES.join(", ")
                ));
                (to_set(BACKUP_CURRENCIES), CatalogOrigin::Backup)
            }
        };

        let (cryptos, crypto_origin) = if currency_origin == CatalogOrigin::Backup {
            fall_back(format!(
                "Crypto list cannot be derived without the full currency list, using backup list: {}",
                BACKUP_CRYPTOS.join(", ")
            ));
            (to_set(BACKUP_CRYPTOS), CatalogOrigin::Backup)
        } else {
            match client.get_exchange_rates().await {
                Ok(rates) if !rates.rates.is_empty() => {
                    let cryptos: BTreeSet<String> = to_set(rates.rates.keys())
                        .into_iter()
                        .filter(|symbol| !currencies.contains(symbol))
                        .collect();
                    (cryptos, CatalogOrigin::Live)
                }
                Ok(_) => {
                    fall_back(format!("Exchange rates are empty, using backup crypto list: {}", BACKUP_CRYPTOS.join(", ")));
                    (to_set(BACKUP_CRYPTOS), CatalogOrigin::Backup)
                }
                Err(e) => {
                    fall_back(format!(
                        "Failed to fetch exchange rates ({}), using backup crypto list: {}",
                        e,
                        BACKUP_CRYPTOS.join(", ")
                    ));
                    (to_set(BACKUP_CRYPTOS), CatalogOrigin::Backup)
                }
            }
        };

        info!(
            "[Catalog] {} currencies ({:?}), {} cryptos ({:?})",
            currencies.len(),
            currency_origin,
            cryptos.len(),
            crypto_origin
        );

        Self {
            currencies,
            cryptos,
            currency_origin,
            crypto_origin,
            fallbacks,
        }
    }

    pub fn currencies(&self) -> &BTreeSet<String> {
        &self.currencies
    }

    pub fn cryptos(&self) -> &BTreeSet<String> {
        &self.cryptos
    }

    pub fn is_backup(&self) -> bool {
        self.currency_origin == CatalogOrigin::Backup || self.crypto_origin == CatalogOrigin::Backup
    }

    pub fn fallback_reasons(&self) -> &[String] {
        &self.fallbacks
    }

    fn list(set: &BTreeSet<String>) -> String {
        set.iter().cloned().collect::<Vec<_>>().join(", ")
    }

    /// Check that `pair` is CRYPTO-CURRENCY, swapping a CURRENCY-CRYPTO pair
    pub fn validate_pair(&self, pair: &TradingPair) -> Result<ResolvedPair, CatalogError> {
        let base = &pair.base;
        let quote = &pair.quote;

        let mut base_is_currency = false;
        if !self.cryptos.contains(base) {
            if !self.currencies.contains(base) {
                return Err(CatalogError::CryptoNotAvailable {
                    symbol: base.clone(),
                    available: Self::list(&self.cryptos),
                });
            }
            base_is_currency = true;
        }

        let mut quote_is_crypto = false;
        if !self.currencies.contains(quote) {
            if !self.cryptos.contains(quote) {
                return Err(CatalogError::CurrencyNotAvailable {
                    symbol: quote.clone(),
                    available: Self::list(&self.currencies),
                });
            }
            quote_is_crypto = true;
        }

        if self.cryptos.contains(base) && self.cryptos.contains(quote) {
            return Err(CatalogError::BothCrypto {
                base: base.clone(),
                quote: quote.clone(),
            });
        }

        if self.currencies.contains(base) && self.currencies.contains(quote) {
            return Err(CatalogError::BothCurrency {
                base: base.clone(),
                quote: quote.clone(),
            });
        }

        let swapped = base_is_currency && quote_is_crypto;
        Ok(ResolvedPair {
            pair: if swapped { pair.swapped() } else { pair.clone() },
            swapped,
        })
    }

    /// Validate `pair` and tell the operator about anything wrong on the way:
    /// one notice when backup lists are in use, one when the pair is rejected.
    pub async fn resolve_and_report<A: AlertSink + ?Sized>(
        &self,
        pair: &TradingPair,
        sink: &A,
    ) -> Result<ResolvedPair, CatalogError> {
        if !self.fallbacks.is_empty() {
            let notice = StartupNotice::catalog_fallback(pair.clone(), self.fallbacks.join("; "));
            send_startup_notice(sink, &notice).await;
        }

        match self.validate_pair(pair) {
            Ok(resolved) => Ok(resolved),
            Err(e) => {
                report_startup_failure(sink, pair, &e).await;
                Err(e)
            }
        }
    }
}
