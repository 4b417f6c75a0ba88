//! Monitor configuration with the bounds the engine depends on
//!
//! The window defines how far back the evaluator looks and must fit inside
//! the cache capacity; the threshold must be a positive percentage.

use serde::Serialize;
use thiserror::Error;

use super::sample::{MarketType, TradingPair};

/// Maximum supported look-back window in minutes, used as default capacity
pub const DEFAULT_CAPACITY: usize = 720;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorConfigError {
    #[error("cache capacity must be at least 1, got {0}")]
    ZeroCapacity(usize),

    #[error("window {window} is out of range, expected 1..={capacity} minutes")]
    WindowOutOfRange { window: usize, capacity: usize },

    #[error("threshold {0}% is invalid, expected a finite percentage greater than 0")]
    InvalidThreshold(f64),

    #[error("symbol must not be empty (pair: '{0}')")]
    EmptySymbol(String),

    #[error("base and quote symbol are both '{0}'")]
    DuplicateSymbol(String),

    #[error("market type '{value}' is not available, choose among: {available}")]
    UnknownMarketType { value: String, available: String },
}

/// Immutable configuration of one running monitor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorConfig {
    pair: TradingPair,
    market_type: MarketType,
    window: usize,
    threshold: f64,
    capacity: usize,
}

impl MonitorConfig {
    /// Build a configuration, checking window and threshold bounds
    pub fn new(
        pair: TradingPair,
        market_type: MarketType,
        window: usize,
        threshold: f64,
        capacity: usize,
    ) -> Result<Self, MonitorConfigError> {
        if capacity == 0 {
            return Err(MonitorConfigError::ZeroCapacity(capacity));
        }
        if window == 0 || window > capacity {
            return Err(MonitorConfigError::WindowOutOfRange { window, capacity });
        }
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(MonitorConfigError::InvalidThreshold(threshold));
        }
        if pair.base.is_empty() || pair.quote.is_empty() {
            return Err(MonitorConfigError::EmptySymbol(pair.to_string()));
        }
        if pair.base == pair.quote {
            return Err(MonitorConfigError::DuplicateSymbol(pair.base.clone()));
        }

        Ok(Self {
            pair,
            market_type,
            window,
            threshold,
            capacity,
        })
    }

    pub fn pair(&self) -> &TradingPair {
        &self.pair
    }

    pub fn market_type(&self) -> MarketType {
        self.market_type
    }

    /// Look-back distance in ticks (minutes)
    pub fn window(&self) -> usize {
        self.window
    }

    /// Trigger threshold in percent
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Same configuration for a different (e.g. swapped) pair
    pub fn with_pair(&self, pair: TradingPair) -> Result<Self, MonitorConfigError> {
        Self::new(pair, self.market_type, self.window, self.threshold, self.capacity)
    }
}
