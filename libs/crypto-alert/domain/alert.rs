//! Alert payloads handed to the alert sink

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::sample::{MarketType, TradingPair};

/// Direction of the price move between the lagged and the current sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    /// Also used for an unchanged price
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the alert sink needs to describe a threshold crossing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub pair: TradingPair,
    pub market_type: MarketType,
    pub direction: Direction,

    /// Absolute change in percent, rounded to `PERCENTAGE_PRECISION` digits
    pub percentage: f64,

    pub current_price: f64,
    pub lagged_price: f64,
    pub current_timestamp: DateTime<Utc>,
    pub lagged_timestamp: DateTime<Utc>,

    /// Look-back window in minutes
    pub window: usize,

    /// Configured threshold in percent
    pub threshold: f64,
}

/// Operator notice sent when the monitor stops on a fatal sampling failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceNotice {
    pub pair: TradingPair,
    pub market_type: MarketType,
    pub reason: String,
    pub tick: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Why a startup notice was sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartupNoticeKind {
    /// Symbol lists could not be fetched, the built-in backup lists are used
    CatalogFallback,
    /// Validation failed and the service will not start
    StartupFailed,
}

/// Operator notice raised before the monitor loop starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartupNotice {
    pub kind: StartupNoticeKind,
    /// Pair as configured, before any swap
    pub pair: TradingPair,
    pub reason: String,
    pub occurred_at: DateTime<Utc>,
}

impl StartupNotice {
    pub fn catalog_fallback(pair: TradingPair, reason: impl Into<String>) -> Self {
        Self {
            kind: StartupNoticeKind::CatalogFallback,
            pair,
            reason: reason.into(),
            occurred_at: Utc::now(),
        }
    }

    pub fn startup_failed(pair: TradingPair, reason: impl Into<String>) -> Self {
        Self {
            kind: StartupNoticeKind::StartupFailed,
            pair,
            reason: reason.into(),
            occurred_at: Utc::now(),
        }
    }
}
