//! Threshold Evaluator
//!
//! Computes the percentage change between the lagged and the current sample
//! and decides whether it crosses the configured threshold. Pure function of
//! its inputs and the monitor configuration.

use thiserror::Error;

use super::alert::{AlertEvent, Direction};
use super::monitor_config::MonitorConfig;
use super::sample::{MarketType, Sample, TradingPair};

/// Decimal digits kept in `AlertEvent::percentage`
pub const PERCENTAGE_PRECISION: i32 = 3;

/// Relative slack on the threshold comparison, far below `PERCENTAGE_PRECISION`.
/// Absorbs the binary rounding of decimal prices so an exact move still counts.
pub const THRESHOLD_TOLERANCE: f64 = 1e-9;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvaluationError {
    #[error("lagged price is zero, percentage change is undefined")]
    ZeroLaggedPrice,

    #[error("price is not a finite number (current: {current}, lagged: {lagged})")]
    InvalidPrice { current: f64, lagged: f64 },
}

/// Signed move between two samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    /// `current - lagged`
    pub delta: f64,
    /// `|delta| / lagged * 100`, unrounded
    pub percentage: f64,
    pub direction: Direction,
}

impl PriceChange {
    /// Compute the change from `lagged` to `current`.
    ///
    /// `delta == 0` is reported as `Down`.
    pub fn between(current: &Sample, lagged: &Sample) -> Result<Self, EvaluationError> {
        if !current.price.is_finite() || !lagged.price.is_finite() {
            return Err(EvaluationError::InvalidPrice {
                current: current.price,
                lagged: lagged.price,
            });
        }
        if lagged.price == 0.0 {
            return Err(EvaluationError::ZeroLaggedPrice);
        }

        let delta = current.price - lagged.price;
        // multiply first so integral moves on integral prices stay exact
        let percentage = (delta.abs() * 100.0) / lagged.price.abs();
        let direction = if delta > 0.0 { Direction::Up } else { Direction::Down };

        Ok(Self {
            delta,
            percentage,
            direction,
        })
    }
}

/// Round a percentage to `PERCENTAGE_PRECISION` decimal digits
pub fn round_percentage(value: f64) -> f64 {
    let factor = 10f64.powi(PERCENTAGE_PRECISION);
    (value * factor).round() / factor
}

/// Decides whether a price move is an alert
#[derive(Debug, Clone)]
pub struct ThresholdEvaluator {
    pair: TradingPair,
    market_type: MarketType,
    window: usize,
    threshold: f64,
}

impl ThresholdEvaluator {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            pair: config.pair().clone(),
            market_type: config.market_type(),
            window: config.window(),
            threshold: config.threshold(),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether an unrounded percentage reaches the threshold (inclusive)
    pub fn crosses(&self, percentage: f64) -> bool {
        percentage + THRESHOLD_TOLERANCE * self.threshold.max(1.0) >= self.threshold
    }

    /// Evaluate one comparison.
    ///
    /// Returns `Ok(Some(event))` when the change is at least the threshold
    /// (inclusive), `Ok(None)` otherwise.
    pub fn evaluate(&self, current: &Sample, lagged: &Sample) -> Result<Option<AlertEvent>, EvaluationError> {
        let change = PriceChange::between(current, lagged)?;

        if !self.crosses(change.percentage) {
            return Ok(None);
        }

        Ok(Some(AlertEvent {
            pair: self.pair.clone(),
            market_type: self.market_type,
            direction: change.direction,
            percentage: round_percentage(change.percentage),
            current_price: current.price,
            lagged_price: lagged.price,
            current_timestamp: current.timestamp,
            lagged_timestamp: lagged.timestamp,
            window: self.window,
            threshold: self.threshold,
        }))
    }
}

// =============================================================================
// Tests
// =============================================================================
