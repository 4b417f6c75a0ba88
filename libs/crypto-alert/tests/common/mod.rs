//! Shared test doubles for monitor integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use crypto_alert::domain::{AlertEvent, MarketType, MonitorConfig, ServiceNotice, StartupNotice, TradingPair};
use crypto_alert::{AlertSink, Sample, SampleError, SampleSource, SinkError};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Macro for verbose test output (controlled by TEST_VERBOSE env var)
#[macro_export]
macro_rules! verbose_println {
    ($($arg:tt)*) => {
        if std::env::var("TEST_VERBOSE").is_ok() {
            println!($($arg)*);
        }
    };
}

/// Minute-aligned timestamp for tick `n`
pub fn minute(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap() + Duration::minutes(n)
}

pub fn btc_usd(window: usize, threshold: f64, capacity: usize) -> MonitorConfig {
    MonitorConfig::new(TradingPair::new("BTC", "USD"), MarketType::Spot, window, threshold, capacity).unwrap()
}

// =============================================================================
// ScriptedSource
// =============================================================================

/// Replays a fixed script of fetch results, one per call.
///
/// Once the script is exhausted it keeps returning the last price.
#[derive(Clone)]
pub struct ScriptedSource {
    script: Arc<Mutex<VecDeque<Result<f64, SampleError>>>>,
    calls: Arc<Mutex<i64>>,
    last_price: Arc<Mutex<f64>>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<f64, SampleError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            calls: Arc::new(Mutex::new(0)),
            last_price: Arc::new(Mutex::new(100.0)),
        }
    }

    pub fn prices(prices: &[f64]) -> Self {
        Self::new(prices.iter().copied().map(Ok).collect())
    }

    pub fn calls(&self) -> i64 {
        *self.calls.lock()
    }
}

#[async_trait]
impl SampleSource for ScriptedSource {
    async fn fetch(&self) -> Result<Sample, SampleError> {
        let call = {
            let mut calls = self.calls.lock();
            let call = *calls;
            *calls += 1;
            call
        };

        let next = self.script.lock().pop_front();
        match next {
            Some(Ok(price)) => {
                *self.last_price.lock() = price;
                Ok(Sample::new(price, minute(call)))
            }
            Some(Err(e)) => Err(e),
            None => Ok(Sample::new(*self.last_price.lock(), minute(call))),
        }
    }
}

// =============================================================================
// RecordingSink
// =============================================================================

/// Records every alert and notice; can be told to fail the first N emits
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<AlertEvent>>>,
    notices: Arc<Mutex<Vec<ServiceNotice>>>,
    startup: Arc<Mutex<Vec<StartupNotice>>>,
    attempts: Arc<Mutex<u32>>,
    failures_left: Arc<Mutex<u32>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(times: u32) -> Self {
        let sink = Self::default();
        *sink.failures_left.lock() = times;
        sink
    }

    pub fn events(&self) -> Vec<AlertEvent> {
        self.events.lock().clone()
    }

    pub fn notices(&self) -> Vec<ServiceNotice> {
        self.notices.lock().clone()
    }

    pub fn startup_notices(&self) -> Vec<StartupNotice> {
        self.startup.lock().clone()
    }

    pub fn attempts(&self) -> u32 {
        *self.attempts.lock()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn emit(&self, event: &AlertEvent) -> Result<(), SinkError> {
        *self.attempts.lock() += 1;
        {
            let mut left = self.failures_left.lock();
            if *left > 0 {
                *left -= 1;
                return Err(SinkError::Delivery("endpoint unavailable".to_string()));
            }
        }
        self.events.lock().push(event.clone());
        Ok(())
    }

    async fn notify_service_down(&self, notice: &ServiceNotice) -> Result<(), SinkError> {
        self.notices.lock().push(notice.clone());
        Ok(())
    }

    async fn notify_startup(&self, notice: &StartupNotice) -> Result<(), SinkError> {
        self.startup.lock().push(notice.clone());
        Ok(())
    }
}
