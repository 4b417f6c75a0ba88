//! Crypto Alert
//!
//! Sliding-window price monitoring for a single crypto/currency pair.
//! Samples the price once per tick, keeps the samples in a fixed-capacity
//! ring, and raises an alert when the change over the configured window
//! crosses the threshold.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod utils;

// Re-export commonly used items
pub use application::{
    report_startup_failure, send_startup_notice, AlertSink, LoopConfig, MonitorError, MonitorState,
    MonitorStats, PriceMonitor, RetryPolicy, RetryingSource, SampleError, SampleSource, SinkError,
    TickOutcome,
};
pub use domain::{
    AlertEvent, CircularPriceCache, Direction, LaggedSample, MarketType, MonitorConfig, Sample,
    StartupNotice, StartupNoticeKind, ThresholdEvaluator, TradingPair,
};
pub use infrastructure::{AppConfig, ConfigError};
pub use utils::{init_tracing, init_tracing_with_level, Heartbeat, ShutdownManager};
