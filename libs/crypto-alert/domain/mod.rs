//! Domain Layer
//!
//! Pure types and algorithms of the monitoring engine: samples, the
//! circular price cache, the threshold evaluator and the bounds-checked
//! monitor configuration. Nothing here performs I/O.

pub mod alert;
pub mod evaluator;
pub mod monitor_config;
pub mod price_cache;
pub mod sample;

pub use alert::{AlertEvent, Direction, ServiceNotice, StartupNotice, StartupNoticeKind};
pub use evaluator::{EvaluationError, PriceChange, ThresholdEvaluator, PERCENTAGE_PRECISION, THRESHOLD_TOLERANCE};
pub use monitor_config::{MonitorConfig, MonitorConfigError, DEFAULT_CAPACITY};
pub use price_cache::{CacheError, CacheLookup, CircularPriceCache, LaggedSample};
pub use sample::{MarketType, Sample, TradingPair};
