//! Monitor configuration
//!
//! Loaded from YAML, with secrets and endpoint overrides taken from the
//! environment.

use crate::application::{report_startup_failure, AlertSink, LoopConfig, RetryPolicy};
use crate::domain::{MarketType, MonitorConfig, MonitorConfigError, TradingPair, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable holding the alert webhook URL
pub const WEBHOOK_URL_ENV: &str = "ALERT_WEBHOOK_URL";

/// Environment variable overriding the Coinbase API base URL
pub const COINBASE_URL_ENV: &str = "COINBASE_API_URL";

pub const DEFAULT_COINBASE_URL: &str = "https://api.coinbase.com";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Invalid monitor settings: {0}")]
    Monitor(#[from] MonitorConfigError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// =============================================================================
// AppConfig
// =============================================================================

/// Top-level configuration of the alert service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    pub pair: PairConfig,

    #[serde(default = "default_market_type")]
    pub market_type: String,

    /// Look-back window in minutes
    pub window_minutes: usize,

    /// Trigger threshold in percent
    pub threshold_pct: f64,

    /// Ring buffer size in ticks
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    #[serde(default)]
    pub sampling: SamplingConfig,

    #[serde(default)]
    pub alerts: AlertsConfig,

    #[serde(default)]
    pub coinbase: CoinbaseConfig,

    /// Status line interval in seconds (0 = off)
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairConfig {
    /// Crypto symbol, e.g. BTC
    pub base: String,
    /// Fiat currency symbol, e.g. USD
    pub quote: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    /// Skipped ticks in a row before the source is declared down (0 = never)
    #[serde(default = "default_max_consecutive_failures")]
    pub max_consecutive_failures: u32,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            max_consecutive_failures: default_max_consecutive_failures(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_max_delivery_attempts")]
    pub max_delivery_attempts: u32,
    #[serde(default = "default_delivery_backoff_ms")]
    pub delivery_backoff_ms: u64,

    /// Webhook endpoint from .env (not in YAML)
    #[serde(skip)]
    pub webhook_url: Option<String>,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            max_delivery_attempts: default_max_delivery_attempts(),
            delivery_backoff_ms: default_delivery_backoff_ms(),
            webhook_url: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoinbaseConfig {
    #[serde(default = "default_coinbase_url")]
    pub base_url: String,
}

impl Default for CoinbaseConfig {
    fn default() -> Self {
        Self {
            base_url: default_coinbase_url(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_market_type() -> String {
    "spot".to_string()
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_heartbeat_interval() -> u64 {
    300
}

fn default_interval_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_ms() -> u64 {
    8_000
}

fn default_max_consecutive_failures() -> u32 {
    10
}

fn default_max_delivery_attempts() -> u32 {
    3
}

fn default_delivery_backoff_ms() -> u64 {
    2_000
}

fn default_coinbase_url() -> String {
    DEFAULT_COINBASE_URL.to_string()
}

impl AppConfig {
    /// Load configuration from a YAML file and the environment
    pub fn load(config_path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::read(config_path)?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, without validation, so the alert channel can be built
    /// before the values are checked
    pub fn read(config_path: impl AsRef<Path>) -> Result<Self> {
        let yaml_content = std::fs::read_to_string(config_path)?;
        let mut config = Self::from_yaml(&yaml_content)?;

        if let Ok(url) = std::env::var(WEBHOOK_URL_ENV) {
            if !url.trim().is_empty() {
                config.alerts.webhook_url = Some(url.trim().to_string());
            }
        }

        if let Ok(url) = std::env::var(COINBASE_URL_ENV) {
            if !url.trim().is_empty() {
                info!("Overriding Coinbase API URL from environment variable");
                config.coinbase.base_url = url.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Parse YAML without touching the environment or validating
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "log_level must be one of: {}",
                valid_levels.join(", ")
            )));
        }

        if self.sampling.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "sampling.interval_secs must be greater than 0".to_string(),
            ));
        }

        if self.sampling.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "sampling.request_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.sampling.initial_backoff_ms > self.sampling.max_backoff_ms {
            return Err(ConfigError::ValidationError(
                "sampling.initial_backoff_ms must not exceed sampling.max_backoff_ms".to_string(),
            ));
        }

        if self.alerts.max_delivery_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "alerts.max_delivery_attempts must be at least 1".to_string(),
            ));
        }

        if !self.coinbase.base_url.starts_with("http://") && !self.coinbase.base_url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "coinbase.base_url must be an http(s) URL, got '{}'",
                self.coinbase.base_url
            )));
        }

        // window/threshold/capacity/pair bounds live in the domain
        self.to_monitor_config()?;

        Ok(())
    }

    /// `validate`, reporting a failure to the operator through `sink`
    pub async fn validate_or_notify<A: AlertSink + ?Sized>(&self, sink: &A) -> Result<()> {
        if let Err(e) = self.validate() {
            report_startup_failure(sink, &self.trading_pair(), &e).await;
            return Err(e);
        }
        Ok(())
    }

    /// Timeout shared by Coinbase requests and alert delivery
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.sampling.request_timeout_secs.max(1))
    }

    pub fn market_type(&self) -> Result<MarketType> {
        Ok(self.market_type.parse::<MarketType>()?)
    }

    pub fn trading_pair(&self) -> TradingPair {
        TradingPair::new(&self.pair.base, &self.pair.quote)
    }

    /// Bounds-checked monitor settings
    pub fn to_monitor_config(&self) -> Result<MonitorConfig> {
        Ok(MonitorConfig::new(
            self.trading_pair(),
            self.market_type()?,
            self.window_minutes,
            self.threshold_pct,
            self.capacity,
        )?)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            request_timeout: Duration::from_secs(self.sampling.request_timeout_secs),
            max_retries: self.sampling.max_retries,
            initial_backoff: Duration::from_millis(self.sampling.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.sampling.max_backoff_ms),
        }
    }

    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            sampling_interval: Duration::from_secs(self.sampling.interval_secs),
            max_consecutive_failures: self.sampling.max_consecutive_failures,
            max_delivery_attempts: self.alerts.max_delivery_attempts,
            delivery_backoff: Duration::from_millis(self.alerts.delivery_backoff_ms),
            heartbeat_interval_secs: self.heartbeat_interval_secs,
        }
    }

    /// Log configuration summary
    pub fn log(&self) {
        info!("Configuration loaded:");
        info!("  Pair: {}-{} ({})", self.pair.base, self.pair.quote, self.market_type);
        info!("  Window: {} minutes", self.window_minutes);
        info!("  Threshold: {}%", self.threshold_pct);
        info!("  Capacity: {} ticks", self.capacity);
        info!(
            "  Sampling: every {}s, timeout {}s, {} retries",
            self.sampling.interval_secs, self.sampling.request_timeout_secs, self.sampling.max_retries
        );
        info!("  Coinbase API: {}", self.coinbase.base_url);
        info!(
            "  Alert channel: {}",
            if self.alerts.webhook_url.is_some() { "webhook" } else { "log" }
        );
        info!("  Log level: {}", self.log_level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
pair:
  base: btc
  quote: usd
window_minutes: 60
threshold_pct: 5.0
"#;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config = AppConfig::from_yaml(MINIMAL).unwrap();
        config.validate().unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.market_type, "spot");
        assert_eq!(config.capacity, 720);
        assert_eq!(config.sampling.interval_secs, 60);
        assert_eq!(config.alerts.max_delivery_attempts, 3);
        assert_eq!(config.coinbase.base_url, DEFAULT_COINBASE_URL);
        assert!(config.alerts.webhook_url.is_none());

        let monitor = config.to_monitor_config().unwrap();
        assert_eq!(monitor.pair().symbol(), "BTC-USD");
        assert_eq!(monitor.market_type(), MarketType::Spot);
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
log_level: debug
pair: { base: ETH, quote: EUR }
market_type: Sell
window_minutes: 15
threshold_pct: 2.5
capacity: 120
sampling:
  interval_secs: 30
  max_retries: 5
alerts:
  max_delivery_attempts: 4
heartbeat_interval_secs: 0
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        config.validate().unwrap();

        assert_eq!(config.market_type().unwrap(), MarketType::Sell);
        assert_eq!(config.retry_policy().max_retries, 5);
        assert_eq!(config.retry_policy().request_timeout, Duration::from_secs(10));

        let loop_config = config.loop_config();
        assert_eq!(loop_config.sampling_interval, Duration::from_secs(30));
        assert_eq!(loop_config.max_delivery_attempts, 4);
        assert_eq!(loop_config.heartbeat_interval_secs, 0);
    }

    #[test]
    fn test_window_larger_than_capacity_rejected() {
        let yaml = MINIMAL.replace("window_minutes: 60", "window_minutes: 721");
        let err = AppConfig::from_yaml(&yaml).unwrap().validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Monitor(MonitorConfigError::WindowOutOfRange { window: 721, capacity: 720 })
        ));
    }

    #[test]
    fn test_unknown_market_type_rejected() {
        let yaml = format!("{}market_type: mid\n", MINIMAL);
        let err = AppConfig::from_yaml(&yaml).unwrap().validate().unwrap_err();
        assert!(err.to_string().contains("buy, sell, spot"));
    }

    #[test]
    fn test_bad_log_level_rejected() {
        let yaml = format!("{}log_level: loud\n", MINIMAL);
        let err = AppConfig::from_yaml(&yaml).unwrap().validate().unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_missing_threshold_is_yaml_error() {
        let yaml = "pair: { base: BTC, quote: USD }\nwindow_minutes: 5\n";
        assert!(matches!(AppConfig::from_yaml(yaml), Err(ConfigError::YamlError(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.window_minutes, 60);
    }

    #[test]
    fn test_read_skips_validation() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.replace("threshold_pct: 5.0", "threshold_pct: 0.0").as_bytes())
            .unwrap();

        let config = AppConfig::read(file.path()).unwrap();
        assert_eq!(config.threshold_pct, 0.0);
        assert!(AppConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/nonexistent/monitor_config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileError(_)));
    }
}
