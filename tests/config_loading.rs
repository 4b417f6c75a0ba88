//! Integration test: Configuration utilities
//!
//! Tests config path resolution and the shipped monitor configuration.

use crypto_alert_bot::bin_common::{config_type_from_args, load_config_from_env, AppExit, ConfigType};
use crypto_alert_bot::crypto_alert::{AppConfig, MarketType};
use std::env;
use std::path::Path;

#[test]
fn test_monitor_config_default_and_override() {
    // one test owns the env var, tests run in parallel
    env::remove_var("MONITOR_CONFIG_PATH");
    let config_path = load_config_from_env(ConfigType::Monitor);
    assert_eq!(config_path.to_str().unwrap(), "config/monitor_config.yaml");

    env::set_var("MONITOR_CONFIG_PATH", "/etc/crypto-alert/eth.yaml");
    let config_path = load_config_from_env(ConfigType::Monitor);
    assert_eq!(config_path.to_str().unwrap(), "/etc/crypto-alert/eth.yaml");

    // an explicit path wins over the environment
    let config_path = load_config_from_env(config_type_from_args(&["local.yaml".to_string()]));
    assert_eq!(config_path.to_str().unwrap(), "local.yaml");

    env::remove_var("MONITOR_CONFIG_PATH");
}

#[test]
fn test_custom_config() {
    let custom = ConfigType::Custom("custom/path.yaml".to_string());
    let config_path = load_config_from_env(custom);

    assert_eq!(config_path.to_str().unwrap(), "custom/path.yaml");
}

#[test]
fn test_shipped_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/monitor_config.yaml");
    let yaml = std::fs::read_to_string(path).unwrap();
    let config = AppConfig::from_yaml(&yaml).unwrap();
    config.validate().unwrap();

    let monitor = config.to_monitor_config().unwrap();
    assert_eq!(monitor.pair().symbol(), "BTC-USD");
    assert_eq!(monitor.market_type(), MarketType::Spot);
    assert_eq!(monitor.window(), 60);
    assert_eq!(monitor.capacity(), 720);
}

#[test]
fn test_missing_config_maps_to_config_exit() {
    let err = AppConfig::load("/nonexistent/monitor_config.yaml").unwrap_err();
    assert_eq!(AppExit::from_error(&anyhow::Error::from(err)), AppExit::Config);
}
