//! CLI utilities for binaries
//!
//! Resolves the configuration file path from the command line and the
//! environment.

use std::path::PathBuf;

/// Type of configuration to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigType {
    /// Monitor configuration (monitor_config.yaml)
    Monitor,
    /// Explicit path, e.g. from the command line
    Custom(String),
}

impl ConfigType {
    /// Get the default path for this config type
    pub fn default_path(&self) -> &str {
        match self {
            ConfigType::Monitor => "config/monitor_config.yaml",
            ConfigType::Custom(path) => path,
        }
    }

    /// Environment variable that overrides the default path.
    ///
    /// Custom paths are never overridden.
    pub fn env_var_name(&self) -> Option<&str> {
        match self {
            ConfigType::Monitor => Some("MONITOR_CONFIG_PATH"),
            ConfigType::Custom(_) => None,
        }
    }
}

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use crypto_alert_bot::bin_common::{load_config_from_env, ConfigType};
///
/// let path = load_config_from_env(ConfigType::Custom("my.yaml".to_string()));
/// assert_eq!(path.to_str(), Some("my.yaml"));
/// ```
pub fn load_config_from_env(config_type: ConfigType) -> PathBuf {
    config_type
        .env_var_name()
        .and_then(|name| std::env::var(name).ok())
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| config_type.default_path().to_string())
        .into()
}

/// Pick the config type from the arguments: the first positional argument
/// is a custom path, otherwise the monitor default applies
pub fn config_type_from_args(args: &[String]) -> ConfigType {
    args.iter()
        .find(|arg| !arg.starts_with('-'))
        .map(|path| ConfigType::Custom(path.clone()))
        .unwrap_or(ConfigType::Monitor)
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_type_paths() {
        assert_eq!(ConfigType::Monitor.default_path(), "config/monitor_config.yaml");

        let custom = ConfigType::Custom("custom/path.yaml".to_string());
        assert_eq!(custom.default_path(), "custom/path.yaml");
    }

    #[test]
    fn test_config_type_env_vars() {
        assert_eq!(ConfigType::Monitor.env_var_name(), Some("MONITOR_CONFIG_PATH"));
        assert_eq!(ConfigType::Custom("x.yaml".to_string()).env_var_name(), None);
    }

    #[test]
    fn test_config_type_from_args() {
        assert_eq!(config_type_from_args(&[]), ConfigType::Monitor);
        assert_eq!(
            config_type_from_args(&["--verbose".to_string(), "eth.yaml".to_string()]),
            ConfigType::Custom("eth.yaml".to_string())
        );
    }
}
