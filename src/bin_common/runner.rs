//! Binary runner utilities
//!
//! Provides a standardized way to run binaries with startup/shutdown
//! banners and process exit codes.

use crypto_alert::domain::MonitorConfigError;
use crypto_alert::infrastructure::client::coinbase::CatalogError;
use crypto_alert::{ConfigError, MonitorError};
use std::process::ExitCode;
use tracing::{error, info};

/// Configuration for running a binary application
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Name of the binary (for logging)
    pub name: String,
    /// Heartbeat interval in seconds
    pub heartbeat_interval_secs: u64,
    /// Main loop interval (if applicable)
    pub loop_interval_secs: Option<f64>,
}

impl RunConfig {
    /// Create a new run configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            heartbeat_interval_secs: 300, // 5 minutes default
            loop_interval_secs: None,
        }
    }

    /// Set heartbeat interval
    pub fn with_heartbeat(mut self, secs: u64) -> Self {
        self.heartbeat_interval_secs = secs;
        self
    }

    /// Set loop interval
    pub fn with_loop_interval(mut self, secs: f64) -> Self {
        self.loop_interval_secs = Some(secs);
        self
    }

    /// Interval lines shown in the startup banner
    pub fn banner_details(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        if let Some(secs) = self.loop_interval_secs {
            lines.push(format!("Loop interval: {}s", secs));
        }
        if self.heartbeat_interval_secs > 0 {
            lines.push(format!("Heartbeat: every {}s", self.heartbeat_interval_secs));
        } else {
            lines.push("Heartbeat: off".to_string());
        }
        lines
    }
}

// =============================================================================
// Exit codes
// =============================================================================

/// Process outcome, mapped to the exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppExit {
    /// 0: stopped on request
    Clean,
    /// 1: anything not covered below
    Failure,
    /// 2: invalid configuration or pair
    Config,
    /// 3: the price service is down
    ServiceDown,
}

impl AppExit {
    pub fn code(&self) -> u8 {
        match self {
            AppExit::Clean => 0,
            AppExit::Failure => 1,
            AppExit::Config => 2,
            AppExit::ServiceDown => 3,
        }
    }

    /// Classify an error surfaced at the binary edge
    pub fn from_error(err: &anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<MonitorError>() {
            return if e.is_service_down() {
                AppExit::ServiceDown
            } else {
                AppExit::Failure
            };
        }
        if err.downcast_ref::<ConfigError>().is_some()
            || err.downcast_ref::<CatalogError>().is_some()
            || err.downcast_ref::<MonitorConfigError>().is_some()
        {
            return AppExit::Config;
        }
        AppExit::Failure
    }
}

impl From<AppExit> for ExitCode {
    fn from(exit: AppExit) -> Self {
        ExitCode::from(exit.code())
    }
}

// =============================================================================
// BinaryRunner
// =============================================================================

/// Trait for binary applications
pub trait BinaryRunner {
    /// Run the application main loop
    async fn run(&mut self) -> anyhow::Result<()>;

    /// Get the run configuration
    fn config(&self) -> &RunConfig;

    /// One-line summary logged on shutdown
    fn summary(&self) -> Option<String> {
        None
    }

    /// Print startup banner
    fn print_banner(&self) {
        let config = self.config();
        info!("");
        info!("========================================");
        info!("Starting {}", config.name);
        for line in config.banner_details() {
            info!("{}", line);
        }
        info!("Press Ctrl+C to stop");
        info!("========================================");
        info!("");
    }

    /// Print shutdown banner
    fn print_shutdown(&self, exit: AppExit) {
        let config = self.config();
        info!("");
        info!("========================================");
        match exit {
            AppExit::Clean => info!("{} stopped gracefully", config.name),
            other => error!("{} stopped (exit code {})", config.name, other.code()),
        }
        if let Some(summary) = self.summary() {
            info!("{}", summary);
        }
        info!("========================================");
    }

    /// Execute the binary with banners and return the exit status
    async fn execute(&mut self) -> AppExit {
        self.print_banner();
        let exit = match self.run().await {
            Ok(()) => AppExit::Clean,
            Err(e) => {
                error!("{:#}", e);
                AppExit::from_error(&e)
            }
        };
        self.print_shutdown(exit);
        exit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crypto_alert::SampleError;

    #[test]
    fn test_run_config_builder() {
        let config = RunConfig::new("test-binary")
            .with_heartbeat(120)
            .with_loop_interval(60.0);

        assert_eq!(config.name, "test-binary");
        assert_eq!(config.heartbeat_interval_secs, 120);
        assert_eq!(config.loop_interval_secs, Some(60.0));
    }

    #[test]
    fn test_default_config() {
        let config = RunConfig::new("default");
        assert_eq!(config.heartbeat_interval_secs, 300);
        assert_eq!(config.loop_interval_secs, None);
    }

    #[test]
    fn test_banner_details() {
        let config = RunConfig::new("monitor").with_heartbeat(120).with_loop_interval(60.0);
        assert_eq!(config.banner_details(), vec!["Loop interval: 60s", "Heartbeat: every 120s"]);

        let quiet = RunConfig::new("monitor").with_heartbeat(0);
        assert_eq!(quiet.banner_details(), vec!["Heartbeat: off"]);
    }

    #[test]
    fn test_exit_codes() {
        let down = anyhow::Error::from(MonitorError::SourceFailed(SampleError::fatal("no data")));
        assert_eq!(AppExit::from_error(&down), AppExit::ServiceDown);
        assert_eq!(AppExit::from_error(&down).code(), 3);

        let config = anyhow::Error::from(ConfigError::ValidationError("bad".to_string()));
        assert_eq!(AppExit::from_error(&config), AppExit::Config);

        let other = anyhow::anyhow!("boom");
        assert_eq!(AppExit::from_error(&other), AppExit::Failure);
        assert_eq!(AppExit::Clean.code(), 0);
    }
}
