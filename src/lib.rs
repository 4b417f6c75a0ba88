//! Crypto Alert Bot - Main Library
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners, exit codes)
//! - **crypto_alert**: Monitoring engine (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use crypto_alert_bot::bin_common::{load_config_from_env, ConfigType};
//! use crypto_alert_bot::crypto_alert::PriceMonitor;
//! ```

// Re-export workspace libraries for convenience
pub use crypto_alert;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{config_type_from_args, load_config_from_env, parse_args, ConfigType};
    pub use runner::{AppExit, BinaryRunner, RunConfig};
}
