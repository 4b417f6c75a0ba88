//! Infrastructure Layer
//!
//! Configuration loading, the Coinbase client and alert delivery.

pub mod client;
pub mod config;
pub mod notify;

pub use config::{AppConfig, ConfigError};
