//! Crypto price alert service
//!
//! Usage: crypto-alert [CONFIG_PATH]
//!
//! Samples one Coinbase pair every interval and raises an alert when the
//! price moves by at least the configured percentage over the window.

use anyhow::{Context, Result};
use crypto_alert::application::SharedMonitorStats;
use crypto_alert::infrastructure::client::coinbase::{CoinbaseClient, CoinbaseSampleSource, SymbolCatalog};
use crypto_alert::infrastructure::notify::{LogAlertSink, WebhookAlertSink};
use crypto_alert::{
    init_tracing, init_tracing_with_level, AlertSink, AppConfig, PriceMonitor, RetryingSource, ShutdownManager,
    SinkError,
};
use crypto_alert_bot::bin_common::{
    config_type_from_args, load_config_from_env, parse_args, AppExit, BinaryRunner, RunConfig,
};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};

type CoinbaseMonitor = PriceMonitor<RetryingSource<CoinbaseSampleSource>, Arc<dyn AlertSink>>;

/// Webhook when configured, the log otherwise
fn alert_sink(config: &AppConfig) -> Result<Arc<dyn AlertSink>, SinkError> {
    match &config.alerts.webhook_url {
        Some(url) => Ok(Arc::new(WebhookAlertSink::new(url, config.request_timeout())?)),
        None => {
            warn!("ALERT_WEBHOOK_URL not set, alerts are written to the log only");
            Ok(Arc::new(LogAlertSink::new()))
        }
    }
}

struct MonitorApp {
    run_config: RunConfig,
    monitor: CoinbaseMonitor,
    stats: SharedMonitorStats,
    shutdown: ShutdownManager,
}

impl MonitorApp {
    async fn build(config: &AppConfig, sink: Arc<dyn AlertSink>) -> Result<Self> {
        let mut monitor_config = config.to_monitor_config()?;

        let client = Arc::new(
            CoinbaseClient::new(&config.coinbase.base_url, config.request_timeout())
                .context("failed to build Coinbase client")?,
        );

        let catalog = SymbolCatalog::load(&client).await;
        let resolved = catalog.resolve_and_report(monitor_config.pair(), &*sink).await?;
        if resolved.swapped {
            warn!(
                "{} is currency-first, monitoring {} instead",
                monitor_config.pair(),
                resolved.pair
            );
            monitor_config = monitor_config.with_pair(resolved.pair)?;
        }

        let source = RetryingSource::new(
            CoinbaseSampleSource::new(client, monitor_config.pair().clone(), monitor_config.market_type()),
            config.retry_policy(),
        );

        let run_config = RunConfig::new(format!("Crypto Alert {}", monitor_config.pair()))
            .with_heartbeat(config.heartbeat_interval_secs)
            .with_loop_interval(config.sampling.interval_secs as f64);

        let monitor = PriceMonitor::new(monitor_config, config.loop_config(), source, sink);
        let stats = monitor.stats_handle();

        let shutdown = ShutdownManager::new();
        shutdown.spawn_signal_handler();

        Ok(Self {
            run_config,
            monitor,
            stats,
            shutdown,
        })
    }
}

impl BinaryRunner for MonitorApp {
    async fn run(&mut self) -> Result<()> {
        self.monitor.run(&self.shutdown).await?;
        Ok(())
    }

    fn config(&self) -> &RunConfig {
        &self.run_config
    }

    fn summary(&self) -> Option<String> {
        Some(self.stats.read().summary())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config_path = load_config_from_env(config_type_from_args(&parse_args()));
    let config = match AppConfig::read(&config_path) {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            error!("Failed to load {}: {}", config_path.display(), e);
            return AppExit::Config.into();
        }
    };

    init_tracing_with_level(&config.log_level);
    info!("Config: {}", config_path.display());

    // the alert channel comes first so startup failures reach the operator
    let sink = match alert_sink(&config) {
        Ok(sink) => sink,
        Err(e) => {
            error!("Failed to build alert sink: {}", e);
            return AppExit::Failure.into();
        }
    };

    if let Err(e) = config.validate_or_notify(&*sink).await {
        error!("Invalid configuration in {}: {}", config_path.display(), e);
        return AppExit::Config.into();
    }
    config.log();

    let mut app = match MonitorApp::build(&config, sink).await {
        Ok(app) => app,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return AppExit::from_error(&e).into();
        }
    };

    app.execute().await.into()
}
