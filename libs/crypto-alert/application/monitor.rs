//! Monitor Loop
//!
//! Drives one pair/window on a fixed cadence:
//! fetch sample -> put into cache -> look up the window-ago slot ->
//! evaluate -> emit alert -> wait for the next tick.
//!
//! The tick counter advances on every iteration, including ticks skipped
//! after a transient fetch failure, so that `tick - window` keeps meaning
//! "window minutes ago".

use super::stats::{MonitorStats, SharedMonitorStats};
use super::traits::{AlertSink, SampleError, SampleSource};
use crate::domain::{
    AlertEvent, CacheError, CircularPriceCache, EvaluationError, LaggedSample, MonitorConfig,
    ServiceNotice, ThresholdEvaluator,
};
use crate::utils::{Heartbeat, ShutdownManager};
use chrono::Utc;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, error, info, warn};

// =============================================================================
// Errors & States
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MonitorError {
    #[error("sample source failed: {0}")]
    SourceFailed(SampleError),

    #[error("sample source unavailable for {failures} consecutive ticks, last error: {last}")]
    SourceUnavailable { failures: u32, last: SampleError },

    #[error("cache lookup failed: {0}")]
    Cache(#[from] CacheError),
}

impl MonitorError {
    /// True for failures that mean the price service is down
    pub fn is_service_down(&self) -> bool {
        matches!(
            self,
            MonitorError::SourceFailed(_) | MonitorError::SourceUnavailable { .. }
        )
    }
}

/// Lifecycle state of the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// `tick < window`: no sample is old enough to compare against yet
    Warming,
    /// Steady state, one comparison per tick
    Running,
    /// Stopped on a fatal sampling failure
    Failed,
    /// Stopped by an external shutdown request
    Stopped,
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MonitorState::Warming => "WARMING",
            MonitorState::Running => "RUNNING",
            MonitorState::Failed => "FAILED",
            MonitorState::Stopped => "STOPPED",
        };
        f.write_str(s)
    }
}

/// What happened during one tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Transient fetch failure, nothing written
    Skipped(SampleError),
    /// Sample stored, not enough history for the window yet
    Warming,
    /// Sample stored, but the lagged tick was itself skipped
    Gap { lagged_tick: u64 },
    /// Compared, change below threshold
    BelowThreshold,
    /// Compared, but the comparison is undefined (zero lagged price)
    Unevaluable(EvaluationError),
    /// Threshold crossed and the alert was delivered
    Alerted(AlertEvent),
    /// Threshold crossed, delivery failed on every attempt
    AlertDropped(AlertEvent),
}

// =============================================================================
// Loop Configuration
// =============================================================================

/// Timing and failure budgets of the loop
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    /// Cadence of one tick
    pub sampling_interval: Duration,
    /// Consecutive skipped ticks tolerated before the source is declared down (0 = never)
    pub max_consecutive_failures: u32,
    /// Delivery attempts per alert before it is dropped
    pub max_delivery_attempts: u32,
    /// Pause between delivery attempts
    pub delivery_backoff: Duration,
    /// Status line interval in seconds (0 = off)
    pub heartbeat_interval_secs: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            sampling_interval: Duration::from_secs(60),
            max_consecutive_failures: 10,
            max_delivery_attempts: 3,
            delivery_backoff: Duration::from_secs(2),
            heartbeat_interval_secs: 300,
        }
    }
}

// =============================================================================
// PriceMonitor
// =============================================================================

/// Single-pair, single-window monitor
pub struct PriceMonitor<S, A> {
    config: MonitorConfig,
    loop_config: LoopConfig,
    cache: CircularPriceCache,
    evaluator: ThresholdEvaluator,
    source: S,
    sink: A,
    tick: u64,
    state: MonitorState,
    consecutive_failures: u32,
    stats: SharedMonitorStats,
}

impl<S: SampleSource, A: AlertSink> PriceMonitor<S, A> {
    pub fn new(config: MonitorConfig, loop_config: LoopConfig, source: S, sink: A) -> Self {
        Self {
            cache: CircularPriceCache::new(config.capacity()),
            evaluator: ThresholdEvaluator::new(&config),
            config,
            loop_config,
            source,
            sink,
            tick: 0,
            state: MonitorState::Warming,
            consecutive_failures: 0,
            stats: MonitorStats::shared(),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Tick the next call to `run_tick` will process
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn cache(&self) -> &CircularPriceCache {
        &self.cache
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    /// Shared statistics, readable while the loop runs
    pub fn stats_handle(&self) -> SharedMonitorStats {
        self.stats.clone()
    }

    /// Run until shutdown is requested or sampling fails fatally.
    ///
    /// On a fatal failure the operator is notified through the sink before
    /// the error is returned.
    pub async fn run(&mut self, shutdown: &ShutdownManager) -> Result<(), MonitorError> {
        info!(
            pair = %self.config.pair(),
            market_type = %self.config.market_type(),
            window = self.config.window(),
            threshold = self.config.threshold(),
            capacity = self.config.capacity(),
            "[Monitor] Starting loop (interval: {:?})",
            self.loop_config.sampling_interval
        );

        let mut heartbeat = Heartbeat::new(self.loop_config.heartbeat_interval_secs);
        let mut cadence = interval(self.loop_config.sampling_interval);
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            // shutdown wins over a ready tick
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = cadence.tick() => {}
            }

            let result = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                result = self.run_tick() => result,
            };

            if let Err(e) = result {
                error!("[Monitor] Stopping at tick {}: {}", self.tick.saturating_sub(1), e);
                self.notify_service_down(&e).await;
                return Err(e);
            }

            if heartbeat.poll() {
                info!(
                    "[Monitor] {} state={} {}",
                    self.config.pair(),
                    self.state,
                    self.stats.read().summary()
                );
            }
        }

        self.state = MonitorState::Stopped;
        info!("[Monitor] Stopped at tick {}", self.tick);
        Ok(())
    }

    /// Process one tick and advance the tick counter
    pub async fn run_tick(&mut self) -> Result<TickOutcome, MonitorError> {
        let tick = self.tick;
        let result = self.process_tick(tick).await;
        self.tick += 1;
        self.stats.write().ticks += 1;
        result
    }

    async fn process_tick(&mut self, tick: u64) -> Result<TickOutcome, MonitorError> {
        let sample = match self.source.fetch().await {
            Ok(sample) => {
                if self.consecutive_failures > 0 {
                    info!(
                        "[Monitor] Sample source recovered after {} skipped ticks",
                        self.consecutive_failures
                    );
                }
                self.consecutive_failures = 0;
                sample
            }
            Err(e) if e.is_retryable() => return self.skip_tick(tick, e),
            Err(e) => {
                self.state = MonitorState::Failed;
                return Err(MonitorError::SourceFailed(e));
            }
        };

        self.cache.put(tick, sample);
        {
            let mut stats = self.stats.write();
            stats.samples += 1;
            stats.last_price = Some(sample.price);
            stats.last_sample_at = Some(sample.timestamp);
        }

        let window = self.config.window();
        let lookup = self.cache.get_current_and_lagged(tick, window)?;
        self.state = if tick < window as u64 {
            MonitorState::Warming
        } else {
            MonitorState::Running
        };

        let lagged = match lookup.lagged {
            LaggedSample::Available(lagged) => lagged,
            LaggedSample::InsufficientHistory => {
                debug!("[Monitor] tick {} warming ({}/{})", tick, tick + 1, window);
                self.stats.write().warming_ticks += 1;
                return Ok(TickOutcome::Warming);
            }
            LaggedSample::Missing { lagged_tick } => {
                debug!("[Monitor] tick {} has no sample for lagged tick {}", tick, lagged_tick);
                self.stats.write().gaps += 1;
                return Ok(TickOutcome::Gap { lagged_tick });
            }
        };
        let current = lookup.current.unwrap_or(sample);

        self.stats.write().evaluations += 1;
        match self.evaluator.evaluate(&current, &lagged) {
            Ok(None) => {
                debug!(
                    "[Monitor] tick {} price {} vs {} ({} min ago), below {}%",
                    tick,
                    current.price,
                    lagged.price,
                    window,
                    self.evaluator.threshold()
                );
                Ok(TickOutcome::BelowThreshold)
            }
            Ok(Some(event)) => {
                info!(
                    "[Monitor] {} {} {:.3}% in {} min ({} -> {})",
                    event.pair, event.direction, event.percentage, event.window, event.lagged_price, event.current_price
                );
                if self.deliver(&event).await {
                    self.stats.write().alerts_emitted += 1;
                    Ok(TickOutcome::Alerted(event))
                } else {
                    self.stats.write().alerts_dropped += 1;
                    Ok(TickOutcome::AlertDropped(event))
                }
            }
            Err(e) => {
                warn!("[Monitor] tick {} not evaluated: {}", tick, e);
                self.stats.write().zero_price_skips += 1;
                Ok(TickOutcome::Unevaluable(e))
            }
        }
    }

    fn skip_tick(&mut self, tick: u64, e: SampleError) -> Result<TickOutcome, MonitorError> {
        self.consecutive_failures += 1;
        self.stats.write().skipped_ticks += 1;

        let budget = self.loop_config.max_consecutive_failures;
        if budget > 0 && self.consecutive_failures >= budget {
            self.state = MonitorState::Failed;
            return Err(MonitorError::SourceUnavailable {
                failures: self.consecutive_failures,
                last: e,
            });
        }

        warn!(
            "[Monitor] tick {} skipped ({} consecutive): {}",
            tick, self.consecutive_failures, e
        );
        Ok(TickOutcome::Skipped(e))
    }

    /// Hand the event to the sink with a bounded number of attempts
    async fn deliver(&self, event: &AlertEvent) -> bool {
        let attempts = self.loop_config.max_delivery_attempts.max(1);

        for attempt in 1..=attempts {
            match self.sink.emit(event).await {
                Ok(()) => return true,
                Err(e) => {
                    warn!("[Monitor] Alert delivery failed ({}/{}): {}", attempt, attempts, e);
                    if attempt < attempts {
                        sleep(self.loop_config.delivery_backoff).await;
                    }
                }
            }
        }

        error!(
            "[Monitor] Dropping {} alert for {} after {} attempts",
            event.direction, event.pair, attempts
        );
        false
    }

    async fn notify_service_down(&self, e: &MonitorError) {
        let notice = ServiceNotice {
            pair: self.config.pair().clone(),
            market_type: self.config.market_type(),
            reason: e.to_string(),
            tick: self.tick.saturating_sub(1),
            occurred_at: Utc::now(),
        };
        if let Err(sink_err) = self.sink.notify_service_down(&notice).await {
            error!("[Monitor] Could not notify operator: {}", sink_err);
        }
    }
}
