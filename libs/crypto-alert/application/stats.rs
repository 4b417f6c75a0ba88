//! Monitor statistics
//!
//! Counters updated by the monitor loop and readable from other tasks
//! (status logging, shutdown summary).

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared statistics handle
pub type SharedMonitorStats = Arc<RwLock<MonitorStats>>;

#[derive(Debug, Clone)]
pub struct MonitorStats {
    pub started_at: DateTime<Utc>,
    pub ticks: u64,
    pub samples: u64,
    pub skipped_ticks: u64,
    pub warming_ticks: u64,
    pub gaps: u64,
    pub evaluations: u64,
    pub zero_price_skips: u64,
    pub alerts_emitted: u64,
    pub alerts_dropped: u64,
    pub last_price: Option<f64>,
    pub last_sample_at: Option<DateTime<Utc>>,
}

impl Default for MonitorStats {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            ticks: 0,
            samples: 0,
            skipped_ticks: 0,
            warming_ticks: 0,
            gaps: 0,
            evaluations: 0,
            zero_price_skips: 0,
            alerts_emitted: 0,
            alerts_dropped: 0,
            last_price: None,
            last_sample_at: None,
        }
    }
}

impl MonitorStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedMonitorStats {
        Arc::new(RwLock::new(Self::new()))
    }

    /// One-line summary for heartbeat and shutdown logs
    pub fn summary(&self) -> String {
        let uptime = Utc::now().signed_duration_since(self.started_at);
        let last = self
            .last_price
            .map(|p| format!("{:.8}", p))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "uptime={}m ticks={} samples={} skipped={} evaluations={} alerts={} dropped={} last_price={}",
            uptime.num_minutes(),
            self.ticks,
            self.samples,
            self.skipped_ticks,
            self.evaluations,
            self.alerts_emitted,
            self.alerts_dropped,
            last
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_mentions_counters() {
        let mut stats = MonitorStats::new();
        stats.ticks = 12;
        stats.alerts_emitted = 2;
        stats.last_price = Some(64000.5);

        let summary = stats.summary();
        assert!(summary.contains("ticks=12"));
        assert!(summary.contains("alerts=2"));
        assert!(summary.contains("last_price=64000.50000000"));
    }

    #[test]
    fn test_summary_without_price() {
        assert!(MonitorStats::new().summary().contains("last_price=-"));
    }
}
