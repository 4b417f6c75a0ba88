//! Graceful shutdown management

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::Notify;
use tokio::time::sleep;
use tracing::info;

/// Manages graceful shutdown for the monitor process
#[derive(Clone)]
pub struct ShutdownManager {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownManager {
    /// Create a new shutdown manager with running state
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(true)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Spawn a Ctrl+C signal handler that triggers shutdown
    pub fn spawn_signal_handler(&self) {
        let manager = self.clone();
        tokio::spawn(async move {
            if signal::ctrl_c().await.is_ok() {
                info!("");
                info!("Received shutdown signal (Ctrl+C)");
                info!("Shutting down gracefully...");
                manager.trigger();
            }
        });
    }

    /// Request shutdown and wake everything waiting in `cancelled`
    pub fn trigger(&self) {
        self.flag.store(false, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Check if the process should continue running
    pub fn is_running(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Get a clone of the shutdown flag for passing to async tasks
    pub fn flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Resolves once shutdown has been requested
    pub async fn cancelled(&self) {
        loop {
            // register before checking the flag so a trigger in between is not lost
            let notified = self.notify.notified();
            if !self.is_running() {
                return;
            }
            notified.await;
        }
    }

    /// Sleep for a duration, but wake early if shutdown is triggered.
    ///
    /// Returns `true` if the full duration elapsed.
    pub async fn interruptible_sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = sleep(duration) => self.is_running(),
            _ = self.cancelled() => false,
        }
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_sleep_completes_when_running() {
        let shutdown = ShutdownManager::new();
        assert!(shutdown.interruptible_sleep(Duration::from_millis(5)).await);
        assert!(shutdown.is_running());
    }

    #[tokio::test]
    async fn test_trigger_interrupts_sleep() {
        let shutdown = ShutdownManager::new();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            sleep(Duration::from_millis(10)).await;
            trigger.trigger();
        });

        let start = Instant::now();
        assert!(!shutdown.interruptible_sleep(Duration::from_secs(30)).await);
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(!shutdown.is_running());
    }

    #[tokio::test]
    async fn test_cancelled_returns_after_trigger() {
        let shutdown = ShutdownManager::new();
        shutdown.trigger();
        shutdown.cancelled().await;
        assert!(!shutdown.flag().load(Ordering::Acquire));
    }
}
