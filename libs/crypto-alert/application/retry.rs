//! Timeout and bounded retry around a sample source
//!
//! Every fetch runs under a per-call timeout. Retryable failures are retried
//! with exponential backoff up to `max_retries` times; once the budget is
//! spent the last retryable error is returned so the monitor can skip the
//! tick. Fatal errors are returned immediately.

use super::traits::{SampleError, SampleSource};
use crate::domain::Sample;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

/// Retry budget and timing for one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Upper bound for a single attempt
    pub request_timeout: Duration,
    /// Extra attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further retry
    pub initial_backoff: Duration,
    /// Cap for the doubled delay
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): initial * 2^(retry-1), capped
    pub fn backoff_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

/// Sample source decorator adding timeout and bounded retries
pub struct RetryingSource<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: SampleSource> RetryingSource<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn attempt(&self) -> Result<Sample, SampleError> {
        match timeout(self.policy.request_timeout, self.inner.fetch()).await {
            Ok(result) => result,
            Err(_) => Err(SampleError::retryable(format!(
                "request timed out after {:?}",
                self.policy.request_timeout
            ))),
        }
    }
}

#[async_trait]
impl<S: SampleSource> SampleSource for RetryingSource<S> {
    async fn fetch(&self) -> Result<Sample, SampleError> {
        let mut retry = 0;

        loop {
            match self.attempt().await {
                Ok(sample) => {
                    if retry > 0 {
                        debug!("[Sampling] Recovered after {} retries", retry);
                    }
                    return Ok(sample);
                }
                Err(e) if e.is_retryable() && retry < self.policy.max_retries => {
                    retry += 1;
                    let backoff = self.policy.backoff_for(retry);
                    warn!(
                        "[Sampling] Attempt failed ({}/{}), retrying in {:?}: {}",
                        retry, self.policy.max_retries, backoff, e
                    );
                    sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
