//! Collaborator contracts
//!
//! The monitor only needs two capabilities from the outside world: fetching
//! a `(price, timestamp)` sample and delivering an alert. Both are passed in
//! explicitly when the monitor is built. The alert sink doubles as the
//! operator channel for service notices.

use crate::domain::{AlertEvent, Sample, ServiceNotice, StartupNotice};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Failure modes of a sample fetch
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    /// Transport-level or rate-limit failure, the next tick may succeed
    #[error("retryable sampling failure: {0}")]
    Retryable(String),

    /// Malformed or absent data, unknown symbol, hard API rejection
    #[error("fatal sampling failure: {0}")]
    Fatal(String),
}

impl SampleError {
    pub fn retryable(msg: impl Into<String>) -> Self {
        SampleError::Retryable(msg.into())
    }

    pub fn fatal(msg: impl Into<String>) -> Self {
        SampleError::Fatal(msg.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, SampleError::Retryable(_))
    }
}

/// Failure to deliver a notification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("alert delivery failed: {0}")]
    Delivery(String),

    #[error("alert endpoint rejected the message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Supplies the current price sample
#[async_trait]
pub trait SampleSource: Send + Sync {
    async fn fetch(&self) -> Result<Sample, SampleError>;
}

/// Receives structured alert events and is responsible for delivery
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn emit(&self, event: &AlertEvent) -> Result<(), SinkError>;

    /// Tell the operator the monitor is stopping because sampling failed.
    ///
    /// The default implementation does nothing.
    async fn notify_service_down(&self, _notice: &ServiceNotice) -> Result<(), SinkError> {
        Ok(())
    }

    /// Tell the operator about a startup problem: backup symbol lists in
    /// use, or a configuration that cannot start.
    ///
    /// The default implementation does nothing.
    async fn notify_startup(&self, _notice: &StartupNotice) -> Result<(), SinkError> {
        Ok(())
    }
}

#[async_trait]
impl<T: SampleSource + ?Sized> SampleSource for Arc<T> {
    async fn fetch(&self) -> Result<Sample, SampleError> {
        (**self).fetch().await
    }
}

#[async_trait]
impl<T: AlertSink + ?Sized> AlertSink for Arc<T> {
    async fn emit(&self, event: &AlertEvent) -> Result<(), SinkError> {
        (**self).emit(event).await
    }

    async fn notify_service_down(&self, notice: &ServiceNotice) -> Result<(), SinkError> {
        (**self).notify_service_down(notice).await
    }

    async fn notify_startup(&self, notice: &StartupNotice) -> Result<(), SinkError> {
        (**self).notify_startup(notice).await
    }
}

#[async_trait]
impl<T: SampleSource + ?Sized> SampleSource for Box<T> {
    async fn fetch(&self) -> Result<Sample, SampleError> {
        (**self).fetch().await
    }
}

#[async_trait]
impl<T: AlertSink + ?Sized> AlertSink for Box<T> {
    async fn emit(&self, event: &AlertEvent) -> Result<(), SinkError> {
        (**self).emit(event).await
    }

    async fn notify_service_down(&self, notice: &ServiceNotice) -> Result<(), SinkError> {
        (**self).notify_service_down(notice).await
    }

    async fn notify_startup(&self, notice: &StartupNotice) -> Result<(), SinkError> {
        (**self).notify_startup(notice).await
    }
}
