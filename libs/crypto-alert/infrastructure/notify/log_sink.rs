//! Alert sink writing to the log, used when no webhook is configured

use super::message::AlertMessage;
use crate::application::{AlertSink, SinkError};
use crate::domain::{AlertEvent, ServiceNotice, StartupNotice};
use async_trait::async_trait;
use tracing::{error, warn};

#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

impl LogAlertSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertSink for LogAlertSink {
    async fn emit(&self, event: &AlertEvent) -> Result<(), SinkError> {
        let message = AlertMessage::from_event(event);
        warn!(
            pair = %event.pair,
            direction = %event.direction,
            percentage = event.percentage,
            "[Alert] {}",
            message.subject
        );
        for line in message.text.lines().filter(|l| !l.is_empty()) {
            warn!("[Alert]   {}", line);
        }
        Ok(())
    }

    async fn notify_service_down(&self, notice: &ServiceNotice) -> Result<(), SinkError> {
        let message = AlertMessage::from_notice(notice);
        error!("[Alert] {}: {}", message.subject, notice.reason);
        Ok(())
    }

    async fn notify_startup(&self, notice: &StartupNotice) -> Result<(), SinkError> {
        let message = AlertMessage::from_startup(notice);
        warn!("[Alert] {}: {}", message.subject, notice.reason);
        Ok(())
    }
}
