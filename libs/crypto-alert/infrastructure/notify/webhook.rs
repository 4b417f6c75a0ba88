//! Webhook alert delivery
//!
//! POSTs `{"subject", "text", "event"}` JSON to a configured URL. Works with
//! chat webhooks that read `text` as well as with custom receivers that want
//! the structured event.

use super::message::AlertMessage;
use crate::application::{AlertSink, SinkError};
use crate::domain::{AlertEvent, ServiceNotice, StartupNotice};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct WebhookPayload<'a, T: Serialize> {
    subject: &'a str,
    text: &'a str,
    event: &'a T,
}

pub struct WebhookAlertSink {
    url: String,
    client: Client,
}

impl WebhookAlertSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| SinkError::Delivery(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post<T: Serialize + Sync>(&self, message: &AlertMessage, event: &T) -> Result<(), SinkError> {
        let payload = WebhookPayload {
            subject: &message.subject,
            text: &message.text,
            event,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SinkError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("[Alert] Webhook accepted '{}' ({})", message.subject, status);
        Ok(())
    }
}

#[async_trait]
impl AlertSink for WebhookAlertSink {
    async fn emit(&self, event: &AlertEvent) -> Result<(), SinkError> {
        let message = AlertMessage::from_event(event);
        self.post(&message, event).await?;
        info!("[Alert] Sent: {}", message.subject);
        Ok(())
    }

    async fn notify_service_down(&self, notice: &ServiceNotice) -> Result<(), SinkError> {
        let message = AlertMessage::from_notice(notice);
        self.post(&message, notice).await
    }

    async fn notify_startup(&self, notice: &StartupNotice) -> Result<(), SinkError> {
        let message = AlertMessage::from_startup(notice);
        self.post(&message, notice).await
    }
}
