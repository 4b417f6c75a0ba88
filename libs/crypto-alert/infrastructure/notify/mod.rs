//! Alert delivery channels

mod log_sink;
mod message;
mod webhook;

pub use log_sink::LogAlertSink;
pub use message::AlertMessage;
pub use webhook::WebhookAlertSink;
