//! Human-readable alert text

use crate::domain::{AlertEvent, Direction, ServiceNotice, StartupNotice, StartupNoticeKind};
use serde::Serialize;

/// Subject line plus plain-text body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertMessage {
    pub subject: String,
    pub text: String,
}

impl AlertMessage {
    pub fn from_event(event: &AlertEvent) -> Self {
        let verb = match event.direction {
            Direction::Up => "up",
            Direction::Down => "down",
        };

        let subject = format!(
            "{} {} {:.3}% in the last {} minutes",
            event.pair, verb, event.percentage, event.window
        );

        let text = format!(
            "{pair} ({market}) moved {verb} {pct:.3}% over {window} minutes, \
             crossing the {threshold}% threshold.\n\
             \n\
             Now:     {current} at {current_ts}\n\
             Before:  {lagged} at {lagged_ts}\n",
            pair = event.pair,
            market = event.market_type,
            verb = verb,
            pct = event.percentage,
            window = event.window,
            threshold = event.threshold,
            current = event.current_price,
            current_ts = event.current_timestamp.to_rfc3339(),
            lagged = event.lagged_price,
            lagged_ts = event.lagged_timestamp.to_rfc3339(),
        );

        Self { subject, text }
    }

    pub fn from_notice(notice: &ServiceNotice) -> Self {
        Self {
            subject: format!("Price monitor for {} stopped, service is down", notice.pair),
            text: format!(
                "Monitoring of {} ({}) stopped at tick {} ({}).\n\nReason: {}\n",
                notice.pair,
                notice.market_type,
                notice.tick,
                notice.occurred_at.to_rfc3339(),
                notice.reason
            ),
        }
    }

    pub fn from_startup(notice: &StartupNotice) -> Self {
        let subject = match notice.kind {
            StartupNoticeKind::CatalogFallback => {
                format!("Price monitor for {} is using backup symbol lists", notice.pair)
            }
            StartupNoticeKind::StartupFailed => format!("Price monitor for {} failed to start", notice.pair),
        };

        Self {
            subject,
            text: format!(
                "Startup of the {} monitor at {}.\n\nReason: {}\n",
                notice.pair,
                notice.occurred_at.to_rfc3339(),
                notice.reason
            ),
        }
    }
}
