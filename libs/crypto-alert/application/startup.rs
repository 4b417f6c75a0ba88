//! Startup notices
//!
//! Problems found before the monitor loop starts are reported through the
//! same sink as alerts. Delivery is best-effort: a notice that cannot be
//! sent is logged and startup carries on (or fails) as it would anyway.

use super::traits::AlertSink;
use crate::domain::{StartupNotice, StartupNoticeKind, TradingPair};
use std::fmt::Display;
use tracing::{error, warn};

/// Deliver one startup notice, returning whether the sink accepted it
pub async fn send_startup_notice<A: AlertSink + ?Sized>(sink: &A, notice: &StartupNotice) -> bool {
    match notice.kind {
        StartupNoticeKind::CatalogFallback => warn!("[Startup] {}: {}", notice.pair, notice.reason),
        StartupNoticeKind::StartupFailed => error!("[Startup] {} failed to start: {}", notice.pair, notice.reason),
    }

    match sink.notify_startup(notice).await {
        Ok(()) => true,
        Err(e) => {
            warn!("[Startup] Failed to deliver {:?} notice: {}", notice.kind, e);
            false
        }
    }
}

/// Tell the operator the service will not start for `pair`
pub async fn report_startup_failure<A, E>(sink: &A, pair: &TradingPair, err: &E) -> bool
where
    A: AlertSink + ?Sized,
    E: Display + ?Sized,
{
    let notice = StartupNotice::startup_failed(pair.clone(), format!("{:#}", err));
    send_startup_notice(sink, &notice).await
}
