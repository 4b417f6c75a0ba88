//! Application Layer
//!
//! The monitor loop, startup notices and the contracts the monitor expects
//! from its collaborators.

pub mod monitor;
pub mod retry;
pub mod startup;
pub mod stats;
pub mod traits;

pub use monitor::{LoopConfig, MonitorError, MonitorState, PriceMonitor, TickOutcome};
pub use retry::{RetryPolicy, RetryingSource};
pub use startup::{report_startup_failure, send_startup_notice};
pub use stats::{MonitorStats, SharedMonitorStats};
pub use traits::{AlertSink, SampleError, SampleSource, SinkError};
