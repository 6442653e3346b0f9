//! readsieve Telemetry
//!
//! Decision-loop metrics. Every count is kept locally for the end-of-run
//! summary and mirrored to the `metrics` facade for whatever exporter the
//! binary installs.

pub mod metrics;

pub use crate::metrics::{describe_metrics, MetricsCollector, MetricsSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{MetricsCollector, MetricsSnapshot};
}
