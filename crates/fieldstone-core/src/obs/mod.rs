//! Observability: per-operation counters behind a sink boundary.
//!
//! Engine logic never touches counter state directly. All
//! instrumentation flows through [`MetricsEvent`] and the sink; this
//! module is the only bridge between operations and counter state.

pub(crate) mod sink;

pub use sink::{EventReport, MetricsEvent, MetricsSink, OpKind, metrics_report, metrics_reset};
pub(crate) use sink::track;
