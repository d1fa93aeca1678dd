//! Observability: metrics events and sink abstractions.
//!
//! Index logic never keeps counters itself. Every instrumentation point
//! emits a `MetricsEvent` into the sink the caller handed to `Collections`.

mod sink;

// re-exports
pub use sink::{CountingMetrics, MetricsEvent, MetricsSink, MetricsSnapshot, NoopMetrics};
