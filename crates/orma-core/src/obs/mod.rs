//! Observability: statistics events and sink abstractions.
//!
//! Core logic never touches counters directly. All instrumentation flows
//! through `MetricsEvent` values handed to an injected `MetricsSink`.

pub mod metrics;
pub mod sink;

// re-exports
pub use metrics::{CounterSink, EntityCounters, EventOps, EventReport};
pub use sink::{MetricsEvent, MetricsSink, NoopMetricsSink};
