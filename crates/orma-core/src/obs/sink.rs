//! Metrics sink boundary.
//!
//! Call sites that need a timer must check `is_enabled()` first so disabled
//! statistics cost nothing beyond the flag read.

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    /// A natural-id lookup reached the datasource.
    NaturalIdQuery {
        entity_name: &'static str,
        elapsed_ms: u64,
    },
    /// A select initializer loaded an entity from the datasource.
    EntityFetch { entity_name: &'static str },
    /// The binding materializer produced positional bindings for a statement.
    ParameterBinding { slots: u64 },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    /// Whether events should be produced at all.
    fn is_enabled(&self) -> bool {
        true
    }

    fn record(&self, event: MetricsEvent);
}

///
/// NoopMetricsSink
/// Disabled sink; call sites skip timing entirely.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopMetricsSink;

impl MetricsSink for NoopMetricsSink {
    fn is_enabled(&self) -> bool {
        false
    }

    fn record(&self, _: MetricsEvent) {}
}
