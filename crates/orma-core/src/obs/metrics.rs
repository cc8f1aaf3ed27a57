use crate::obs::sink::{MetricsEvent, MetricsSink};
use serde::Serialize;
use std::{
    cell::RefCell,
    collections::BTreeMap,
    time::{SystemTime, UNIX_EPOCH},
};

///
/// EventState
/// Ephemeral, in-memory counters and simple timing totals.
///

#[derive(Clone, Debug, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
    pub since_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            entities: BTreeMap::new(),
            since_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventOps {
    // Natural-id lookups
    pub natural_id_queries: u64,
    pub natural_id_query_ms_total: u64,
    pub natural_id_query_ms_max: u64,

    // Initializer selects
    pub entity_fetches: u64,

    // Parameter binding
    pub binding_statements: u64,
    pub binding_slots: u64,
}

///
/// EntityCounters
/// Per-root-entity counters.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EntityCounters {
    pub natural_id_queries: u64,
    pub natural_id_query_ms_total: u64,
    pub natural_id_query_ms_max: u64,
    pub entity_fetches: u64,
}

///
/// EventReport
/// Point-in-time snapshot handed to observability surfaces.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventReport {
    pub counters: Option<EventState>,
    pub entity_counters: Vec<(String, EntityCounters)>,
}

///
/// CounterSink
///
/// Sink that accumulates events into an owned `EventState`.
/// Scoped to one unit of work; not shared across threads.
///

#[derive(Debug, Default)]
pub struct CounterSink {
    state: RefCell<EventState>,
}

impl CounterSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow counters immutably.
    pub fn with_state<R>(&self, f: impl FnOnce(&EventState) -> R) -> R {
        f(&self.state.borrow())
    }

    /// Reset all counters and restart the window.
    pub fn reset(&self) {
        *self.state.borrow_mut() = EventState::default();
    }

    /// Build a report; a window start later than the current window yields
    /// an empty report.
    #[must_use]
    pub fn report(&self, window_start_ms: Option<u64>) -> EventReport {
        let state = self.state.borrow();

        if window_start_ms.is_some_and(|start| start > state.since_ms) {
            return EventReport::default();
        }

        let mut entity_counters: Vec<(String, EntityCounters)> = state
            .entities
            .iter()
            .map(|(name, counters)| (name.clone(), counters.clone()))
            .collect();
        entity_counters.sort_by(|(_, a), (_, b)| b.natural_id_queries.cmp(&a.natural_id_queries));

        EventReport {
            counters: Some(state.clone()),
            entity_counters,
        }
    }
}

impl MetricsSink for CounterSink {
    fn record(&self, event: MetricsEvent) {
        let m = &mut *self.state.borrow_mut();

        match event {
            MetricsEvent::NaturalIdQuery {
                entity_name,
                elapsed_ms,
            } => {
                m.ops.natural_id_queries = m.ops.natural_id_queries.saturating_add(1);
                add_millis(
                    &mut m.ops.natural_id_query_ms_total,
                    &mut m.ops.natural_id_query_ms_max,
                    elapsed_ms,
                );

                let entry = m.entities.entry(entity_name.to_string()).or_default();
                entry.natural_id_queries = entry.natural_id_queries.saturating_add(1);
                add_millis(
                    &mut entry.natural_id_query_ms_total,
                    &mut entry.natural_id_query_ms_max,
                    elapsed_ms,
                );
            }

            MetricsEvent::EntityFetch { entity_name } => {
                m.ops.entity_fetches = m.ops.entity_fetches.saturating_add(1);
                let entry = m.entities.entry(entity_name.to_string()).or_default();
                entry.entity_fetches = entry.entity_fetches.saturating_add(1);
            }

            MetricsEvent::ParameterBinding { slots } => {
                m.ops.binding_statements = m.ops.binding_statements.saturating_add(1);
                m.ops.binding_slots = m.ops.binding_slots.saturating_add(slots);
            }
        }
    }
}

/// Accumulate elapsed milliseconds and track a max.
#[allow(clippy::missing_const_for_fn)]
fn add_millis(total: &mut u64, max: &mut u64, delta_ms: u64) {
    *total = total.saturating_add(delta_ms);
    if delta_ms > *max {
        *max = delta_ms;
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}
