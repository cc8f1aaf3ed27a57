//! Natural-id resolution: business key → identifier, session cache first,
//! datasource second.

mod cache;
mod event;


use crate::{
    db::{datasource::Datasource, session::Session},
    error::InternalError,
    obs::MetricsEvent,
    value::Value,
};
use std::time::Instant;

// re-exports
pub use cache::{NaturalIdResolutions, NaturalIdValues};
pub use event::{NaturalIdEventError, ResolveNaturalIdEvent};

///
/// NaturalIdResolver
///
/// Resolves natural ids against the session cache, falling back to the
/// datasource. A load that finds nothing yields `Ok(None)`; not-found is
/// never an error and is never cached.
///

#[derive(Clone, Copy)]
pub struct NaturalIdResolver<'d> {
    datasource: &'d dyn Datasource,
}

impl<'d> NaturalIdResolver<'d> {
    #[must_use]
    pub const fn new(datasource: &'d dyn Datasource) -> Self {
        Self { datasource }
    }

    pub fn resolve(
        &self,
        event: &ResolveNaturalIdEvent,
        session: &mut Session<'_>,
    ) -> Result<Option<Value>, InternalError> {
        session.ensure_open()?;

        let entity = event.entity();
        tracing::trace!(
            entity = entity.entity_name,
            natural_id = %event.ordered_natural_id_values(),
            "attempting to resolve natural id"
        );

        if let Some(id) = Self::resolve_from_cache(event, session) {
            tracing::trace!(
                entity = entity.entity_name,
                id = ?id,
                "resolved natural id from session cache"
            );
            return Ok(Some(id));
        }

        tracing::trace!(
            entity = entity.entity_name,
            "natural id not resolved from any cache, loading from datasource"
        );

        self.load_from_datasource(event, session)
    }

    fn resolve_from_cache(event: &ResolveNaturalIdEvent, session: &Session<'_>) -> Option<Value> {
        session
            .natural_id_resolutions()
            .find_cached_id_by_natural_id(event.ordered_natural_id_values(), event.entity())
    }

    fn load_from_datasource(
        &self,
        event: &ResolveNaturalIdEvent,
        session: &mut Session<'_>,
    ) -> Result<Option<Value>, InternalError> {
        let entity = event.entity();
        let natural_id = event.ordered_natural_id_values();

        // Timer only runs when someone will read it.
        let started = session.statistics_enabled().then(Instant::now);

        let id = self
            .datasource
            .load_entity_id_by_natural_id(entity, natural_id, event.lock_options(), session)?
            .filter(|id| !id.is_null());

        if let Some(started) = started {
            let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            session.record(MetricsEvent::NaturalIdQuery {
                entity_name: entity.root_entity_name,
                elapsed_ms,
            });
        }

        if let Some(id) = &id {
            session.natural_id_resolutions_mut().cache_resolution_from_load(
                id.clone(),
                natural_id.clone(),
                entity,
            );
        }

        Ok(id)
    }
}
