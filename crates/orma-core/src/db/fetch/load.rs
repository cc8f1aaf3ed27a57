use crate::{
    db::{
        datasource::{Datasource, EntityLookup, EntityState},
        fetch::{DeferredEntity, LookupKind},
        session::{AttributeValue, EntityHandle, Session},
    },
    error::InternalError,
    model::EntityModel,
    obs::MetricsEvent,
    value::Value,
};

/// Managed instance matching `lookup`, if the session already has one.
pub(crate) fn find_managed(
    session: &Session<'_>,
    entity: &EntityModel,
    lookup: &EntityLookup,
) -> Result<Option<EntityHandle>, InternalError> {
    match lookup {
        EntityLookup::ById(id) => Ok(session.find(entity, id)),
        EntityLookup::ByUniqueKey { property, value } => session
            .persistence_context()
            .find_by_unique_key(entity, property, value),
    }
}

/// Resolve `lookup` to a managed instance, selecting from the datasource
/// only when the persistence context has no match.
pub(crate) fn load_entity(
    session: &mut Session<'_>,
    datasource: &dyn Datasource,
    entity: &'static EntityModel,
    lookup: &EntityLookup,
) -> Result<Option<EntityHandle>, InternalError> {
    session.ensure_open()?;

    if lookup.key().is_null_or_all_null() {
        return Ok(None);
    }
    if let Some(handle) = find_managed(session, entity, lookup)? {
        return Ok(Some(handle));
    }

    let Some(state) = datasource.select_entity(entity, lookup, session)? else {
        tracing::trace!(entity = entity.entity_name, lookup = %lookup, "no row for entity select");
        return Ok(None);
    };
    session.record(MetricsEvent::EntityFetch {
        entity_name: entity.root_entity_name,
    });
    tracing::trace!(entity = entity.entity_name, lookup = %lookup, "selected entity row");

    register_loaded(session, entity, state).map(Some)
}

/// Register a datasource row as a managed instance. A row whose identifier
/// is already managed yields the existing instance unchanged.
///
/// To-ones are linked to managed targets when present and deferred otherwise.
pub(crate) fn register_loaded(
    session: &mut Session<'_>,
    entity: &'static EntityModel,
    state: EntityState,
) -> Result<EntityHandle, InternalError> {
    let (handle, created) = session
        .persistence_context_mut()
        .get_or_register(entity, state.id.clone());
    if !created {
        return Ok(handle);
    }

    let mut values = Vec::with_capacity(entity.attributes.len() + entity.associations.len());
    for attribute in entity.attributes {
        let value = state
            .attributes
            .get(attribute.name)
            .cloned()
            .unwrap_or(Value::Null);
        values.push((attribute.name, AttributeValue::Basic(value)));
    }

    for association in entity.associations {
        let key = if association.is_inverse() {
            state.id.clone()
        } else {
            state
                .associations
                .get(association.name)
                .cloned()
                .unwrap_or(Value::Null)
        };

        let value = if key.is_null_or_all_null() {
            AttributeValue::ToOne(None)
        } else {
            let lookup = LookupKind::for_association(association).lookup(key.clone());
            match find_managed(session, association.target, &lookup)? {
                Some(target) => AttributeValue::ToOne(Some(target)),
                None => AttributeValue::Deferred(DeferredEntity::for_association(association, key)),
            }
        };
        values.push((association.name, value));
    }

    let instance = session.persistence_context_mut().instance_mut(handle)?;
    for (name, value) in values {
        instance.set_attribute(name, value);
    }

    Ok(handle)
}
