//! Unit of work: the persistence context of managed instances, the
//! natural-id resolution cache, and the statistics boundary.

use crate::{
    config::EngineConfig,
    db::{datasource::Datasource, fetch::DeferredEntity, natural_id::NaturalIdResolutions},
    error::InternalError,
    model::EntityModel,
    obs::{MetricsEvent, MetricsSink},
    value::{Value, ValueKey},
};
use std::{collections::BTreeMap, fmt};

///
/// EntityHandle
///
/// Stable reference to one instance managed by a session.
/// Two handles are equal exactly when they name the same managed instance.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EntityHandle(usize);

impl EntityHandle {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

///
/// AttributeValue
/// State of one attribute on a managed instance.
///

#[derive(Clone, Debug)]
pub enum AttributeValue {
    Basic(Value),
    /// Resolved to-one; `None` is a null reference.
    ToOne(Option<EntityHandle>),
    /// To-one resolved on first access.
    Deferred(DeferredEntity),
}

///
/// EntityInstance
///

#[derive(Debug)]
pub struct EntityInstance {
    entity: &'static EntityModel,
    id: Value,
    attributes: BTreeMap<&'static str, AttributeValue>,
}

impl EntityInstance {
    #[must_use]
    pub const fn entity(&self) -> &'static EntityModel {
        self.entity
    }

    #[must_use]
    pub const fn id(&self) -> &Value {
        &self.id
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Basic attribute value, if `name` is a populated basic attribute.
    #[must_use]
    pub fn basic(&self, name: &str) -> Option<&Value> {
        match self.attributes.get(name) {
            Some(AttributeValue::Basic(value)) => Some(value),
            _ => None,
        }
    }

    pub fn set_attribute(&mut self, name: &'static str, value: AttributeValue) {
        self.attributes.insert(name, value);
    }
}

///
/// PersistenceContext
///
/// Identity map of managed instances, keyed by root entity name and
/// identifier so one row never materializes twice in a session.
///
/// Handles index an arena; a removed instance leaves an empty slot so other
/// handles stay valid.
///

#[derive(Debug, Default)]
pub struct PersistenceContext {
    instances: Vec<Option<EntityInstance>>,
    by_key: BTreeMap<(&'static str, ValueKey), EntityHandle>,
}

impl PersistenceContext {
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    #[must_use]
    pub fn find(&self, entity: &EntityModel, id: &Value) -> Option<EntityHandle> {
        self.by_key
            .get(&(entity.root_entity_name, ValueKey::new(id.clone())))
            .copied()
    }

    /// Return the managed instance for `(entity, id)`, registering an empty
    /// one when absent. The flag reports whether a new instance was created.
    pub fn get_or_register(
        &mut self,
        entity: &'static EntityModel,
        id: Value,
    ) -> (EntityHandle, bool) {
        if let Some(handle) = self.find(entity, &id) {
            return (handle, false);
        }

        let handle = EntityHandle(self.instances.len());
        self.by_key
            .insert((entity.root_entity_name, ValueKey::new(id.clone())), handle);
        self.instances.push(Some(EntityInstance {
            entity,
            id,
            attributes: BTreeMap::new(),
        }));

        (handle, true)
    }

    /// Stop managing an instance. Its handle no longer resolves.
    pub fn remove(&mut self, handle: EntityHandle) -> Result<EntityInstance, InternalError> {
        let instance = self
            .instances
            .get_mut(handle.0)
            .and_then(Option::take)
            .ok_or_else(|| unknown_handle(handle))?;
        self.by_key.remove(&(
            instance.entity.root_entity_name,
            ValueKey::new(instance.id.clone()),
        ));

        Ok(instance)
    }

    pub fn instance(&self, handle: EntityHandle) -> Result<&EntityInstance, InternalError> {
        self.instances
            .get(handle.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| unknown_handle(handle))
    }

    pub fn instance_mut(
        &mut self,
        handle: EntityHandle,
    ) -> Result<&mut EntityInstance, InternalError> {
        self.instances
            .get_mut(handle.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| unknown_handle(handle))
    }

    /// Find a managed instance of `entity` whose `property` equals `value`.
    ///
    /// `property` may be a basic attribute or an owning to-one, in which
    /// case the referenced instance's key is compared.
    pub fn find_by_unique_key(
        &self,
        entity: &EntityModel,
        property: &str,
        value: &Value,
    ) -> Result<Option<EntityHandle>, InternalError> {
        let wanted = ValueKey::new(value.clone());

        for (index, instance) in self.instances.iter().enumerate() {
            let Some(instance) = instance else {
                continue;
            };
            if instance.entity.root_entity_name != entity.root_entity_name {
                continue;
            }
            let handle = EntityHandle(index);
            if self
                .property_key(handle, property)?
                .is_some_and(|key| ValueKey::new(key) == wanted)
            {
                return Ok(Some(handle));
            }
        }

        Ok(None)
    }

    /// Key value of `property` on a managed instance.
    ///
    /// Returns `None` when the value is not yet known without a load (a
    /// deferred to-one located by unique key).
    pub fn property_key(
        &self,
        handle: EntityHandle,
        property: &str,
    ) -> Result<Option<Value>, InternalError> {
        let instance = self.instance(handle)?;
        if instance.entity.identifier.name == property {
            return Ok(Some(instance.id.clone()));
        }

        match instance.attributes.get(property) {
            Some(AttributeValue::Basic(value)) => Ok(Some(value.clone())),
            Some(AttributeValue::ToOne(None)) => Ok(Some(Value::Null)),
            Some(AttributeValue::ToOne(Some(target))) => {
                match instance
                    .entity
                    .association(property)
                    .and_then(|association| association.referenced_property)
                {
                    Some(referenced) => self.property_key(*target, referenced),
                    None => Ok(Some(self.instance(*target)?.id.clone())),
                }
            }
            Some(AttributeValue::Deferred(deferred)) => Ok(deferred.known_key()),
            None => Ok(None),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
        self.by_key.clear();
    }
}

fn unknown_handle(handle: EntityHandle) -> InternalError {
    InternalError::session_not_found(format!("no managed instance for handle {handle}"))
}

///
/// Session
///
/// One unit of work. Owns its persistence context and natural-id cache;
/// statistics flow to an optional borrowed metrics sink.
///
/// Sessions are single-threaded; concurrent work uses separate sessions.
///

#[derive(Default)]
pub struct Session<'m> {
    context: PersistenceContext,
    natural_ids: NaturalIdResolutions,
    metrics: Option<&'m dyn MetricsSink>,
    statistics: bool,
    closed: bool,
}

impl<'m> Session<'m> {
    /// Open a session with statistics requested; events are produced once a
    /// sink is attached.
    #[must_use]
    pub fn new() -> Self {
        Self {
            statistics: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            statistics: config.statistics,
            ..Self::default()
        }
    }

    /// Attach a metrics sink.
    #[must_use]
    pub fn metrics_sink(mut self, sink: &'m dyn MetricsSink) -> Self {
        self.metrics = Some(sink);
        self
    }

    /// True when statistics are requested and the attached sink accepts them.
    #[must_use]
    pub fn statistics_enabled(&self) -> bool {
        self.statistics && self.metrics.is_some_and(|sink| sink.is_enabled())
    }

    pub(crate) fn record(&self, event: MetricsEvent) {
        if !self.statistics_enabled() {
            return;
        }
        if let Some(sink) = self.metrics {
            sink.record(event);
        }
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        !self.closed
    }

    pub(crate) fn ensure_open(&self) -> Result<(), InternalError> {
        if self.closed {
            return Err(InternalError::session_invariant("session is closed"));
        }

        Ok(())
    }

    /// Close the session, discarding managed instances and cached
    /// natural-id resolutions.
    pub fn close(&mut self) {
        self.context.clear();
        self.natural_ids.clear();
        self.closed = true;
    }

    #[must_use]
    pub const fn persistence_context(&self) -> &PersistenceContext {
        &self.context
    }

    pub const fn persistence_context_mut(&mut self) -> &mut PersistenceContext {
        &mut self.context
    }

    #[must_use]
    pub const fn natural_id_resolutions(&self) -> &NaturalIdResolutions {
        &self.natural_ids
    }

    pub const fn natural_id_resolutions_mut(&mut self) -> &mut NaturalIdResolutions {
        &mut self.natural_ids
    }

    #[must_use]
    pub fn find(&self, entity: &EntityModel, id: &Value) -> Option<EntityHandle> {
        self.context.find(entity, id)
    }

    pub fn instance(&self, handle: EntityHandle) -> Result<&EntityInstance, InternalError> {
        self.context.instance(handle)
    }

    pub fn identifier_of(&self, handle: EntityHandle) -> Result<&Value, InternalError> {
        self.context.instance(handle).map(EntityInstance::id)
    }

    /// Dereference a to-one attribute, resolving a deferred reference on
    /// first access. Later calls return the memoized instance.
    pub fn association(
        &mut self,
        handle: EntityHandle,
        name: &str,
        datasource: &dyn Datasource,
    ) -> Result<Option<EntityHandle>, InternalError> {
        self.ensure_open()?;

        let deferred = match self.context.instance(handle)?.attribute(name) {
            Some(AttributeValue::ToOne(target)) => return Ok(*target),
            Some(AttributeValue::Deferred(deferred)) => deferred.clone(),
            Some(AttributeValue::Basic(_)) | None => {
                let entity = self.context.instance(handle)?.entity;
                return Err(InternalError::session_not_found(format!(
                    "'{}.{name}' is not a populated to-one association",
                    entity.entity_name
                )));
            }
        };

        deferred.get(self, datasource)
    }
}

impl fmt::Debug for Session<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("context", &self.context)
            .field("natural_ids", &self.natural_ids)
            .field("statistics", &self.statistics)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
