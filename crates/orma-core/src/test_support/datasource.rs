use crate::{
    db::{
        datasource::{Datasource, EntityLookup, EntityState, LockOptions},
        natural_id::NaturalIdValues,
        session::Session,
    },
    error::InternalError,
    model::EntityModel,
    value::{Value, ValueKey},
};
use std::{cell::Cell, collections::BTreeMap};

///
/// FakeDatasource
/// In-memory datasource that counts every call it serves.
///

#[derive(Debug, Default)]
pub(crate) struct FakeDatasource {
    natural_ids: BTreeMap<(&'static str, NaturalIdValues), Value>,
    rows: Vec<(&'static str, EntityState)>,
    failure: Option<String>,
    natural_id_loads: Cell<usize>,
    selects: Cell<usize>,
    last_lock: Cell<Option<LockOptions>>,
}

impl FakeDatasource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_natural_id(
        mut self,
        entity: &'static EntityModel,
        values: Vec<Value>,
        id: impl Into<Value>,
    ) -> Self {
        self.natural_ids.insert(
            (entity.root_entity_name, NaturalIdValues::new(values)),
            id.into(),
        );
        self
    }

    pub(crate) fn with_row(mut self, entity: &'static EntityModel, state: EntityState) -> Self {
        self.rows.push((entity.root_entity_name, state));
        self
    }

    pub(crate) fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub(crate) fn natural_id_loads(&self) -> usize {
        self.natural_id_loads.get()
    }

    pub(crate) fn selects(&self) -> usize {
        self.selects.get()
    }

    pub(crate) fn last_lock(&self) -> Option<LockOptions> {
        self.last_lock.get()
    }

    fn check_failure(&self) -> Result<(), InternalError> {
        match &self.failure {
            Some(message) => Err(InternalError::datasource(message.clone())),
            None => Ok(()),
        }
    }

    fn matches(state: &EntityState, lookup: &EntityLookup) -> bool {
        match lookup {
            EntityLookup::ById(id) => ValueKey::new(state.id.clone()) == ValueKey::new(id.clone()),
            EntityLookup::ByUniqueKey { property, value } => state
                .attributes
                .get(property)
                .or_else(|| state.associations.get(property))
                .is_some_and(|found| {
                    ValueKey::new(found.clone()) == ValueKey::new(value.clone())
                }),
        }
    }
}

impl Datasource for FakeDatasource {
    fn load_entity_id_by_natural_id(
        &self,
        entity: &'static EntityModel,
        natural_id: &NaturalIdValues,
        lock: &LockOptions,
        _session: &Session<'_>,
    ) -> Result<Option<Value>, InternalError> {
        self.natural_id_loads.set(self.natural_id_loads.get() + 1);
        self.last_lock.set(Some(*lock));
        self.check_failure()?;

        Ok(self
            .natural_ids
            .get(&(entity.root_entity_name, natural_id.clone()))
            .cloned())
    }

    fn select_entity(
        &self,
        entity: &'static EntityModel,
        lookup: &EntityLookup,
        _session: &Session<'_>,
    ) -> Result<Option<EntityState>, InternalError> {
        self.selects.set(self.selects.get() + 1);
        self.check_failure()?;

        Ok(self
            .rows
            .iter()
            .find(|(root, state)| *root == entity.root_entity_name && Self::matches(state, lookup))
            .map(|(_, state)| state.clone()))
    }
}
