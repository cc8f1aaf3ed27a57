use crate::{
    db::{
        datasource::{LockMode, LockOptions},
        natural_id::NaturalIdValues,
    },
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::EntityModel,
    value::Value,
};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// NaturalIdEventError
///

#[derive(Debug, ThisError)]
pub enum NaturalIdEventError {
    #[error("entity '{entity}' does not define a natural id")]
    NoNaturalId { entity: &'static str },

    #[error("natural id of '{entity}' is missing a value for '{attribute}'")]
    MissingAttribute {
        entity: &'static str,
        attribute: &'static str,
    },

    #[error("'{attribute}' is not a natural id attribute of '{entity}'")]
    UnknownAttribute {
        entity: &'static str,
        attribute: String,
    },

    #[error("natural id of '{entity}' spans {expected} attributes, got {found} values")]
    Arity {
        entity: &'static str,
        expected: usize,
        found: usize,
    },
}

impl From<NaturalIdEventError> for InternalError {
    fn from(err: NaturalIdEventError) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::NaturalId, err.to_string())
    }
}

///
/// ResolveNaturalIdEvent
///
/// Request to resolve one natural-id value set to an identifier.
/// Values are held in the entity's declared natural-id order.
///

#[derive(Clone, Debug)]
pub struct ResolveNaturalIdEvent {
    entity: &'static EntityModel,
    natural_id: NaturalIdValues,
    lock: LockOptions,
}

impl ResolveNaturalIdEvent {
    /// Build an event from attribute-keyed values.
    ///
    /// Every natural-id attribute must be supplied and nothing else.
    pub fn new<'a>(
        entity: &'static EntityModel,
        values: impl IntoIterator<Item = (&'a str, Value)>,
    ) -> Result<Self, NaturalIdEventError> {
        if !entity.has_natural_id() {
            return Err(NaturalIdEventError::NoNaturalId {
                entity: entity.entity_name,
            });
        }

        let mut supplied: BTreeMap<&str, Value> = values.into_iter().collect();
        let mut ordered = Vec::with_capacity(entity.natural_id.len());
        for attribute in entity.natural_id {
            let value =
                supplied
                    .remove(attribute)
                    .ok_or(NaturalIdEventError::MissingAttribute {
                        entity: entity.entity_name,
                        attribute: *attribute,
                    })?;
            ordered.push(value);
        }

        if let Some(extra) = supplied.into_keys().next() {
            return Err(NaturalIdEventError::UnknownAttribute {
                entity: entity.entity_name,
                attribute: extra.to_string(),
            });
        }

        Ok(Self::from_parts(entity, NaturalIdValues::new(ordered)))
    }

    /// Build an event from values already in declared order.
    pub fn from_ordered(
        entity: &'static EntityModel,
        values: Vec<Value>,
    ) -> Result<Self, NaturalIdEventError> {
        if !entity.has_natural_id() {
            return Err(NaturalIdEventError::NoNaturalId {
                entity: entity.entity_name,
            });
        }
        if values.len() != entity.natural_id.len() {
            return Err(NaturalIdEventError::Arity {
                entity: entity.entity_name,
                expected: entity.natural_id.len(),
                found: values.len(),
            });
        }

        Ok(Self::from_parts(entity, NaturalIdValues::new(values)))
    }

    /// Event for an entity whose natural id is a single attribute.
    pub fn simple(
        entity: &'static EntityModel,
        value: impl Into<Value>,
    ) -> Result<Self, NaturalIdEventError> {
        Self::from_ordered(entity, vec![value.into()])
    }

    const fn from_parts(entity: &'static EntityModel, natural_id: NaturalIdValues) -> Self {
        Self {
            entity,
            natural_id,
            lock: LockOptions::new(LockMode::None),
        }
    }

    #[must_use]
    pub const fn with_lock_options(mut self, lock: LockOptions) -> Self {
        self.lock = lock;
        self
    }

    #[must_use]
    pub const fn entity(&self) -> &'static EntityModel {
        self.entity
    }

    #[must_use]
    pub const fn ordered_natural_id_values(&self) -> &NaturalIdValues {
        &self.natural_id
    }

    /// Value supplied for one natural-id attribute.
    #[must_use]
    pub fn natural_id_value(&self, attribute: &str) -> Option<&Value> {
        self.entity
            .natural_id
            .iter()
            .position(|name| *name == attribute)
            .and_then(|index| self.natural_id.get(index))
    }

    #[must_use]
    pub const fn lock_options(&self) -> &LockOptions {
        &self.lock
    }
}
