use crate::{
    db::{natural_id::NaturalIdValues, session::Session},
    error::InternalError,
    model::EntityModel,
    value::Value,
};
use std::{collections::BTreeMap, fmt};

///
/// LockMode
/// Opaque lock request forwarded to the datasource.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LockMode {
    #[default]
    None,
    Read,
    Optimistic,
    PessimisticRead,
    PessimisticWrite,
}

///
/// LockOptions
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LockOptions {
    pub mode: LockMode,
    pub timeout_ms: Option<u64>,
}

impl LockOptions {
    #[must_use]
    pub const fn new(mode: LockMode) -> Self {
        Self {
            mode,
            timeout_ms: None,
        }
    }

    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }
}

///
/// EntityLookup
///
/// How a select locates one entity row: by identifier, or by a unique
/// property (a referenced non-key property, or the owning side of an
/// inverse association).
///

#[derive(Clone, Debug, PartialEq)]
pub enum EntityLookup {
    ById(Value),
    ByUniqueKey {
        property: &'static str,
        value: Value,
    },
}

impl EntityLookup {
    #[must_use]
    pub const fn key(&self) -> &Value {
        match self {
            Self::ById(value) | Self::ByUniqueKey { value, .. } => value,
        }
    }
}

impl fmt::Display for EntityLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ById(value) => write!(f, "id={value:?}"),
            Self::ByUniqueKey { property, value } => write!(f, "{property}={value:?}"),
        }
    }
}

///
/// EntityState
///
/// One hydrated entity row as returned by the datasource.
/// `associations` carries each owning to-one's key value (absent = NULL).
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityState {
    pub id: Value,
    pub attributes: BTreeMap<&'static str, Value>,
    pub associations: BTreeMap<&'static str, Value>,
}

impl EntityState {
    #[must_use]
    pub fn new(id: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.attributes.insert(name, value.into());
        self
    }

    #[must_use]
    pub fn with_association(mut self, name: &'static str, key: impl Into<Value>) -> Self {
        self.associations.insert(name, key.into());
        self
    }
}

///
/// Datasource
///
/// Synchronous datasource-access collaborator.
///
/// Errors returned here propagate to callers unmodified; the core adds no
/// retries, timeouts, or suppression.
///

pub trait Datasource {
    /// Load the identifier of the entity whose natural id equals `natural_id`.
    /// `Ok(None)` means no row matched.
    fn load_entity_id_by_natural_id(
        &self,
        entity: &'static EntityModel,
        natural_id: &NaturalIdValues,
        lock: &LockOptions,
        session: &Session<'_>,
    ) -> Result<Option<Value>, InternalError>;

    /// Select one entity row for an initializer.
    fn select_entity(
        &self,
        entity: &'static EntityModel,
        lookup: &EntityLookup,
        session: &Session<'_>,
    ) -> Result<Option<EntityState>, InternalError>;
}
