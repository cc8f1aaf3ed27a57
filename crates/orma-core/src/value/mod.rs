mod compare;
mod tag;


use crate::db::session::EntityHandle;
use derive_more::Deref;
use std::cmp::Ordering;
use ulid::Ulid;

// re-exports
pub use compare::{canonical_cmp, canonical_cmp_list};
pub use tag::ValueTag;

///
/// Value
///
/// Domain-level value as bound to parameters, read from rows, and stored on
/// managed entity instances.
///
/// Null    → SQL NULL.
/// List    → ordered composite (embedded identifier parts, multi-column keys).
/// Entity  → reference to an instance managed by the current session.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    Blob(Vec<u8>),
    Bool(bool),
    Entity(EntityHandle),
    Float64(f64),
    Int(i64),
    List(Vec<Self>),
    #[default]
    Null,
    Text(String),
    /// Milliseconds since the Unix epoch.
    Timestamp(i64),
    Uint(u64),
    Ulid(Ulid),
}

impl Value {
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        tag::canonical_tag(self)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// True when every leaf of this value is null.
    ///
    /// A composite key with all parts null reads as "no reference".
    #[must_use]
    pub fn is_null_or_all_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::List(parts) => parts.iter().all(Self::is_null_or_all_null),
            _ => false,
        }
    }

    #[must_use]
    pub const fn as_entity(&self) -> Option<EntityHandle> {
        match self {
            Self::Entity(handle) => Some(*handle),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Borrow this value as its composite parts.
    ///
    /// Non-list values are their own single part.
    #[must_use]
    pub fn parts(&self) -> &[Self] {
        match self {
            Self::List(parts) => parts.as_slice(),
            other => std::slice::from_ref(other),
        }
    }

    /// Build a value from column parts, collapsing single-column keys.
    #[must_use]
    pub fn from_parts(mut parts: Vec<Self>) -> Self {
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Self::List(parts)
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Ulid> for Value {
    fn from(value: Ulid) -> Self {
        Self::Ulid(value)
    }
}

impl From<EntityHandle> for Value {
    fn from(value: EntityHandle) -> Self {
        Self::Entity(value)
    }
}

impl From<Vec<Self>> for Value {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

///
/// ValueKey
///
/// Value wrapper with canonical total ordering, for use as a map key.
///

#[derive(Clone, Debug, Deref)]
pub struct ValueKey(Value);

impl ValueKey {
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn into_inner(self) -> Value {
        self.0
    }
}

impl From<Value> for ValueKey {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl Eq for ValueKey {}

impl PartialEq for ValueKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for ValueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical_cmp(&self.0, &other.0)
    }
}

impl PartialOrd for ValueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
