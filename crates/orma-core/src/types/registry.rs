use crate::{
    types::{ValueMapping, WireType},
    value::Value,
};
use std::fmt;

///
/// ValueClass
///
/// Declared value class of a logical parameter, used as the last step of
/// type resolution when neither the binding nor the parameter carries a type.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueClass {
    Blob,
    Bool,
    Float64,
    Int,
    Text,
    Timestamp,
    Uint,
    Ulid,
    /// Instances of the named entity; not a standard scalar.
    Entity(&'static str),
}

impl ValueClass {
    /// Infer the class of a concrete value.
    ///
    /// Returns `None` for NULL and composite values, which carry no class.
    #[must_use]
    pub const fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Blob(_) => Some(Self::Blob),
            Value::Bool(_) => Some(Self::Bool),
            Value::Float64(_) => Some(Self::Float64),
            Value::Int(_) => Some(Self::Int),
            Value::Text(_) => Some(Self::Text),
            Value::Timestamp(_) => Some(Self::Timestamp),
            Value::Uint(_) => Some(Self::Uint),
            Value::Ulid(_) => Some(Self::Ulid),
            Value::Entity(_) | Value::List(_) | Value::Null => None,
        }
    }
}

impl fmt::Display for ValueClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob => f.write_str("Blob"),
            Self::Bool => f.write_str("Bool"),
            Self::Float64 => f.write_str("Float64"),
            Self::Int => f.write_str("Int"),
            Self::Text => f.write_str("Text"),
            Self::Timestamp => f.write_str("Timestamp"),
            Self::Uint => f.write_str("Uint"),
            Self::Ulid => f.write_str("Ulid"),
            Self::Entity(name) => write!(f, "Entity({name})"),
        }
    }
}

///
/// TypeRegistry
///
/// Injected lookup from value classes to standard scalar mappings.
///

pub trait TypeRegistry {
    fn standard_scalar_type_for(&self, class: ValueClass) -> Option<ValueMapping>;
}

///
/// StandardTypeRegistry
/// Built-in scalar registrations; entity classes have no standard mapping.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct StandardTypeRegistry;

impl TypeRegistry for StandardTypeRegistry {
    fn standard_scalar_type_for(&self, class: ValueClass) -> Option<ValueMapping> {
        let wire = match class {
            ValueClass::Blob => WireType::Varbinary,
            ValueClass::Bool => WireType::Boolean,
            ValueClass::Float64 => WireType::Double,
            ValueClass::Int => WireType::BigInt,
            ValueClass::Text => WireType::Varchar,
            ValueClass::Timestamp => WireType::Timestamp,
            ValueClass::Uint => WireType::UnsignedBigInt,
            ValueClass::Ulid => WireType::Ulid,
            ValueClass::Entity(_) => return None,
        };

        Some(ValueMapping::Scalar(wire))
    }
}
