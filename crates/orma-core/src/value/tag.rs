use crate::value::Value;

///
/// ValueTag
///
/// Stable canonical value-variant tag used by ordering and diagnostics.
///
/// IMPORTANT:
/// Tag values define cross-variant ordering of cache keys and must remain
/// fixed once natural-id resolutions are keyed by them.
///
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueTag {
    Blob = 1,
    Bool = 2,
    Entity = 3,
    Float64 = 4,
    Int = 5,
    List = 6,
    Null = 7,
    Text = 8,
    Timestamp = 9,
    Uint = 10,
    Ulid = 11,
}

impl ValueTag {
    /// Stable byte tag for this variant.
    #[must_use]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Stable human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blob => "Blob",
            Self::Bool => "Bool",
            Self::Entity => "Entity",
            Self::Float64 => "Float64",
            Self::Int => "Int",
            Self::List => "List",
            Self::Null => "Null",
            Self::Text => "Text",
            Self::Timestamp => "Timestamp",
            Self::Uint => "Uint",
            Self::Ulid => "Ulid",
        }
    }
}

#[must_use]
pub(crate) const fn canonical_tag(value: &Value) -> ValueTag {
    match value {
        Value::Blob(_) => ValueTag::Blob,
        Value::Bool(_) => ValueTag::Bool,
        Value::Entity(_) => ValueTag::Entity,
        Value::Float64(_) => ValueTag::Float64,
        Value::Int(_) => ValueTag::Int,
        Value::List(_) => ValueTag::List,
        Value::Null => ValueTag::Null,
        Value::Text(_) => ValueTag::Text,
        Value::Timestamp(_) => ValueTag::Timestamp,
        Value::Uint(_) => ValueTag::Uint,
        Value::Ulid(_) => ValueTag::Ulid,
    }
}
