use crate::value::Value;
use std::fmt;

///
/// WireType
///
/// Bind-level type descriptor attached to every positional binding.
/// Drivers use it to encode the value, including typed NULLs.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum WireType {
    BigInt,
    Boolean,
    Double,
    Timestamp,
    UnsignedBigInt,
    Ulid,
    Varbinary,
    Varchar,
}

impl WireType {
    /// True when `value` can be encoded under this wire type.
    ///
    /// NULL is encodable under every wire type.
    #[must_use]
    pub const fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (Self::BigInt, Value::Int(_))
                | (Self::Boolean, Value::Bool(_))
                | (Self::Double, Value::Float64(_))
                | (Self::Timestamp, Value::Timestamp(_))
                | (Self::UnsignedBigInt, Value::Uint(_))
                | (Self::Ulid, Value::Ulid(_))
                | (Self::Varbinary, Value::Blob(_))
                | (Self::Varchar, Value::Text(_))
        )
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BigInt => "BIGINT",
            Self::Boolean => "BOOLEAN",
            Self::Double => "DOUBLE",
            Self::Timestamp => "TIMESTAMP",
            Self::UnsignedBigInt => "UNSIGNED BIGINT",
            Self::Ulid => "ULID",
            Self::Varbinary => "VARBINARY",
            Self::Varchar => "VARCHAR",
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
