use crate::{
    error::InternalError,
    model::{AssociationModel, EntityModel},
    types::WireType,
    value::Value,
};
use std::fmt;

///
/// ValueMapping
///
/// Strategy that turns one domain value into positional bind values.
///
/// - `Scalar` binds a single column of the given wire type.
/// - `EntityIdentifier` binds the identifier columns of an entity.
/// - `AssociationForeignKey` binds the foreign-key columns of a to-one
///   association: the target identifier, or its referenced unique property.
///

#[derive(Clone, Copy, Debug)]
pub enum ValueMapping {
    Scalar(WireType),
    EntityIdentifier(&'static EntityModel),
    AssociationForeignKey(&'static AssociationModel),
}

impl ValueMapping {
    /// Ordered wire types of every column this mapping spans.
    pub fn jdbc_types(&self) -> Result<Vec<WireType>, InternalError> {
        match self {
            Self::Scalar(wire) => Ok(vec![*wire]),
            Self::EntityIdentifier(entity) => Ok(identifier_wire_types(entity)),
            Self::AssociationForeignKey(association) => foreign_key_wire_types(association),
        }
    }

    /// Number of positional slots one value of this mapping occupies.
    pub fn jdbc_type_count(&self) -> Result<usize, InternalError> {
        match self {
            Self::Scalar(_) => Ok(1),
            Self::EntityIdentifier(entity) => Ok(entity.identifier.column_count()),
            Self::AssociationForeignKey(_) => self.jdbc_types().map(|types| types.len()),
        }
    }

    /// Split an already-unwrapped domain value into its column values, in
    /// mapping-defined order.
    ///
    /// The caller verifies the produced count against the slots it owns; a
    /// composite value whose arity disagrees with the mapping is passed
    /// through as-is so the mismatch surfaces there.
    #[must_use]
    pub fn disassemble(&self, value: &Value) -> Vec<Value> {
        match self {
            Self::Scalar(_) => vec![value.clone()],
            Self::EntityIdentifier(_) | Self::AssociationForeignKey(_) => {
                if value.is_null() {
                    // A null key binds as null in every key column.
                    let count = self.jdbc_type_count().unwrap_or(1);
                    vec![Value::Null; count]
                } else {
                    value.parts().to_vec()
                }
            }
        }
    }
}

impl PartialEq for ValueMapping {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::EntityIdentifier(a), Self::EntityIdentifier(b)) => a.is_same(b),
            (Self::AssociationForeignKey(a), Self::AssociationForeignKey(b)) => {
                std::ptr::eq(*a, *b)
            }
            _ => false,
        }
    }
}

impl fmt::Display for ValueMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(wire) => write!(f, "scalar({wire})"),
            Self::EntityIdentifier(entity) => {
                write!(f, "identifier({}.{})", entity.entity_name, entity.identifier.name)
            }
            Self::AssociationForeignKey(association) => write!(
                f,
                "foreign_key({} -> {})",
                association.name, association.target.entity_name
            ),
        }
    }
}

fn identifier_wire_types(entity: &EntityModel) -> Vec<WireType> {
    entity
        .identifier
        .columns
        .iter()
        .map(|column| column.wire)
        .collect()
}

fn foreign_key_wire_types(association: &AssociationModel) -> Result<Vec<WireType>, InternalError> {
    let target = association.target;

    match association.referenced_property {
        None => Ok(identifier_wire_types(target)),
        Some(property) => target
            .attribute(property)
            .map(|attr| vec![attr.wire])
            .ok_or_else(|| {
                InternalError::model_not_found(format!(
                    "association '{}' references unknown property '{}.{}'",
                    association.name, target.entity_name, property
                ))
            }),
    }
}
