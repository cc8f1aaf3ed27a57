use crate::{
    MAX_KEY_COLUMNS,
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::EntityModel,
    types::ValueMapping,
};
use std::collections::BTreeMap;

///
/// DomainModel
///
/// Validated registry of every mapped entity, keyed by entity name.
/// Answers the structural questions statement analysis asks about paths.
///

#[derive(Debug, Default)]
pub struct DomainModel {
    entities: BTreeMap<&'static str, &'static EntityModel>,
}

impl DomainModel {
    /// Register and validate a set of entity models.
    pub fn new(entities: &[&'static EntityModel]) -> Result<Self, InternalError> {
        let mut registry = BTreeMap::new();

        for entity in entities {
            if registry.insert(entity.entity_name, *entity).is_some() {
                return Err(model_invalid(format!(
                    "entity '{}' registered twice",
                    entity.entity_name
                )));
            }
        }

        let model = Self { entities: registry };
        for entity in model.entities.values() {
            model.validate_entity(entity)?;
        }

        Ok(model)
    }

    pub fn entity(&self, name: &str) -> Result<&'static EntityModel, InternalError> {
        self.find_entity(name)
            .ok_or_else(|| InternalError::model_not_found(format!("unknown entity '{name}'")))
    }

    #[must_use]
    pub fn find_entity(&self, name: &str) -> Option<&'static EntityModel> {
        self.entities.get(name).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Resolve the value mapping of `entity.attribute`.
    ///
    /// The identifier resolves to an entity-identifier mapping, a to-one
    /// association to its foreign key, and a basic attribute to its scalar.
    pub fn resolve_attribute_mapping(
        &self,
        entity: &str,
        attribute: &str,
    ) -> Result<ValueMapping, InternalError> {
        let model = self.entity(entity)?;

        if model.identifier.name == attribute {
            return Ok(ValueMapping::EntityIdentifier(model));
        }
        if let Some(association) = model.association(attribute) {
            return Ok(ValueMapping::AssociationForeignKey(association));
        }
        if let Some(attr) = model.attribute(attribute) {
            return Ok(ValueMapping::Scalar(attr.wire));
        }

        Err(InternalError::model_not_found(format!(
            "unknown attribute '{entity}.{attribute}'"
        )))
    }

    // Structural checks that every consumer would otherwise repeat.
    fn validate_entity(&self, entity: &EntityModel) -> Result<(), InternalError> {
        let name = entity.entity_name;
        let id_columns = entity.identifier.column_count();

        if id_columns == 0 || id_columns > MAX_KEY_COLUMNS {
            return Err(model_invalid(format!(
                "entity '{name}' identifier spans {id_columns} columns (max {MAX_KEY_COLUMNS})"
            )));
        }

        for attribute in entity.natural_id {
            if entity.attribute(attribute).is_none() && entity.association(attribute).is_none() {
                return Err(model_invalid(format!(
                    "entity '{name}' natural id names unknown attribute '{attribute}'"
                )));
            }
        }

        for association in entity.associations {
            let target = association.target;
            if self.find_entity(target.entity_name).is_none() {
                return Err(model_invalid(format!(
                    "association '{name}.{}' targets unregistered entity '{}'",
                    association.name, target.entity_name
                )));
            }

            if let Some(mapped_by) = association.mapped_by {
                let owning = target.association(mapped_by).ok_or_else(|| {
                    model_invalid(format!(
                        "association '{name}.{}' is mapped by unknown '{}.{mapped_by}'",
                        association.name, target.entity_name
                    ))
                })?;
                if owning.is_inverse() || !owning.target.is_same(entity) {
                    return Err(model_invalid(format!(
                        "association '{name}.{}' is mapped by non-owning '{}.{mapped_by}'",
                        association.name, target.entity_name
                    )));
                }
                continue;
            }

            let key_columns =
                ValueMapping::AssociationForeignKey(association).jdbc_type_count()?;
            if association.fk_columns.len() != key_columns {
                return Err(model_invalid(format!(
                    "association '{name}.{}' has {} foreign-key columns, key spans {key_columns}",
                    association.name,
                    association.fk_columns.len()
                )));
            }

            if let Some(property) = association.referenced_property
                && target.attribute(property).is_some_and(|attr| !attr.unique)
            {
                return Err(model_invalid(format!(
                    "association '{name}.{}' references non-unique property '{}.{property}'",
                    association.name, target.entity_name
                )));
            }
        }

        Ok(())
    }
}

fn model_invalid(message: String) -> InternalError {
    InternalError::new(ErrorClass::Unsupported, ErrorOrigin::Model, message)
}
