use crate::model::{
    association::AssociationModel,
    attribute::{AttributeModel, IdentifierModel},
};

///
/// EntityModel
/// Runtime mapping model for one entity.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Stable entity name used in paths, cache keys, and diagnostics.
    pub entity_name: &'static str,
    /// Root of the entity's hierarchy; statistics and caches are keyed by it.
    pub root_entity_name: &'static str,
    pub identifier: IdentifierModel,
    /// Basic attributes in declaration order.
    pub attributes: &'static [AttributeModel],
    /// To-one associations in declaration order.
    pub associations: &'static [AssociationModel],
    /// Natural-id attribute names in declared order (empty when none).
    pub natural_id: &'static [&'static str],
}

impl EntityModel {
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&'static AttributeModel> {
        self.attributes.iter().find(|attr| attr.name == name)
    }

    #[must_use]
    pub fn association(&self, name: &str) -> Option<&'static AssociationModel> {
        self.associations.iter().find(|assoc| assoc.name == name)
    }

    #[must_use]
    pub const fn has_natural_id(&self) -> bool {
        !self.natural_id.is_empty()
    }

    /// Identity comparison; two models are the same entity only if they are
    /// the same static declaration.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}
