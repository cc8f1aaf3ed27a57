use crate::model::entity::EntityModel;
use serde::Deserialize;
use std::fmt;

///
/// FetchTiming
///
/// When a to-one association is resolved relative to its owner's row.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FetchTiming {
    #[default]
    Immediate,
    Delayed,
}

impl fmt::Display for FetchTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Immediate => "immediate",
            Self::Delayed => "delayed",
        };
        write!(f, "{label}")
    }
}

///
/// AssociationModel
///
/// To-one association from an owning entity to a target entity.
///
/// Owning side: `fk_columns` hold the key in the owner's row. The key is the
/// target's identifier, or `referenced_property` when the association joins
/// on a unique non-key attribute.
///
/// Inverse side: `mapped_by` names the owning association on the target and
/// `fk_columns` is empty; the owner's own identifier is the lookup key.
///

#[derive(Debug)]
pub struct AssociationModel {
    pub name: &'static str,
    pub target: &'static EntityModel,
    pub fk_columns: &'static [&'static str],
    pub referenced_property: Option<&'static str>,
    pub mapped_by: Option<&'static str>,
    pub timing: FetchTiming,
}

impl AssociationModel {
    #[must_use]
    pub const fn is_inverse(&self) -> bool {
        self.mapped_by.is_some()
    }

    /// True when the target is located by a unique property rather than its id.
    #[must_use]
    pub const fn selects_by_unique_key(&self) -> bool {
        self.referenced_property.is_some() || self.mapped_by.is_some()
    }
}
