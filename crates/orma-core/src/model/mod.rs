//! Runtime mapping model.
//!
//! Types in `model` are the *runtime representations* of mapped entities,
//! their identifiers, attributes, and to-one associations. They are declared
//! once (usually as statics) and consulted by parameter binding, natural-id
//! resolution, and fetch-graph construction.
//!
//! In general:
//! - Mapping metadata defines *what exists*
//! - `db` defines *what runs*
mod association;
mod attribute;
mod domain;
mod entity;

#[cfg(test)]
mod tests;

pub use association::{AssociationModel, FetchTiming};
pub use attribute::{AttributeModel, ColumnModel, IdentifierModel};
pub use domain::DomainModel;
pub use entity::EntityModel;
