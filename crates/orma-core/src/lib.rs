//! Core runtime for Orma: the mapping model, parameter binding, natural-id
//! resolution, and fetch-graph materialization used by the session layer.
#![warn(unreachable_pub)]

pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Maximum number of columns a single identifier or foreign key may span.
/// Domain validation rejects identifiers wider than this.
pub const MAX_KEY_COLUMNS: usize = 8;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, collaborators, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{
            fetch::{FetchTiming, NavigablePath},
            session::{EntityHandle, Session},
        },
        model::{AssociationModel, AttributeModel, EntityModel, IdentifierModel},
        types::{ValueClass, ValueMapping, WireType},
        value::Value,
    };
}
