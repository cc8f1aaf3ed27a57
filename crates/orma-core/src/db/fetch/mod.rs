//! Fetch graphs and their row-time materialization.
//!
//! `FetchGraphBuilder` turns a root entity into a tree of fetches, marking
//! associations that lead back to an entity already on the path as circular.
//! `RowProcessingState` creates one initializer per navigable path and reads
//! rows into managed instances, so a cycle never materializes the same row
//! twice and never recurses without bound.

mod deferred;
mod graph;
mod initializer;
mod load;
mod path;
mod row;


// re-exports
pub use crate::model::FetchTiming;
pub use deferred::{Deferred, DeferredEntity};
pub use graph::{
    BasicFetch, CircularFetch, EntityFetch, EntityResult, Fetch, FetchGraphBuilder, KeySource,
    LookupKind, SelectFetch,
};
pub use initializer::{
    Assembler, BiDirectionalFetchAssembler, Initializer, InitializerId, InitializerKind,
    InitializerState, Resolution, RowProcessingState,
};
pub use path::NavigablePath;
pub use row::Row;
