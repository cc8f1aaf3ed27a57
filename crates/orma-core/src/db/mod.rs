//! Unit-of-work runtime: the session, its collaborators, and the three
//! subsystems that run inside it.
//!
//! - `natural_id` resolves business keys to identifiers through the session cache.
//! - `query` turns logical query parameters into positional bindings.
//! - `fetch` materializes entity graphs from rows, breaking association cycles.

pub mod datasource;
pub mod fetch;
pub mod natural_id;
pub mod query;
pub mod session;

// re-exports
pub use datasource::{Datasource, EntityLookup, EntityState, LockMode, LockOptions};
pub use session::{AttributeValue, EntityHandle, EntityInstance, PersistenceContext, Session};
