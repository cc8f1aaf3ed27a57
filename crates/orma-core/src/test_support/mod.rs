//! Shared fixtures for unit tests: static entity models and in-memory
//! collaborator fakes.

mod datasource;
mod entity;

pub(crate) use datasource::FakeDatasource;
pub(crate) use entity::*;
