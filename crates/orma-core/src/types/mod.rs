//! Value-mapping strategies and the wire types they bind with.
mod mapping;
mod registry;
mod wire;


pub use mapping::ValueMapping;
pub use registry::{StandardTypeRegistry, TypeRegistry, ValueClass};
pub use wire::WireType;
