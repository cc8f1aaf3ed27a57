//! Query parameter pipeline.
//!
//! Logical parameters and their occurrences are recorded during statement
//! analysis. At execution each occurrence receives positional slots, the
//! parameter's type is resolved, and bound values are disassembled into
//! one binding per slot.

mod binding;
mod cross_reference;
mod materialize;
mod parameter;
mod prepare;
mod slots;
mod statement;
mod type_resolution;
mod xref;

#[cfg(test)]
mod tests;

// re-exports
pub use binding::{BindState, QueryParameterBinding, QueryParameterBindings};
pub use cross_reference::{OccurrenceSlots, ParameterCrossReference, build_jdbc_params_xref};
pub use materialize::{BindingValue, JdbcParameterBindings, create_jdbc_parameter_bindings};
pub use parameter::{
    AnticipatedType, OccurrenceId, ParameterName, ParameterOccurrence, ParameterSpec,
    QueryParameter, QueryParameterId,
};
pub use prepare::{PreparedParameters, prepare_parameters};
pub use slots::{JdbcParameterAccess, PositionalSlot, SlotAssignment, allocate_slots};
pub use statement::{
    Statement, StatementKind, verify_is_non_select_statement, verify_is_select_statement,
};
pub use type_resolution::{TypeResolutions, determine_parameter_type};
pub use xref::DomainParameterXref;
