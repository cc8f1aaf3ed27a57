use crate::{
    db::{
        query::{
            binding::QueryParameterBindings,
            cross_reference::{ParameterCrossReference, build_jdbc_params_xref},
            materialize::{JdbcParameterBindings, create_jdbc_parameter_bindings},
            slots::{SlotAssignment, allocate_slots},
            statement::Statement,
            type_resolution::TypeResolutions,
        },
        session::Session,
    },
    error::InternalError,
    model::DomainModel,
    types::TypeRegistry,
};

///
/// PreparedParameters
/// Everything the execution layer needs to bind one statement.
///

#[derive(Clone, Debug)]
pub struct PreparedParameters {
    pub slots: SlotAssignment,
    pub cross_reference: ParameterCrossReference,
    pub bindings: JdbcParameterBindings,
}

/// Run the whole binding pipeline for one execution of `statement`:
/// expand multi-valued parameters, resolve types, allocate slots, build the
/// cross reference, and materialize positional bindings.
pub fn prepare_parameters(
    statement: &mut Statement,
    bindings: &QueryParameterBindings,
    registry: &dyn TypeRegistry,
    domain_model: &DomainModel,
    session: &Session<'_>,
) -> Result<PreparedParameters, InternalError> {
    session.ensure_open()?;

    let xref = statement.parameters_mut();
    xref.expand_for_bindings(bindings)?;

    let xref = statement.parameters();
    let types = TypeResolutions::resolve(xref, bindings, registry)?;
    let slots = allocate_slots(xref, bindings, domain_model, Some(&types))?;
    let cross_reference = build_jdbc_params_xref(Some(xref), &slots);
    let bindings = create_jdbc_parameter_bindings(
        bindings,
        xref,
        &cross_reference,
        &types,
        domain_model,
        session,
    )?;

    tracing::debug!(
        kind = %statement.kind(),
        root = statement.root_entity(),
        slots = slots.slot_count(),
        "prepared statement parameters"
    );

    Ok(PreparedParameters {
        slots,
        cross_reference,
        bindings,
    })
}
