mod materialize;

use super::*;
use crate::{
    db::session::Session,
    error::InternalError,
    test_support::domain_model,
    types::StandardTypeRegistry,
};

/// Register a parameter with one occurrence per anticipated type.
fn parameter_with_occurrences(
    statement: &mut Statement,
    spec: ParameterSpec,
    anticipated: &[Option<AnticipatedType>],
) -> QueryParameterId {
    let xref = statement.parameters_mut();
    let id = xref.register_parameter(spec).expect("parameter registers");
    for anticipated in anticipated {
        xref.register_occurrence(id, *anticipated)
            .expect("occurrence registers");
    }

    id
}

fn prepare(
    statement: &mut Statement,
    bindings: &QueryParameterBindings,
    session: &Session<'_>,
) -> Result<PreparedParameters, InternalError> {
    prepare_parameters(
        statement,
        bindings,
        &StandardTypeRegistry,
        &domain_model(),
        session,
    )
}

fn positional(prepared: &PreparedParameters) -> Vec<BindingValue> {
    prepared
        .bindings
        .to_positional()
        .expect("contiguous bindings")
        .into_iter()
        .cloned()
        .collect()
}
