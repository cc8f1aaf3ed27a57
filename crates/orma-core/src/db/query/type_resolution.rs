use crate::{
    db::query::{
        binding::{QueryParameterBinding, QueryParameterBindings},
        parameter::{QueryParameter, QueryParameterId},
        xref::DomainParameterXref,
    },
    error::InternalError,
    types::{TypeRegistry, ValueMapping},
};
use std::collections::BTreeMap;

/// Choose the value mapping used to bind a parameter.
///
/// First match wins: the binding's explicit bind type, the parameter's
/// declared type, then the registry's standard scalar for the parameter's
/// value class. `None` is not an error here; it only fails when a non-null
/// value actually needs converting.
#[must_use]
pub fn determine_parameter_type(
    binding: &QueryParameterBinding,
    parameter: &QueryParameter,
    registry: &dyn TypeRegistry,
) -> Option<ValueMapping> {
    binding
        .bind_type()
        .or(parameter.declared_type)
        .or_else(|| {
            parameter
                .value_class
                .and_then(|class| registry.standard_scalar_type_for(class))
        })
}

///
/// TypeResolutions
/// Resolved mapping per parameter of one statement.
///

#[derive(Clone, Debug, Default)]
pub struct TypeResolutions {
    by_parameter: BTreeMap<QueryParameterId, ValueMapping>,
}

impl TypeResolutions {
    pub fn resolve(
        xref: &DomainParameterXref,
        bindings: &QueryParameterBindings,
        registry: &dyn TypeRegistry,
    ) -> Result<Self, InternalError> {
        let mut by_parameter = BTreeMap::new();
        for parameter in xref.parameters() {
            let binding = bindings.binding(parameter.id)?;
            if let Some(mapping) = determine_parameter_type(binding, parameter, registry) {
                by_parameter.insert(parameter.id, mapping);
            }
        }

        Ok(Self { by_parameter })
    }

    #[must_use]
    pub fn get(&self, parameter: QueryParameterId) -> Option<ValueMapping> {
        self.by_parameter.get(&parameter).copied()
    }
}
