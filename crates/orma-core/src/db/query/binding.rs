use crate::{
    db::query::{
        parameter::{ParameterName, QueryParameterId},
        xref::DomainParameterXref,
    },
    error::InternalError,
    types::ValueMapping,
    value::Value,
};
use std::collections::BTreeMap;

///
/// BindState
///

#[derive(Clone, Debug, Default, PartialEq)]
pub enum BindState {
    #[default]
    Unbound,
    Single(Value),
    Multi(Vec<Value>),
}

///
/// QueryParameterBinding
///
/// What the caller bound to one logical parameter: the value(s), an
/// explicit bind type, and an optional type hint used when no type resolves.
///

#[derive(Clone, Debug, Default)]
pub struct QueryParameterBinding {
    state: BindState,
    bind_type: Option<ValueMapping>,
    type_hint: Option<ValueMapping>,
}

impl QueryParameterBinding {
    #[must_use]
    pub const fn state(&self) -> &BindState {
        &self.state
    }

    #[must_use]
    pub const fn is_bound(&self) -> bool {
        !matches!(self.state, BindState::Unbound)
    }

    #[must_use]
    pub const fn is_multi_valued(&self) -> bool {
        matches!(self.state, BindState::Multi(_))
    }

    /// The single bound value, if any.
    #[must_use]
    pub const fn bind_value(&self) -> Option<&Value> {
        match &self.state {
            BindState::Single(value) => Some(value),
            _ => None,
        }
    }

    /// All bound values of a multi-valued binding.
    #[must_use]
    pub fn bind_values(&self) -> &[Value] {
        match &self.state {
            BindState::Multi(values) => values,
            BindState::Single(value) => std::slice::from_ref(value),
            BindState::Unbound => &[],
        }
    }

    #[must_use]
    pub const fn bind_type(&self) -> Option<ValueMapping> {
        self.bind_type
    }

    #[must_use]
    pub const fn type_hint(&self) -> Option<ValueMapping> {
        self.type_hint
    }
}

///
/// QueryParameterBindings
/// Bindings for every parameter of one statement, keyed by parameter id.
///

#[derive(Clone, Debug, Default)]
pub struct QueryParameterBindings {
    bindings: BTreeMap<QueryParameterId, QueryParameterBinding>,
    names: BTreeMap<QueryParameterId, ParameterName>,
    multi_valued: BTreeMap<QueryParameterId, bool>,
}

impl QueryParameterBindings {
    /// Unbound bindings for every parameter of `xref`.
    #[must_use]
    pub fn from_xref(xref: &DomainParameterXref) -> Self {
        let mut bindings = Self::default();
        for parameter in xref.parameters() {
            bindings
                .bindings
                .insert(parameter.id, QueryParameterBinding::default());
            bindings.names.insert(parameter.id, parameter.name.clone());
            bindings
                .multi_valued
                .insert(parameter.id, parameter.allows_multi_valued);
        }

        bindings
    }

    #[must_use]
    pub fn get(&self, parameter: QueryParameterId) -> Option<&QueryParameterBinding> {
        self.bindings.get(&parameter)
    }

    pub fn binding(
        &self,
        parameter: QueryParameterId,
    ) -> Result<&QueryParameterBinding, InternalError> {
        self.bindings.get(&parameter).ok_or_else(|| unknown(parameter))
    }

    fn binding_mut(
        &mut self,
        parameter: QueryParameterId,
    ) -> Result<&mut QueryParameterBinding, InternalError> {
        self.bindings.get_mut(&parameter).ok_or_else(|| unknown(parameter))
    }

    pub fn bind(
        &mut self,
        parameter: QueryParameterId,
        value: impl Into<Value>,
    ) -> Result<(), InternalError> {
        self.binding_mut(parameter)?.state = BindState::Single(value.into());
        Ok(())
    }

    pub fn bind_null(&mut self, parameter: QueryParameterId) -> Result<(), InternalError> {
        self.bind(parameter, Value::Null)
    }

    /// Bind several values; the parameter must accept multiple values.
    pub fn bind_multi(
        &mut self,
        parameter: QueryParameterId,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<(), InternalError> {
        if !self.multi_valued.get(&parameter).copied().unwrap_or(false) {
            let label = self
                .names
                .get(&parameter)
                .map_or_else(|| parameter.to_string(), ToString::to_string);
            return Err(InternalError::binding_unsupported(format!(
                "parameter {label} does not accept multiple values"
            )));
        }

        self.binding_mut(parameter)?.state = BindState::Multi(values.into_iter().collect());
        Ok(())
    }

    pub fn unbind(&mut self, parameter: QueryParameterId) -> Result<(), InternalError> {
        self.binding_mut(parameter)?.state = BindState::Unbound;
        Ok(())
    }

    pub fn set_bind_type(
        &mut self,
        parameter: QueryParameterId,
        mapping: ValueMapping,
    ) -> Result<(), InternalError> {
        self.binding_mut(parameter)?.bind_type = Some(mapping);
        Ok(())
    }

    pub fn set_type_hint(
        &mut self,
        parameter: QueryParameterId,
        mapping: ValueMapping,
    ) -> Result<(), InternalError> {
        self.binding_mut(parameter)?.type_hint = Some(mapping);
        Ok(())
    }

    /// Fail on the first parameter with no binding.
    pub fn verify_all_bound(&self) -> Result<(), InternalError> {
        for (id, binding) in &self.bindings {
            if !binding.is_bound() {
                let label = self
                    .names
                    .get(id)
                    .map_or_else(|| id.to_string(), ToString::to_string);
                return Err(InternalError::binding_unsupported(format!(
                    "no value bound for parameter {label}"
                )));
            }
        }

        Ok(())
    }
}

fn unknown(parameter: QueryParameterId) -> InternalError {
    InternalError::query_invariant(format!("no binding registered for parameter {parameter}"))
}
