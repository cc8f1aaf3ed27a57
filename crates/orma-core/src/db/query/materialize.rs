use crate::{
    db::{
        query::{
            binding::{BindState, QueryParameterBinding, QueryParameterBindings},
            cross_reference::{OccurrenceSlots, ParameterCrossReference},
            parameter::{OccurrenceId, QueryParameter},
            slots::PositionalSlot,
            type_resolution::TypeResolutions,
            xref::DomainParameterXref,
        },
        session::Session,
    },
    error::InternalError,
    model::DomainModel,
    obs::MetricsEvent,
    types::{ValueMapping, WireType},
    value::Value,
};
use std::collections::BTreeMap;

///
/// BindingValue
///
/// Value for one positional slot. `wire_type` is `None` only for a null
/// bound without any type information.
///

#[derive(Clone, Debug, PartialEq)]
pub struct BindingValue {
    pub wire_type: Option<WireType>,
    pub value: Value,
}

impl BindingValue {
    #[must_use]
    pub const fn typed(wire_type: WireType, value: Value) -> Self {
        Self {
            wire_type: Some(wire_type),
            value,
        }
    }

    #[must_use]
    pub const fn typeless_null() -> Self {
        Self {
            wire_type: None,
            value: Value::Null,
        }
    }
}

///
/// JdbcParameterBindings
/// Positional bindings of one statement execution; each slot bound once.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct JdbcParameterBindings {
    bindings: BTreeMap<PositionalSlot, BindingValue>,
}

impl JdbcParameterBindings {
    pub fn add_binding(
        &mut self,
        slot: PositionalSlot,
        value: BindingValue,
    ) -> Result<(), InternalError> {
        if self.bindings.contains_key(&slot) {
            return Err(InternalError::binding_invariant(format!(
                "positional slot {slot} bound twice"
            )));
        }
        self.bindings.insert(slot, value);

        Ok(())
    }

    #[must_use]
    pub fn get(&self, slot: PositionalSlot) -> Option<&BindingValue> {
        self.bindings.get(&slot)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PositionalSlot, &BindingValue)> {
        self.bindings.iter().map(|(slot, value)| (*slot, value))
    }

    /// Bindings in slot order; slots must run 1..=n without gaps.
    pub fn to_positional(&self) -> Result<Vec<&BindingValue>, InternalError> {
        self.bindings
            .iter()
            .zip(1u32..)
            .map(|((slot, value), expected)| {
                if slot.position() == expected {
                    Ok(value)
                } else {
                    Err(InternalError::binding_invariant(format!(
                        "positional slot ?{expected} is unbound"
                    )))
                }
            })
            .collect()
    }

    /// Disassemble `value` under `mapping` and bind one column per slot.
    ///
    /// Returns how many slots were bound.
    pub fn register_parameters_for_each_jdbc_value(
        &mut self,
        value: &Value,
        mapping: &ValueMapping,
        slots: &[PositionalSlot],
    ) -> Result<usize, InternalError> {
        let wire_types = mapping.jdbc_types()?;
        if wire_types.len() != slots.len() {
            return Err(InternalError::binding_invariant(format!(
                "mapping {mapping} spans {} columns but {} positional slots were allotted",
                wire_types.len(),
                slots.len()
            )));
        }

        let parts = mapping.disassemble(value);
        if parts.len() != slots.len() {
            return Err(InternalError::binding_invariant(format!(
                "value decomposes into {} values under {mapping} but {} slots were allotted",
                parts.len(),
                slots.len()
            )));
        }

        for ((slot, wire), part) in slots.iter().zip(wire_types).zip(parts) {
            if !wire.accepts(&part) {
                return Err(InternalError::binding_unsupported(format!(
                    "{} value cannot bind as {wire} at {slot}",
                    part.tag().label()
                )));
            }
            self.add_binding(*slot, BindingValue::typed(wire, part))?;
        }

        Ok(slots.len())
    }
}

/// Produce positional bindings for every occurrence of every parameter.
///
/// - unbound: typed NULLs per the occurrence's anticipated mapping
/// - multi-valued: first value to the occurrence, the rest to its expansions
/// - single NULL: a typeless NULL in every slot
/// - single value: converted through the resolved type, then the binding's hint
pub fn create_jdbc_parameter_bindings(
    bindings: &QueryParameterBindings,
    xref: &DomainParameterXref,
    jdbc_xref: &ParameterCrossReference,
    types: &TypeResolutions,
    domain_model: &DomainModel,
    session: &Session<'_>,
) -> Result<JdbcParameterBindings, InternalError> {
    let mut out = JdbcParameterBindings::default();

    for (parameter_id, occurrences) in xref.occurrences_by_parameter() {
        if occurrences.is_empty() {
            continue;
        }

        let parameter = xref.parameter(parameter_id)?;
        let binding = bindings.binding(parameter_id)?;
        let slot_map = jdbc_xref.get(parameter_id).ok_or_else(|| {
            InternalError::binding_invariant(format!(
                "parameter {parameter} is missing from the positional cross reference"
            ))
        })?;
        let ctx = BindContext {
            parameter,
            binding,
            parameter_type: types.get(parameter_id),
            session,
        };

        for occurrence in occurrences {
            let slots = slots_of(slot_map, *occurrence)?;

            match binding.state() {
                BindState::Unbound => {
                    let anticipated = match xref.occurrence(*occurrence)?.anticipated {
                        Some(anticipated) => Some(anticipated.resolve(domain_model)?),
                        None => None,
                    };
                    let mapping = anticipated
                        .or(ctx.parameter_type)
                        .or_else(|| binding.type_hint())
                        .ok_or_else(|| InternalError::unresolvable_type(parameter))?;
                    bind_typed_nulls(&mut out, &mapping, slots)?;
                }

                BindState::Multi(values) => {
                    let Some((first, rest)) = values.split_first() else {
                        return Err(InternalError::binding_invariant(format!(
                            "multi-valued binding of parameter {parameter} has no values"
                        )));
                    };
                    ctx.create_value_bindings(&mut out, slots, first)?;

                    let expansions = xref.expansions(*occurrence);
                    if expansions.len() != rest.len() {
                        return Err(InternalError::binding_invariant(format!(
                            "parameter {parameter} has {} expansions for {} values",
                            expansions.len(),
                            values.len()
                        )));
                    }
                    for (expansion, value) in expansions.iter().zip(rest) {
                        let expansion_slots = slots_of(slot_map, *expansion)?;
                        ctx.create_value_bindings(&mut out, expansion_slots, value)?;
                    }
                }

                BindState::Single(value) if value.is_null() => {
                    for slot in slots {
                        out.add_binding(*slot, BindingValue::typeless_null())?;
                    }
                }

                BindState::Single(value) => {
                    ctx.create_value_bindings(&mut out, slots, value)?;
                }
            }
        }
    }

    session.record(MetricsEvent::ParameterBinding {
        slots: u64::try_from(out.len()).unwrap_or(u64::MAX),
    });
    tracing::debug!(slots = out.len(), "materialized positional parameter bindings");

    Ok(out)
}

fn slots_of(
    slot_map: &OccurrenceSlots,
    occurrence: OccurrenceId,
) -> Result<&[PositionalSlot], InternalError> {
    slot_map.get(&occurrence).map(Vec::as_slice).ok_or_else(|| {
        InternalError::binding_invariant(format!("occurrence {occurrence} has no positional slots"))
    })
}

fn bind_typed_nulls(
    out: &mut JdbcParameterBindings,
    mapping: &ValueMapping,
    slots: &[PositionalSlot],
) -> Result<(), InternalError> {
    let wire_types = mapping.jdbc_types()?;
    if wire_types.len() != slots.len() {
        return Err(InternalError::binding_invariant(format!(
            "mapping {mapping} spans {} columns but {} positional slots were allotted",
            wire_types.len(),
            slots.len()
        )));
    }

    for (slot, wire) in slots.iter().zip(wire_types) {
        out.add_binding(*slot, BindingValue::typed(wire, Value::Null))?;
    }

    Ok(())
}

///
/// BindContext
/// Per-parameter state shared by every occurrence it binds.
///

struct BindContext<'a, 's> {
    parameter: &'a QueryParameter,
    binding: &'a QueryParameterBinding,
    parameter_type: Option<ValueMapping>,
    session: &'a Session<'s>,
}

impl BindContext<'_, '_> {
    fn create_value_bindings(
        &self,
        out: &mut JdbcParameterBindings,
        slots: &[PositionalSlot],
        value: &Value,
    ) -> Result<(), InternalError> {
        let mapping = self
            .parameter_type
            .or_else(|| self.binding.type_hint())
            .ok_or_else(|| InternalError::unresolvable_type(self.parameter))?;

        let value = self.unwrap_bind_value(&mapping, value)?;
        let bound = out.register_parameters_for_each_jdbc_value(&value, &mapping, slots)?;
        if bound != slots.len() {
            return Err(InternalError::binding_invariant(format!(
                "bound {bound} of {} positional slots for parameter {}",
                slots.len(),
                self.parameter
            )));
        }

        Ok(())
    }

    /// Replace a managed-entity reference with the key the mapping binds.
    fn unwrap_bind_value(
        &self,
        mapping: &ValueMapping,
        value: &Value,
    ) -> Result<Value, InternalError> {
        let Some(handle) = value.as_entity() else {
            return Ok(value.clone());
        };
        let instance = self.session.instance(handle)?;

        let (target, property) = match mapping {
            ValueMapping::EntityIdentifier(entity) => (*entity, None),
            ValueMapping::AssociationForeignKey(association) => {
                (association.target, association.referenced_property)
            }
            ValueMapping::Scalar(wire) => {
                return Err(InternalError::binding_unsupported(format!(
                    "entity instance of '{}' cannot bind as {wire} for parameter {}",
                    instance.entity().entity_name,
                    self.parameter
                )));
            }
        };

        if instance.entity().root_entity_name != target.root_entity_name {
            return Err(InternalError::binding_unsupported(format!(
                "parameter {} expects '{}' but an instance of '{}' was bound",
                self.parameter,
                target.entity_name,
                instance.entity().entity_name
            )));
        }

        match property {
            None => Ok(instance.id().clone()),
            Some(property) => self
                .session
                .persistence_context()
                .property_key(handle, property)?
                .ok_or_else(|| {
                    InternalError::binding_invariant(format!(
                        "'{}.{property}' is not loaded on the bound instance",
                        target.entity_name
                    ))
                }),
        }
    }
}
