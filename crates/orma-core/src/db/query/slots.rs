use crate::{
    db::query::{
        binding::{QueryParameterBinding, QueryParameterBindings},
        parameter::OccurrenceId,
        type_resolution::TypeResolutions,
        xref::DomainParameterXref,
    },
    error::InternalError,
    model::DomainModel,
};
use std::{collections::BTreeMap, fmt};

///
/// PositionalSlot
/// One `?` position in the emitted statement (1-based).
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PositionalSlot(u32);

impl PositionalSlot {
    #[must_use]
    pub const fn new(position: u32) -> Self {
        Self(position)
    }

    #[must_use]
    pub const fn position(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PositionalSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?{}", self.0)
    }
}

///
/// JdbcParameterAccess
/// Slots assigned to each occurrence during statement translation.
///

pub trait JdbcParameterAccess {
    fn slots_for(&self, occurrence: OccurrenceId) -> Option<&[PositionalSlot]>;
}

///
/// SlotAssignment
///

#[derive(Clone, Debug, Default)]
pub struct SlotAssignment {
    by_occurrence: BTreeMap<OccurrenceId, Vec<PositionalSlot>>,
    slot_count: u32,
}

impl SlotAssignment {
    /// Record slots for one occurrence.
    pub fn insert(&mut self, occurrence: OccurrenceId, slots: Vec<PositionalSlot>) {
        if let Some(max) = slots.iter().map(|slot| slot.position()).max() {
            self.slot_count = self.slot_count.max(max);
        }
        self.by_occurrence.insert(occurrence, slots);
    }

    #[must_use]
    pub const fn slot_count(&self) -> u32 {
        self.slot_count
    }
}

impl JdbcParameterAccess for SlotAssignment {
    fn slots_for(&self, occurrence: OccurrenceId) -> Option<&[PositionalSlot]> {
        self.by_occurrence.get(&occurrence).map(Vec::as_slice)
    }
}

/// Assign contiguous positional slots to every occurrence, in statement
/// order, with an occurrence's expansions directly after it.
///
/// Width per occurrence: the anticipated mapping's column count, else the
/// parameter's resolved type, else the binding's type hint, else one slot.
pub fn allocate_slots(
    xref: &DomainParameterXref,
    bindings: &QueryParameterBindings,
    domain_model: &DomainModel,
    types: Option<&TypeResolutions>,
) -> Result<SlotAssignment, InternalError> {
    let mut assignment = SlotAssignment::default();
    let mut next = 1u32;

    for original in xref.original_occurrences() {
        let width = occurrence_width(xref, bindings, original, domain_model, types)?;
        let expansions = xref.expansions(original).iter().copied();

        for occurrence in std::iter::once(original).chain(expansions) {
            let slots: Vec<PositionalSlot> = (next..next + width).map(PositionalSlot).collect();
            next += width;
            assignment.insert(occurrence, slots);
        }
    }

    Ok(assignment)
}

fn occurrence_width(
    xref: &DomainParameterXref,
    bindings: &QueryParameterBindings,
    occurrence: OccurrenceId,
    domain_model: &DomainModel,
    types: Option<&TypeResolutions>,
) -> Result<u32, InternalError> {
    let occ = xref.occurrence(occurrence)?;

    let mapping = match occ.anticipated {
        Some(anticipated) => Some(anticipated.resolve(domain_model)?),
        None => types
            .and_then(|types| types.get(occ.parameter))
            .or_else(|| {
                bindings
                    .get(occ.parameter)
                    .and_then(QueryParameterBinding::type_hint)
            }),
    };
    let width = match mapping {
        Some(mapping) => mapping.jdbc_type_count()?,
        None => 1,
    };

    u32::try_from(width).map_err(|_| {
        InternalError::binding_invariant(format!("occurrence {occurrence} is too wide"))
    })
}
