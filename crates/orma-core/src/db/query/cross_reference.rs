use crate::db::query::{
    parameter::{OccurrenceId, QueryParameterId},
    slots::{JdbcParameterAccess, PositionalSlot},
    xref::DomainParameterXref,
};
use std::collections::BTreeMap;

/// Slots of each occurrence of one parameter.
pub type OccurrenceSlots = BTreeMap<OccurrenceId, Vec<PositionalSlot>>;

///
/// ParameterCrossReference
///
/// Logical parameter → occurrence → positional slots, as the binding
/// materializer consumes it.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ParameterCrossReference {
    by_parameter: BTreeMap<QueryParameterId, OccurrenceSlots>,
}

impl ParameterCrossReference {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_parameter.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_parameter.len()
    }

    #[must_use]
    pub fn get(&self, parameter: QueryParameterId) -> Option<&OccurrenceSlots> {
        self.by_parameter.get(&parameter)
    }

    #[must_use]
    pub fn slots(
        &self,
        parameter: QueryParameterId,
        occurrence: OccurrenceId,
    ) -> Option<&[PositionalSlot]> {
        self.get(parameter)?.get(&occurrence).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (QueryParameterId, &OccurrenceSlots)> {
        self.by_parameter.iter().map(|(id, slots)| (*id, slots))
    }

    #[must_use]
    pub fn total_slot_count(&self) -> usize {
        self.by_parameter
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }
}

/// Build the parameter → occurrence → slots cross-reference.
///
/// A statement without parameters yields an empty reference. Expansion
/// occurrences are grouped under their parameter next to the original.
/// Occurrences the access has no slots for are left out.
#[must_use]
pub fn build_jdbc_params_xref(
    xref: Option<&DomainParameterXref>,
    access: &dyn JdbcParameterAccess,
) -> ParameterCrossReference {
    let Some(xref) = xref.filter(|xref| xref.has_parameters()) else {
        return ParameterCrossReference::default();
    };

    let mut by_parameter = BTreeMap::new();
    for (parameter, occurrences) in xref.occurrences_by_parameter() {
        let mut slots = OccurrenceSlots::new();

        for original in occurrences {
            for occurrence in std::iter::once(original).chain(xref.expansions(*original)) {
                match access.slots_for(*occurrence) {
                    Some(found) => {
                        slots.insert(*occurrence, found.to_vec());
                    }
                    None => tracing::debug!(
                        parameter = %parameter,
                        occurrence = %occurrence,
                        "occurrence has no positional slots"
                    ),
                }
            }
        }

        by_parameter.insert(parameter, slots);
    }

    ParameterCrossReference { by_parameter }
}
