use crate::{
    db::query::{
        binding::QueryParameterBindings,
        parameter::{
            AnticipatedType, OccurrenceId, ParameterName, ParameterOccurrence, ParameterSpec,
            QueryParameter, QueryParameterId,
        },
    },
    error::InternalError,
};
use std::collections::BTreeMap;

///
/// DomainParameterXref
///
/// Logical parameters of one statement and every occurrence of each, plus
/// the expansion occurrences created when a parameter is bound to several
/// values.
///
/// Occurrences are numbered in statement order; expansions of an occurrence
/// sit directly after it when slots are allocated. Expansion ids released by
/// a re-expansion are recycled, so the arena never outgrows the largest
/// expansion set seen.
///

#[derive(Clone, Debug, Default)]
pub struct DomainParameterXref {
    parameters: Vec<QueryParameter>,
    occurrences: Vec<ParameterOccurrence>,
    occurrences_by_parameter: BTreeMap<QueryParameterId, Vec<OccurrenceId>>,
    expansions: BTreeMap<OccurrenceId, Vec<OccurrenceId>>,
    spare_expansions: Vec<OccurrenceId>,
}

impl DomainParameterXref {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a logical parameter.
    ///
    /// A name seen before returns the existing id. Named and positional
    /// parameters cannot be mixed in one statement.
    pub fn register_parameter(
        &mut self,
        spec: ParameterSpec,
    ) -> Result<QueryParameterId, InternalError> {
        if let Some(existing) = self.parameters.iter().find(|p| p.name == spec.name) {
            return Ok(existing.id);
        }
        if self
            .parameters
            .first()
            .is_some_and(|first| first.name.is_named() != spec.name.is_named())
        {
            return Err(InternalError::query_unsupported(format!(
                "cannot mix named and positional parameters (registering {})",
                spec.name
            )));
        }

        let id = QueryParameterId(next_index(self.parameters.len())?);
        self.parameters.push(QueryParameter {
            id,
            name: spec.name,
            declared_type: spec.declared_type,
            value_class: spec.value_class,
            allows_multi_valued: spec.allows_multi_valued,
        });
        self.occurrences_by_parameter.insert(id, Vec::new());

        Ok(id)
    }

    /// Record one syntactic occurrence of a registered parameter.
    pub fn register_occurrence(
        &mut self,
        parameter: QueryParameterId,
        anticipated: Option<AnticipatedType>,
    ) -> Result<OccurrenceId, InternalError> {
        let id = self.push_occurrence(parameter, anticipated, None)?;
        self.occurrences_by_parameter
            .entry(parameter)
            .or_default()
            .push(id);

        Ok(id)
    }

    fn push_occurrence(
        &mut self,
        parameter: QueryParameterId,
        anticipated: Option<AnticipatedType>,
        expansion_of: Option<OccurrenceId>,
    ) -> Result<OccurrenceId, InternalError> {
        self.parameter(parameter)?;

        let id = OccurrenceId(next_index(self.occurrences.len())?);
        self.occurrences.push(ParameterOccurrence {
            id,
            parameter,
            anticipated,
            expansion_of,
        });

        Ok(id)
    }

    /// Reuse a released expansion id when one is available.
    fn push_expansion(
        &mut self,
        original: &ParameterOccurrence,
    ) -> Result<OccurrenceId, InternalError> {
        let Some(id) = self.spare_expansions.pop() else {
            return self.push_occurrence(
                original.parameter,
                original.anticipated,
                Some(original.id),
            );
        };

        let slot = self.occurrences.get_mut(id.0 as usize).ok_or_else(|| {
            InternalError::query_invariant(format!("unknown parameter occurrence {id}"))
        })?;
        *slot = ParameterOccurrence {
            id,
            parameter: original.parameter,
            anticipated: original.anticipated,
            expansion_of: Some(original.id),
        };

        Ok(id)
    }

    /// Return expansion ids to the spare pool, lowest id popped first.
    fn release_expansions(&mut self, released: impl IntoIterator<Item = OccurrenceId>) {
        self.spare_expansions.extend(released);
        self.spare_expansions.sort_unstable_by(|a, b| b.cmp(a));
    }

    #[must_use]
    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    #[must_use]
    pub fn query_parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Original occurrences plus live expansions.
    #[must_use]
    pub fn occurrence_count(&self) -> usize {
        let originals: usize = self.occurrences_by_parameter.values().map(Vec::len).sum();
        let expansions: usize = self.expansions.values().map(Vec::len).sum();

        originals + expansions
    }

    pub fn parameters(&self) -> impl Iterator<Item = &QueryParameter> {
        self.parameters.iter()
    }

    pub fn parameter(&self, id: QueryParameterId) -> Result<&QueryParameter, InternalError> {
        self.parameters.get(id.0 as usize).ok_or_else(|| {
            InternalError::query_invariant(format!("unknown query parameter {id}"))
        })
    }

    #[must_use]
    pub fn parameter_by_name(&self, name: &str) -> Option<QueryParameterId> {
        self.parameters
            .iter()
            .find(|p| matches!(&p.name, ParameterName::Named(n) if n == name))
            .map(|p| p.id)
    }

    #[must_use]
    pub fn parameter_by_position(&self, position: u32) -> Option<QueryParameterId> {
        self.parameters
            .iter()
            .find(|p| p.name == ParameterName::Positional(position))
            .map(|p| p.id)
    }

    pub fn occurrence(&self, id: OccurrenceId) -> Result<&ParameterOccurrence, InternalError> {
        self.occurrences.get(id.0 as usize).ok_or_else(|| {
            InternalError::query_invariant(format!("unknown parameter occurrence {id}"))
        })
    }

    /// Original occurrences of one parameter, in statement order.
    #[must_use]
    pub fn occurrences_of(&self, parameter: QueryParameterId) -> &[OccurrenceId] {
        self.occurrences_by_parameter
            .get(&parameter)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Every parameter with its original occurrences, ordered by parameter id.
    pub fn occurrences_by_parameter(
        &self,
    ) -> impl Iterator<Item = (QueryParameterId, &[OccurrenceId])> {
        self.occurrences_by_parameter
            .iter()
            .map(|(id, occurrences)| (*id, occurrences.as_slice()))
    }

    /// Original occurrences across all parameters, in statement order.
    #[must_use]
    pub fn original_occurrences(&self) -> Vec<OccurrenceId> {
        let mut all: Vec<OccurrenceId> = self
            .occurrences_by_parameter
            .values()
            .flatten()
            .copied()
            .collect();
        all.sort_unstable();
        all
    }

    /// Expansion occurrences of an original occurrence.
    #[must_use]
    pub fn expansions(&self, occurrence: OccurrenceId) -> &[OccurrenceId] {
        self.expansions.get(&occurrence).map_or(&[][..], Vec::as_slice)
    }

    /// Expand an occurrence for a multi-valued binding of `value_count`
    /// values: the occurrence keeps the first value and `value_count - 1`
    /// expansions are created for the rest, replacing earlier expansions.
    pub fn expand_multi_valued(
        &mut self,
        occurrence: OccurrenceId,
        value_count: usize,
    ) -> Result<&[OccurrenceId], InternalError> {
        let original = self.occurrence(occurrence)?.clone();
        if original.is_expansion() {
            return Err(InternalError::query_invariant(format!(
                "occurrence {occurrence} is itself an expansion"
            )));
        }

        let parameter = self.parameter(original.parameter)?;
        if !parameter.allows_multi_valued {
            return Err(InternalError::binding_unsupported(format!(
                "parameter {parameter} does not accept multiple values"
            )));
        }
        if value_count == 0 {
            return Err(InternalError::binding_unsupported(format!(
                "multi-valued binding of parameter {parameter} has no values"
            )));
        }

        if let Some(previous) = self.expansions.remove(&occurrence) {
            self.release_expansions(previous);
        }

        let mut created = Vec::with_capacity(value_count - 1);
        for _ in 1..value_count {
            created.push(self.push_expansion(&original)?);
        }
        self.expansions.insert(occurrence, created);

        Ok(self.expansions(occurrence))
    }

    /// Expand every occurrence of every multi-valued binding; single and
    /// unbound parameters lose any earlier expansions.
    pub fn expand_for_bindings(
        &mut self,
        bindings: &QueryParameterBindings,
    ) -> Result<(), InternalError> {
        let previous = std::mem::take(&mut self.expansions);
        self.release_expansions(previous.into_values().flatten());

        let plan: Vec<(OccurrenceId, usize)> = self
            .occurrences_by_parameter
            .iter()
            .filter_map(|(parameter, occurrences)| {
                bindings
                    .get(*parameter)
                    .filter(|binding| binding.is_multi_valued())
                    .map(|binding| (occurrences, binding.bind_values().len()))
            })
            .flat_map(|(occurrences, count)| occurrences.iter().map(move |occ| (*occ, count)))
            .collect();

        for (occurrence, count) in plan {
            self.expand_multi_valued(occurrence, count)?;
        }

        Ok(())
    }
}

fn next_index(len: usize) -> Result<u32, InternalError> {
    u32::try_from(len)
        .map_err(|_| InternalError::query_invariant("statement has too many parameters"))
}
