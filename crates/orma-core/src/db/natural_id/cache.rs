use crate::{
    model::EntityModel,
    value::{Value, ValueKey, canonical_cmp_list},
};
use derive_more::Deref;
use std::{cmp::Ordering, collections::BTreeMap, fmt};

///
/// NaturalIdValues
///
/// Natural-id values in the entity's declared attribute order.
/// Ordered canonically so it can key the resolution cache.
///

#[derive(Clone, Debug, Deref)]
pub struct NaturalIdValues(Vec<Value>);

impl NaturalIdValues {
    #[must_use]
    pub const fn new(values: Vec<Value>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

impl Eq for NaturalIdValues {}

impl PartialEq for NaturalIdValues {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for NaturalIdValues {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical_cmp_list(&self.0, &other.0)
    }
}

impl PartialOrd for NaturalIdValues {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for NaturalIdValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

///
/// EntityResolutions
/// Bidirectional natural-id ↔ identifier map for one entity hierarchy.
///

#[derive(Debug, Default)]
struct EntityResolutions {
    by_natural_id: BTreeMap<NaturalIdValues, ValueKey>,
    by_id: BTreeMap<ValueKey, NaturalIdValues>,
}

impl EntityResolutions {
    fn len(&self) -> usize {
        self.by_natural_id.len()
    }
}

///
/// NaturalIdResolutions
///
/// Session-scoped cache of natural-id resolutions, keyed by root entity
/// name so subclasses share their hierarchy's entries.
///

#[derive(Debug, Default)]
pub struct NaturalIdResolutions {
    entities: BTreeMap<&'static str, EntityResolutions>,
}

impl NaturalIdResolutions {
    #[must_use]
    pub fn find_cached_id_by_natural_id(
        &self,
        natural_id: &NaturalIdValues,
        entity: &EntityModel,
    ) -> Option<Value> {
        self.entities
            .get(entity.root_entity_name)?
            .by_natural_id
            .get(natural_id)
            .map(|id| (**id).clone())
    }

    #[must_use]
    pub fn find_cached_natural_id_by_id(
        &self,
        id: &Value,
        entity: &EntityModel,
    ) -> Option<&NaturalIdValues> {
        self.entities
            .get(entity.root_entity_name)?
            .by_id
            .get(&ValueKey::new(id.clone()))
    }

    /// Record a resolution observed from a datasource load.
    ///
    /// Stale pairings on either side are dropped first so both directions
    /// stay in agreement. Returns false when the exact pair was already cached.
    pub fn cache_resolution_from_load(
        &mut self,
        id: Value,
        natural_id: NaturalIdValues,
        entity: &'static EntityModel,
    ) -> bool {
        let resolutions = self.entities.entry(entity.root_entity_name).or_default();
        let id = ValueKey::new(id);

        if resolutions.by_id.get(&id) == Some(&natural_id) {
            return false;
        }

        if let Some(stale) = resolutions.by_id.remove(&id) {
            resolutions.by_natural_id.remove(&stale);
        }
        if let Some(stale) = resolutions.by_natural_id.remove(&natural_id) {
            resolutions.by_id.remove(&stale);
        }

        resolutions.by_natural_id.insert(natural_id.clone(), id.clone());
        resolutions.by_id.insert(id, natural_id);

        true
    }

    /// Drop the resolution for one instance.
    pub fn evict_by_id(&mut self, id: &Value, entity: &EntityModel) -> Option<NaturalIdValues> {
        let resolutions = self.entities.get_mut(entity.root_entity_name)?;
        let natural_id = resolutions.by_id.remove(&ValueKey::new(id.clone()))?;
        resolutions.by_natural_id.remove(&natural_id);

        Some(natural_id)
    }

    /// Drop every resolution of an entity hierarchy; returns how many.
    pub fn evict_entity(&mut self, entity: &EntityModel) -> usize {
        self.entities
            .remove(entity.root_entity_name)
            .map_or(0, |resolutions| resolutions.len())
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.values().map(EntityResolutions::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
