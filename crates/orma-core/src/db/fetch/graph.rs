use crate::{
    config::EngineConfig,
    db::{
        datasource::EntityLookup,
        fetch::{NavigablePath, Row},
    },
    model::{AssociationModel, AttributeModel, EntityModel, FetchTiming},
    value::Value,
};

///
/// LookupKind
/// How the target of a to-one is located once its key is read.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LookupKind {
    ById,
    ByUniqueKey(&'static str),
}

impl LookupKind {
    /// Inverse sides look up the owning association; referenced properties
    /// look up that property; everything else goes by identifier.
    #[must_use]
    pub const fn for_association(association: &AssociationModel) -> Self {
        match (association.mapped_by, association.referenced_property) {
            (Some(owning), _) => Self::ByUniqueKey(owning),
            (None, Some(property)) => Self::ByUniqueKey(property),
            (None, None) => Self::ById,
        }
    }

    #[must_use]
    pub const fn lookup(self, key: Value) -> EntityLookup {
        match self {
            Self::ById => EntityLookup::ById(key),
            Self::ByUniqueKey(property) => EntityLookup::ByUniqueKey {
                property,
                value: key,
            },
        }
    }
}

///
/// KeySource
///
/// Where a to-one's key sits in the row: the owner's foreign-key columns,
/// or for an inverse side the owner's identifier columns.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeySource {
    pub path: NavigablePath,
    pub columns: Vec<&'static str>,
}

impl KeySource {
    #[must_use]
    pub fn for_association(
        association: &AssociationModel,
        owner: &EntityModel,
        owner_path: &NavigablePath,
    ) -> Self {
        let columns = if association.is_inverse() {
            owner.identifier.columns.iter().map(|c| c.name).collect()
        } else {
            association.fk_columns.to_vec()
        };

        Self {
            path: owner_path.clone(),
            columns,
        }
    }

    #[must_use]
    pub fn read(&self, row: &Row) -> Value {
        row.read_key(&self.path, &self.columns)
    }
}

///
/// BasicFetch
///

#[derive(Clone, Debug)]
pub struct BasicFetch {
    pub path: NavigablePath,
    pub owner: NavigablePath,
    pub attribute: &'static AttributeModel,
}

///
/// EntityFetch
/// Joined to-one whose columns arrive in the same row.
///

#[derive(Clone, Debug)]
pub struct EntityFetch {
    pub path: NavigablePath,
    pub association: &'static AssociationModel,
    pub fetches: Vec<Fetch>,
}

///
/// SelectFetch
/// Non-joined to-one resolved by a subsequent select, now or on first access.
///

#[derive(Clone, Debug)]
pub struct SelectFetch {
    pub path: NavigablePath,
    pub association: &'static AssociationModel,
    pub key: KeySource,
    pub timing: FetchTiming,
}

///
/// CircularFetch
///
/// To-one whose target entity already appears on the path above it.
/// Never expanded further; resolved against the instance at
/// `referenced_path` or through its own select.
///

#[derive(Clone, Debug)]
pub struct CircularFetch {
    pub path: NavigablePath,
    pub referenced_path: NavigablePath,
    pub association: &'static AssociationModel,
    pub key: KeySource,
    pub timing: FetchTiming,
    /// The association walks straight back along the edge it came from, so
    /// it yields the instance already materialized at `referenced_path`.
    pub bidirectional: bool,
}

///
/// Fetch
///

#[derive(Clone, Debug)]
pub enum Fetch {
    Basic(BasicFetch),
    Joined(EntityFetch),
    Select(SelectFetch),
    Circular(CircularFetch),
}

impl Fetch {
    #[must_use]
    pub const fn path(&self) -> &NavigablePath {
        match self {
            Self::Basic(fetch) => &fetch.path,
            Self::Joined(fetch) => &fetch.path,
            Self::Select(fetch) => &fetch.path,
            Self::Circular(fetch) => &fetch.path,
        }
    }

    /// Attribute name this fetch populates on its owner.
    #[must_use]
    pub const fn fetchable_name(&self) -> &'static str {
        match self {
            Self::Basic(fetch) => fetch.attribute.name,
            Self::Joined(EntityFetch { association, .. })
            | Self::Select(SelectFetch { association, .. })
            | Self::Circular(CircularFetch { association, .. }) => association.name,
        }
    }
}

///
/// EntityResult
/// Root of a fetch graph.
///

#[derive(Clone, Debug)]
pub struct EntityResult {
    pub path: NavigablePath,
    pub entity: &'static EntityModel,
    pub fetches: Vec<Fetch>,
}

impl EntityResult {
    /// Depth-first search for the fetch at `path`.
    #[must_use]
    pub fn find_fetch(&self, path: &NavigablePath) -> Option<&Fetch> {
        fn walk<'a>(fetches: &'a [Fetch], path: &NavigablePath) -> Option<&'a Fetch> {
            fetches.iter().find_map(|fetch| {
                if fetch.path() == path {
                    return Some(fetch);
                }
                match fetch {
                    Fetch::Joined(joined) if joined.path.is_ancestor_of(path) => {
                        walk(&joined.fetches, path)
                    }
                    _ => None,
                }
            })
        }

        walk(&self.fetches, path)
    }
}

// One node on the path from the root to the fetch being built.
struct Ancestor {
    path: NavigablePath,
    entity: &'static EntityModel,
    via: Option<&'static AssociationModel>,
}

///
/// FetchGraphBuilder
///
/// Builds the fetch graph for a root entity: to-ones are joined up to
/// `max_fetch_depth`, delayed associations become selects, and any
/// association that leads back to an entity already on the path becomes a
/// circular fetch instead of recursing.
///

#[derive(Clone, Copy, Debug)]
pub struct FetchGraphBuilder {
    max_fetch_depth: usize,
    default_timing: FetchTiming,
}

impl Default for FetchGraphBuilder {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl FetchGraphBuilder {
    #[must_use]
    pub const fn new(config: &EngineConfig) -> Self {
        Self {
            max_fetch_depth: config.max_fetch_depth,
            default_timing: config.default_to_one_timing,
        }
    }

    #[must_use]
    pub fn build(&self, entity: &'static EntityModel) -> EntityResult {
        let path = NavigablePath::root(entity.entity_name);
        let mut stack = vec![Ancestor {
            path: path.clone(),
            entity,
            via: None,
        }];
        let fetches = self.build_fetches(&mut stack);

        EntityResult {
            path,
            entity,
            fetches,
        }
    }

    fn build_fetches(&self, stack: &mut Vec<Ancestor>) -> Vec<Fetch> {
        let Some(current) = stack.last() else {
            return Vec::new();
        };
        let (path, entity, via) = (current.path.clone(), current.entity, current.via);

        let mut fetches: Vec<Fetch> = entity
            .attributes
            .iter()
            .map(|attribute| {
                Fetch::Basic(BasicFetch {
                    path: path.append(attribute.name),
                    owner: path.clone(),
                    attribute,
                })
            })
            .collect();

        for association in entity.associations {
            let child = path.append(association.name);
            let key = KeySource::for_association(association, entity, &path);

            if let Some(referenced) = stack
                .iter()
                .rev()
                .find(|ancestor| ancestor.entity.is_same(association.target))
            {
                let bidirectional = path.parent().as_ref() == Some(&referenced.path)
                    && via.is_some_and(|edge| {
                        edge.mapped_by == Some(association.name)
                            || association.mapped_by == Some(edge.name)
                    });

                fetches.push(Fetch::Circular(CircularFetch {
                    path: child,
                    referenced_path: referenced.path.clone(),
                    association,
                    key,
                    timing: association.timing,
                    bidirectional,
                }));
                continue;
            }

            if association.timing == FetchTiming::Delayed {
                fetches.push(Fetch::Select(SelectFetch {
                    path: child,
                    association,
                    key,
                    timing: FetchTiming::Delayed,
                }));
                continue;
            }

            if child.depth() > self.max_fetch_depth {
                fetches.push(Fetch::Select(SelectFetch {
                    path: child,
                    association,
                    key,
                    timing: self.default_timing,
                }));
                continue;
            }

            stack.push(Ancestor {
                path: child.clone(),
                entity: association.target,
                via: Some(association),
            });
            let nested = self.build_fetches(stack);
            stack.pop();

            fetches.push(Fetch::Joined(EntityFetch {
                path: child,
                association,
                fetches: nested,
            }));
        }

        fetches
    }
}
