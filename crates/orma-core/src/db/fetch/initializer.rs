use crate::{
    db::{
        datasource::Datasource,
        fetch::{
            DeferredEntity, EntityResult, Fetch, KeySource, LookupKind, NavigablePath, Row, load,
        },
        session::{AttributeValue, EntityHandle, Session},
    },
    error::InternalError,
    model::{AssociationModel, EntityModel, FetchTiming},
};
use std::collections::BTreeMap;

///
/// InitializerId
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct InitializerId(usize);

///
/// InitializerKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum InitializerKind {
    /// Root of the graph; reads its instance from the row.
    EntityResult,
    /// Joined to-one; reads its instance from the row.
    EntityJoined,
    /// To-one resolved immediately through the context or a select.
    EntitySelect,
    /// To-one handed out as a deferred reference.
    EntityDelayed,
}

///
/// Resolution
/// What an initializer produced for the current row.
///

#[derive(Clone, Debug)]
pub enum Resolution {
    Instance(Option<EntityHandle>),
    Deferred(DeferredEntity),
}

impl Resolution {
    fn into_attribute(self) -> AttributeValue {
        match self {
            Self::Instance(handle) => AttributeValue::ToOne(handle),
            Self::Deferred(deferred) => AttributeValue::Deferred(deferred),
        }
    }
}

///
/// InitializerState
///
/// Per-row lifecycle. `Resolving` carries the instance already registered
/// in the persistence context so back-references can see it before its
/// fetches finish.
///

#[derive(Clone, Debug)]
pub enum InitializerState {
    NotRequested,
    Resolving(EntityHandle),
    Resolved(Resolution),
}

#[derive(Clone, Debug)]
enum Strategy {
    Entity {
        fetches: Vec<(&'static str, Assembler)>,
    },
    Select {
        key: KeySource,
        association: &'static AssociationModel,
    },
    Delayed {
        key: KeySource,
        association: &'static AssociationModel,
    },
}

///
/// Initializer
/// Per-path object that produces one entity instance (or reference) per row.
///

#[derive(Debug)]
pub struct Initializer {
    path: NavigablePath,
    kind: InitializerKind,
    entity: &'static EntityModel,
    strategy: Strategy,
    state: InitializerState,
}

impl Initializer {
    fn entity(path: NavigablePath, entity: &'static EntityModel, kind: InitializerKind) -> Self {
        Self {
            path,
            kind,
            entity,
            strategy: Strategy::Entity {
                fetches: Vec::new(),
            },
            state: InitializerState::NotRequested,
        }
    }

    fn for_timing(
        path: NavigablePath,
        association: &'static AssociationModel,
        key: KeySource,
        timing: FetchTiming,
    ) -> Self {
        let (kind, strategy) = match timing {
            FetchTiming::Immediate => (
                InitializerKind::EntitySelect,
                Strategy::Select { key, association },
            ),
            FetchTiming::Delayed => (
                InitializerKind::EntityDelayed,
                Strategy::Delayed { key, association },
            ),
        };

        Self {
            path,
            kind,
            entity: association.target,
            strategy,
            state: InitializerState::NotRequested,
        }
    }

    #[must_use]
    pub const fn path(&self) -> &NavigablePath {
        &self.path
    }

    #[must_use]
    pub const fn kind(&self) -> InitializerKind {
        self.kind
    }

    #[must_use]
    pub const fn entity_model(&self) -> &'static EntityModel {
        self.entity
    }

    #[must_use]
    pub const fn state(&self) -> &InitializerState {
        &self.state
    }
}

///
/// Assembler
/// Produces one attribute value of its owner for the current row.
///

#[derive(Clone, Debug)]
pub enum Assembler {
    Basic {
        owner: NavigablePath,
        column: &'static str,
    },
    Entity(InitializerId),
    BiDirectional(BiDirectionalFetchAssembler),
}

///
/// BiDirectionalFetchAssembler
///
/// Assembler for a circular fetch that points back at an ancestor's
/// instance. It owns no initializer; it asks the ancestor's.
///

#[derive(Clone, Debug)]
pub struct BiDirectionalFetchAssembler {
    initializer: InitializerId,
    referenced_path: NavigablePath,
}

impl BiDirectionalFetchAssembler {
    #[must_use]
    pub const fn referenced_path(&self) -> &NavigablePath {
        &self.referenced_path
    }

    #[must_use]
    pub const fn initializer(&self) -> InitializerId {
        self.initializer
    }

    pub fn assemble(
        &self,
        state: &mut RowProcessingState,
        row: &Row,
        session: &mut Session<'_>,
        datasource: &dyn Datasource,
    ) -> Result<AttributeValue, InternalError> {
        state
            .resolve_instance(self.initializer, row, session, datasource)
            .map(Resolution::into_attribute)
    }
}

///
/// RowProcessingState
///
/// Initializers for one row batch, registered by navigable path so each
/// path gets exactly one. Built once from an `EntityResult`, then fed rows.
///
/// Instances created while reading a row are removed from the persistence
/// context again if that row fails, so a retry assembles them from scratch.
///

#[derive(Debug)]
pub struct RowProcessingState {
    initializers: Vec<Initializer>,
    registry: BTreeMap<NavigablePath, InitializerId>,
    root: InitializerId,
    created_in_row: Vec<EntityHandle>,
}

impl RowProcessingState {
    pub fn new(result: &EntityResult) -> Result<Self, InternalError> {
        let mut state = Self {
            initializers: Vec::new(),
            registry: BTreeMap::new(),
            root: InitializerId(0),
            created_in_row: Vec::new(),
        };
        state.root = state.entity_initializer(
            &result.path,
            result.entity,
            InitializerKind::EntityResult,
            &result.fetches,
        )?;

        tracing::debug!(
            root = %result.path,
            initializers = state.initializers.len(),
            "created row initializers"
        );

        Ok(state)
    }

    /// Initializer registered at `path`, creating it with `producer` when
    /// the path has none yet.
    pub fn resolve_initializer(
        &mut self,
        path: &NavigablePath,
        producer: impl FnOnce() -> Initializer,
    ) -> InitializerId {
        if let Some(id) = self.registry.get(path) {
            return *id;
        }

        let id = InitializerId(self.initializers.len());
        self.initializers.push(producer());
        self.registry.insert(path.clone(), id);

        id
    }

    #[must_use]
    pub fn initializer_at(&self, path: &NavigablePath) -> Option<InitializerId> {
        self.registry.get(path).copied()
    }

    pub fn initializer(&self, id: InitializerId) -> Result<&Initializer, InternalError> {
        self.initializers.get(id.0).ok_or_else(|| {
            InternalError::fetch_invariant(format!("unknown initializer {}", id.0))
        })
    }

    #[must_use]
    pub fn initializer_count(&self) -> usize {
        self.initializers.len()
    }

    #[must_use]
    pub const fn root(&self) -> InitializerId {
        self.root
    }

    /// Materialize the root instance of one row.
    pub fn read_row(
        &mut self,
        row: &Row,
        session: &mut Session<'_>,
        datasource: &dyn Datasource,
    ) -> Result<Option<EntityHandle>, InternalError> {
        session.ensure_open()?;

        let outcome = self.resolve_instance(self.root, row, session, datasource);
        if outcome.is_err() {
            self.discard_created(session);
        }
        self.finish_up_row();

        match outcome? {
            Resolution::Instance(handle) => Ok(handle),
            Resolution::Deferred(_) => Err(InternalError::fetch_invariant(
                "root initializer produced a deferred reference",
            )),
        }
    }

    /// Materialize every row; rows without a root instance are skipped.
    pub fn read_rows(
        &mut self,
        rows: &[Row],
        session: &mut Session<'_>,
        datasource: &dyn Datasource,
    ) -> Result<Vec<EntityHandle>, InternalError> {
        let mut handles = Vec::with_capacity(rows.len());
        for row in rows {
            if let Some(handle) = self.read_row(row, session, datasource)? {
                handles.push(handle);
            }
        }

        Ok(handles)
    }

    fn finish_up_row(&mut self) {
        for initializer in &mut self.initializers {
            initializer.state = InitializerState::NotRequested;
        }
        self.created_in_row.clear();
    }

    fn discard_created(&mut self, session: &mut Session<'_>) {
        for handle in self.created_in_row.drain(..) {
            if let Ok(instance) = session.persistence_context_mut().remove(handle) {
                tracing::debug!(
                    entity = instance.entity().entity_name,
                    id = ?instance.id(),
                    "discarded partially assembled instance"
                );
            }
        }
    }

    fn entity_initializer(
        &mut self,
        path: &NavigablePath,
        entity: &'static EntityModel,
        kind: InitializerKind,
        fetches: &[Fetch],
    ) -> Result<InitializerId, InternalError> {
        if let Some(id) = self.initializer_at(path) {
            return Ok(id);
        }

        // registered before its fetches so back-references can find it
        let id = self.resolve_initializer(path, || {
            Initializer::entity(path.clone(), entity, kind)
        });

        let mut assemblers = Vec::with_capacity(fetches.len());
        for fetch in fetches {
            assemblers.push((fetch.fetchable_name(), self.create_assembler(fetch)?));
        }
        if let Some(Initializer {
            strategy: Strategy::Entity { fetches },
            ..
        }) = self.initializers.get_mut(id.0)
        {
            *fetches = assemblers;
        }

        Ok(id)
    }

    fn create_assembler(&mut self, fetch: &Fetch) -> Result<Assembler, InternalError> {
        let assembler = match fetch {
            Fetch::Basic(basic) => Assembler::Basic {
                owner: basic.owner.clone(),
                column: basic.attribute.name,
            },
            Fetch::Joined(joined) => Assembler::Entity(self.entity_initializer(
                &joined.path,
                joined.association.target,
                InitializerKind::EntityJoined,
                &joined.fetches,
            )?),
            Fetch::Select(select) => {
                Assembler::Entity(self.resolve_initializer(&select.path, || {
                    Initializer::for_timing(
                        select.path.clone(),
                        select.association,
                        select.key.clone(),
                        select.timing,
                    )
                }))
            }
            Fetch::Circular(circular) if circular.bidirectional => {
                let initializer =
                    self.initializer_at(&circular.referenced_path).ok_or_else(|| {
                        InternalError::fetch_invariant(format!(
                            "no initializer registered at '{}' for circular fetch '{}'",
                            circular.referenced_path, circular.path
                        ))
                    })?;
                Assembler::BiDirectional(BiDirectionalFetchAssembler {
                    initializer,
                    referenced_path: circular.referenced_path.clone(),
                })
            }
            Fetch::Circular(circular) => {
                Assembler::Entity(self.resolve_initializer(&circular.path, || {
                    Initializer::for_timing(
                        circular.path.clone(),
                        circular.association,
                        circular.key.clone(),
                        circular.timing,
                    )
                }))
            }
        };

        Ok(assembler)
    }

    fn assemble(
        &mut self,
        assembler: &Assembler,
        row: &Row,
        session: &mut Session<'_>,
        datasource: &dyn Datasource,
    ) -> Result<AttributeValue, InternalError> {
        match assembler {
            Assembler::Basic { owner, column } => {
                Ok(AttributeValue::Basic(row.get(owner, column).clone()))
            }
            Assembler::Entity(id) => self
                .resolve_instance(*id, row, session, datasource)
                .map(Resolution::into_attribute),
            Assembler::BiDirectional(bidirectional) => {
                bidirectional.assemble(self, row, session, datasource)
            }
        }
    }

    fn resolve_instance(
        &mut self,
        id: InitializerId,
        row: &Row,
        session: &mut Session<'_>,
        datasource: &dyn Datasource,
    ) -> Result<Resolution, InternalError> {
        let initializer = self.initializer(id)?;
        match &initializer.state {
            InitializerState::Resolved(resolution) => return Ok(resolution.clone()),
            InitializerState::Resolving(handle) => return Ok(Resolution::Instance(Some(*handle))),
            InitializerState::NotRequested => {}
        }
        let (path, entity, strategy) = (
            initializer.path.clone(),
            initializer.entity,
            initializer.strategy.clone(),
        );

        let resolution = match strategy {
            Strategy::Entity { fetches } => {
                let columns: Vec<&'static str> =
                    entity.identifier.columns.iter().map(|c| c.name).collect();
                let key = row.read_key(&path, &columns);

                if key.is_null_or_all_null() {
                    Resolution::Instance(None)
                } else {
                    let (handle, created) =
                        session.persistence_context_mut().get_or_register(entity, key);
                    if created {
                        self.created_in_row.push(handle);
                        self.set_state(id, InitializerState::Resolving(handle));
                        for (name, assembler) in &fetches {
                            let value = self.assemble(assembler, row, session, datasource)?;
                            session
                                .persistence_context_mut()
                                .instance_mut(handle)?
                                .set_attribute(*name, value);
                        }
                    }
                    Resolution::Instance(Some(handle))
                }
            }

            Strategy::Select { key, association } => {
                let lookup = LookupKind::for_association(association).lookup(key.read(row));
                Resolution::Instance(load::load_entity(session, datasource, entity, &lookup)?)
            }

            Strategy::Delayed { key, association } => {
                let key = key.read(row);
                if key.is_null_or_all_null() {
                    Resolution::Instance(None)
                } else {
                    let lookup = LookupKind::for_association(association).lookup(key.clone());
                    match load::find_managed(session, entity, &lookup)? {
                        Some(handle) => Resolution::Instance(Some(handle)),
                        None => Resolution::Deferred(DeferredEntity::for_association(
                            association,
                            key,
                        )),
                    }
                }
            }
        };

        self.set_state(id, InitializerState::Resolved(resolution.clone()));

        Ok(resolution)
    }

    fn set_state(&mut self, id: InitializerId, state: InitializerState) {
        if let Some(initializer) = self.initializers.get_mut(id.0) {
            initializer.state = state;
        }
    }
}
