use crate::{
    db::{
        datasource::{Datasource, EntityLookup},
        fetch::{LookupKind, load},
        session::{EntityHandle, Session},
    },
    error::InternalError,
    model::{AssociationModel, EntityModel},
    value::Value,
};
use std::{cell::RefCell, fmt, rc::Rc};

type Thunk<T> = Box<dyn Fn(&mut Session<'_>, &dyn Datasource) -> Result<T, InternalError>>;

enum DeferredState<T> {
    Pending,
    Resolving,
    Resolved(T),
}

///
/// Deferred
///
/// Memoized, session-bound thunk. The first successful `get` runs the thunk
/// and caches its value; later calls return the cached value. A failed run
/// leaves the value pending so it can be retried.
///

pub struct Deferred<T> {
    thunk: Option<Thunk<T>>,
    state: RefCell<DeferredState<T>>,
}

impl<T: Clone> Deferred<T> {
    pub fn new(
        thunk: impl Fn(&mut Session<'_>, &dyn Datasource) -> Result<T, InternalError> + 'static,
    ) -> Self {
        Self {
            thunk: Some(Box::new(thunk)),
            state: RefCell::new(DeferredState::Pending),
        }
    }

    /// Already-resolved value; never runs anything.
    pub fn resolved(value: T) -> Self {
        Self {
            thunk: None,
            state: RefCell::new(DeferredState::Resolved(value)),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(*self.state.borrow(), DeferredState::Resolved(_))
    }

    /// Cached value, without resolving.
    pub fn peek(&self) -> Option<T> {
        match &*self.state.borrow() {
            DeferredState::Resolved(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn get(
        &self,
        session: &mut Session<'_>,
        datasource: &dyn Datasource,
    ) -> Result<T, InternalError> {
        let thunk = {
            let mut state = self.state.borrow_mut();
            match &*state {
                DeferredState::Resolved(value) => return Ok(value.clone()),
                DeferredState::Resolving => {
                    return Err(InternalError::fetch_invariant(
                        "deferred value re-entered while resolving",
                    ));
                }
                DeferredState::Pending => {}
            }
            let Some(thunk) = self.thunk.as_ref() else {
                return Err(InternalError::fetch_invariant(
                    "deferred value has nothing to resolve",
                ));
            };
            *state = DeferredState::Resolving;
            thunk
        };

        let outcome = thunk(session, datasource);

        let mut state = self.state.borrow_mut();
        match outcome {
            Ok(value) => {
                *state = DeferredState::Resolved(value.clone());
                Ok(value)
            }
            Err(err) => {
                *state = DeferredState::Pending;
                Err(err)
            }
        }
    }
}

impl<T> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.borrow() {
            DeferredState::Pending => "pending",
            DeferredState::Resolving => "resolving",
            DeferredState::Resolved(_) => "resolved",
        };
        f.debug_struct("Deferred").field("state", &state).finish_non_exhaustive()
    }
}

///
/// DeferredEntity
///
/// Lazily resolved to-one. Clones share one memoized resolution.
///

#[derive(Clone, Debug)]
pub struct DeferredEntity {
    entity: &'static EntityModel,
    lookup: EntityLookup,
    inverse: bool,
    value: Rc<Deferred<Option<EntityHandle>>>,
}

impl DeferredEntity {
    /// Reference to the target of `association` located by `key`.
    #[must_use]
    pub fn for_association(association: &'static AssociationModel, key: Value) -> Self {
        let entity = association.target;
        let lookup = LookupKind::for_association(association).lookup(key);
        let captured = lookup.clone();

        Self {
            entity,
            lookup,
            inverse: association.is_inverse(),
            value: Rc::new(Deferred::new(move |session, datasource| {
                load::load_entity(session, datasource, entity, &captured)
            })),
        }
    }

    #[must_use]
    pub const fn entity(&self) -> &'static EntityModel {
        self.entity
    }

    #[must_use]
    pub const fn lookup(&self) -> &EntityLookup {
        &self.lookup
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.value.is_resolved()
    }

    #[must_use]
    pub fn peek(&self) -> Option<Option<EntityHandle>> {
        self.value.peek()
    }

    /// The owner-side key of this reference, when known without loading.
    ///
    /// Inverse references are keyed by the owner's own identifier, which is
    /// not a key of the target.
    #[must_use]
    pub fn known_key(&self) -> Option<Value> {
        (!self.inverse).then(|| self.lookup.key().clone())
    }

    pub fn get(
        &self,
        session: &mut Session<'_>,
        datasource: &dyn Datasource,
    ) -> Result<Option<EntityHandle>, InternalError> {
        self.value.get(session, datasource)
    }
}
