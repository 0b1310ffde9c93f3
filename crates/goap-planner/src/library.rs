use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use goap_core::{ActionId, AtomKey, AtomValue, Binding, Condition, Vocabulary, WorldState};
use tracing::{trace, warn};

use crate::action::{ActionDefinition, BoundAction, Services, Term};
use crate::binding::{BindingContext, BindingProvider};
use crate::error::LibraryError;

/// Registered set of action definitions over one closed vocabulary.
///
/// Registration validates eagerly, so a malformed definition is rejected
/// here instead of degrading search. Every mutation bumps [`revision`],
/// which callers use to invalidate cached plans.
///
/// [`revision`]: ActionLibrary::revision
#[derive(Debug, Clone, Default)]
pub struct ActionLibrary {
    vocabulary: Vocabulary,
    actions: Vec<Arc<ActionDefinition>>,
    revision: u64,
}

impl ActionLibrary {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self {
            vocabulary,
            actions: Vec::new(),
            revision: 0,
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<ActionDefinition>> {
        self.actions.iter().find(|a| a.id().as_str() == id)
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<ActionDefinition>> {
        self.actions.iter()
    }

    pub fn register(&mut self, definition: ActionDefinition) -> Result<(), LibraryError> {
        self.validate(&definition)?;
        self.actions.push(Arc::new(definition));
        self.revision += 1;
        Ok(())
    }

    pub fn deregister(&mut self, id: &str) -> Result<Arc<ActionDefinition>, LibraryError> {
        let index = self
            .actions
            .iter()
            .position(|a| a.id().as_str() == id)
            .ok_or_else(|| LibraryError::UnknownAction {
                action: ActionId::new(id.to_owned()),
            })?;
        self.revision += 1;
        Ok(self.actions.remove(index))
    }

    fn validate(&self, definition: &ActionDefinition) -> Result<(), LibraryError> {
        let action = definition.id();
        if self.get(action.as_str()).is_some() {
            return Err(LibraryError::DuplicateAction {
                action: action.clone(),
            });
        }

        for (key, term) in definition.preconditions() {
            match term {
                Term::Service => {
                    return Err(LibraryError::ServiceInPrecondition {
                        action: action.clone(),
                        key: key.clone(),
                    })
                }
                Term::Forward(service) if !matches!(definition.effects().get(service), Some(Term::Service)) => {
                    return Err(LibraryError::UnknownService {
                        action: action.clone(),
                        key: key.clone(),
                        service: service.clone(),
                    })
                }
                _ => {}
            }
            self.validate_term(definition, key, term)?;
        }
        for (key, term) in definition.effects() {
            if let Term::Forward(service) = term {
                return Err(LibraryError::UnknownService {
                    action: action.clone(),
                    key: key.clone(),
                    service: service.clone(),
                });
            }
            self.validate_term(definition, key, term)?;
        }

        let floor = definition.cost_floor();
        if !floor.is_finite() || floor < 0.0 {
            return Err(LibraryError::InvalidCost {
                action: action.clone(),
                cost: floor,
            });
        }
        Ok(())
    }

    fn validate_term(
        &self,
        definition: &ActionDefinition,
        key: &AtomKey,
        term: &Term,
    ) -> Result<(), LibraryError> {
        let checked = match term {
            Term::Value(value) => self.vocabulary.check(key, value),
            Term::Param(param) => {
                if !definition.params().contains(param) {
                    return Err(LibraryError::UndeclaredParam {
                        action: definition.id().clone(),
                        param: param.to_string(),
                    });
                }
                self.vocabulary.check_key(key)
            }
            Term::Service | Term::Forward(_) => self.vocabulary.check_key(key),
        };
        checked.map_err(|source| LibraryError::Vocabulary {
            action: definition.id().clone(),
            source,
        })
    }

    /// Resolve every definition against the candidates of `provider`.
    ///
    /// Output is ordered by precedence, then registration order, then
    /// provider order, then service value order. Candidates that miss a
    /// declared parameter or bind a value outside its key's domain are
    /// dropped.
    ///
    /// A service effect is bound once per value demanded of its key, by the
    /// goal or by a precondition of any other bound candidate. Demands are
    /// collected to a fixed point so services can feed each other through
    /// forwarded preconditions.
    pub fn bind(
        &self,
        snapshot: &WorldState,
        goal: &Condition,
        provider: &dyn BindingProvider,
    ) -> Vec<BoundAction> {
        let context = BindingContext { snapshot, goal };
        let mut parameterised = Vec::new();

        for definition in self.actions.iter() {
            let candidates = if definition.params().is_empty() {
                vec![Binding::none()]
            } else {
                provider.candidates_for(definition.id(), &context)
            };

            for binding in candidates {
                if let Some(missing) = definition
                    .params()
                    .iter()
                    .find(|p| binding.get(p).is_none())
                {
                    warn!(action = %definition.id(), param = %missing, "binding candidate missing parameter");
                    continue;
                }
                parameterised.push((definition, binding));
            }
        }

        let mut demands = Demands::from_goal(goal);
        let mut bound = loop {
            let bound = self.bind_services(&parameterised, &demands);
            let before = demands.len();
            for candidate in &bound {
                demands.extend(&candidate.precondition);
            }
            if demands.len() == before {
                break bound;
            }
        };

        bound.sort_by_key(|b| b.definition.get_precedence());
        bound
    }

    fn bind_services(
        &self,
        parameterised: &[(&Arc<ActionDefinition>, Binding)],
        demands: &Demands,
    ) -> Vec<BoundAction> {
        let mut bound = Vec::new();
        for (definition, binding) in parameterised {
            for services in demands.assignments(definition.service_keys()) {
                let Some((precondition, effect)) = definition.bind(binding, &services) else {
                    continue;
                };
                let checked = self
                    .vocabulary
                    .check_condition(&precondition)
                    .and_then(|()| self.vocabulary.check_effect(&effect));
                if let Err(err) = checked {
                    if services.is_empty() {
                        warn!(action = %definition.id(), binding = %binding, error = %err, "binding candidate rejected");
                    } else {
                        trace!(action = %definition.id(), error = %err, "service value rejected");
                    }
                    continue;
                }
                bound.push(BoundAction {
                    definition: Arc::clone(definition),
                    binding: binding.clone(),
                    services,
                    precondition,
                    effect,
                });
            }
        }
        bound
    }

    /// Bound actions whose precondition (and procedural check) holds in
    /// `state`, in the deterministic order of [`bind`](Self::bind).
    pub fn actions_applicable_to(
        &self,
        state: &WorldState,
        goal: &Condition,
        provider: &dyn BindingProvider,
    ) -> Vec<BoundAction> {
        let mut bound = self.bind(state, goal, provider);
        bound.retain(|b| b.is_applicable(state));
        bound
    }
}

/// Library handle shared by concurrent planners.
///
/// Readers plan under a shared lock; [`configure`](Self::configure) is the
/// exclusive section for registration changes.
#[derive(Debug, Clone, Default)]
pub struct SharedLibrary {
    inner: Arc<RwLock<ActionLibrary>>,
}

impl SharedLibrary {
    pub fn new(library: ActionLibrary) -> Self {
        Self {
            inner: Arc::new(RwLock::new(library)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ActionLibrary> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ActionLibrary> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn configure<R>(&self, f: impl FnOnce(&mut ActionLibrary) -> R) -> R {
        let mut guard = self.write();
        f(&mut guard)
    }

    pub fn revision(&self) -> u64 {
        self.read().revision()
    }
}

impl From<ActionLibrary> for SharedLibrary {
    fn from(library: ActionLibrary) -> Self {
        Self::new(library)
    }
}

/// Values asked of each key, in discovery order: goal first, then
/// preconditions in candidate order.
#[derive(Debug, Default)]
struct Demands {
    values: BTreeMap<AtomKey, Vec<AtomValue>>,
    len: usize,
}

impl Demands {
    fn from_goal(goal: &Condition) -> Self {
        let mut demands = Self::default();
        demands.extend(goal);
        demands
    }

    fn len(&self) -> usize {
        self.len
    }

    fn extend(&mut self, condition: &Condition) {
        for (key, value) in condition.iter() {
            let values = self.values.entry(key.clone()).or_default();
            if !values.contains(value) {
                values.push(value.clone());
                self.len += 1;
            }
        }
    }

    /// Every combination of demanded values for `keys`. One empty assignment
    /// when `keys` is empty, none when any key has no demand.
    fn assignments<'a>(&self, keys: impl Iterator<Item = &'a AtomKey>) -> Vec<Services> {
        let mut assignments = vec![Services::new()];
        for key in keys {
            let Some(values) = self.values.get(key) else {
                return Vec::new();
            };
            assignments = assignments
                .into_iter()
                .flat_map(|partial| {
                    values.iter().map(move |value| {
                        let mut next = partial.clone();
                        next.insert(key.clone(), value.clone());
                        next
                    })
                })
                .collect();
        }
        assignments
    }
}
