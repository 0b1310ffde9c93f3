//! Action definitions and their bound (parameter-substituted) form.

use core::fmt;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use goap_core::{matches, ActionId, AtomKey, AtomValue, Binding, Condition, Effect, WorldState};

/// Cost evaluator: `(state the action runs from, binding) -> cost`.
///
/// Must return a finite, non-negative value no lower than the definition's
/// declared floor.
pub type CostFn = Arc<dyn Fn(&WorldState, &Binding) -> f64 + Send + Sync>;

/// Extra applicability test that cannot be expressed as atom equality.
pub type ProceduralCheck = Arc<dyn Fn(&WorldState, &Binding) -> bool + Send + Sync>;

/// Service values chosen for one bound candidate, keyed by effect key.
pub type Services = BTreeMap<AtomKey, AtomValue>;

/// Value of a precondition or effect atom before binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Value(AtomValue),
    /// Substituted from the binding parameter of this name.
    Param(Cow<'static, str>),
    /// Effects only: the action provides whatever value is asked of this
    /// key, either by the goal or by another action's precondition.
    Service,
    /// Preconditions only: requires the value this action's service effect
    /// on the named key was bound to.
    Forward(AtomKey),
}

impl Term {
    fn resolve(&self, binding: &Binding, services: &Services, key: &AtomKey) -> Option<AtomValue> {
        match self {
            Term::Value(v) => Some(v.clone()),
            Term::Param(name) => binding.get(name).cloned(),
            Term::Service => services.get(key).cloned(),
            Term::Forward(service) => services.get(service).cloned(),
        }
    }
}

impl From<AtomValue> for Term {
    fn from(value: AtomValue) -> Self {
        Term::Value(value)
    }
}

macro_rules! term_from_literal {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Term {
                fn from(value: $ty) -> Self {
                    Term::Value(value.into())
                }
            }
        )*
    };
}

term_from_literal!(bool, i64, i32, &'static str, String);

#[derive(Clone)]
enum Cost {
    Fixed(f64),
    Evaluated { eval: CostFn, floor: f64 },
}

/// Named unit of behaviour: preconditions, effects and a cost.
///
/// Built once at agent initialisation and shared read-only between planning
/// sessions.
#[derive(Clone)]
pub struct ActionDefinition {
    id: ActionId,
    params: Vec<Cow<'static, str>>,
    preconditions: BTreeMap<AtomKey, Term>,
    effects: BTreeMap<AtomKey, Term>,
    cost: Cost,
    precedence: i32,
    procedural: Option<ProceduralCheck>,
}

impl ActionDefinition {
    pub fn new(id: impl Into<ActionId>) -> Self {
        Self {
            id: id.into(),
            params: Vec::new(),
            preconditions: BTreeMap::new(),
            effects: BTreeMap::new(),
            cost: Cost::Fixed(1.0),
            precedence: 0,
            procedural: None,
        }
    }

    /// Declare a binding parameter. Actions with parameters get their
    /// bindings from a [`BindingProvider`](crate::BindingProvider).
    pub fn param(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        if !self.params.contains(&name) {
            self.params.push(name);
        }
        self
    }

    pub fn precondition(mut self, key: impl Into<AtomKey>, term: impl Into<Term>) -> Self {
        self.preconditions.insert(key.into(), term.into());
        self
    }

    pub fn precondition_param(self, key: impl Into<AtomKey>, param: impl Into<Cow<'static, str>>) -> Self {
        self.precondition(key, Term::Param(param.into()))
    }

    pub fn effect(mut self, key: impl Into<AtomKey>, term: impl Into<Term>) -> Self {
        self.effects.insert(key.into(), term.into());
        self
    }

    pub fn effect_param(self, key: impl Into<AtomKey>, param: impl Into<Cow<'static, str>>) -> Self {
        self.effect(key, Term::Param(param.into()))
    }

    /// Declare `key` as a service effect. See [`Term::Service`].
    pub fn service(self, key: impl Into<AtomKey>) -> Self {
        self.effect(key, Term::Service)
    }

    /// Require `key` to equal the value bound to the service effect on
    /// `service`.
    pub fn precondition_from_service(self, key: impl Into<AtomKey>, service: impl Into<AtomKey>) -> Self {
        self.precondition(key, Term::Forward(service.into()))
    }

    pub fn cost(mut self, cost: f64) -> Self {
        self.cost = Cost::Fixed(cost);
        self
    }

    /// Evaluated cost with a floor of zero.
    pub fn cost_fn<F>(self, eval: F) -> Self
    where
        F: Fn(&WorldState, &Binding) -> f64 + Send + Sync + 'static,
    {
        self.cost_fn_with_floor(0.0, eval)
    }

    /// Evaluated cost that never drops below `floor`. A higher floor lets the
    /// planner use a stronger admissible heuristic.
    pub fn cost_fn_with_floor<F>(mut self, floor: f64, eval: F) -> Self
    where
        F: Fn(&WorldState, &Binding) -> f64 + Send + Sync + 'static,
    {
        self.cost = Cost::Evaluated {
            eval: Arc::new(eval),
            floor,
        };
        self
    }

    /// Lower precedence is tried first when candidates are ordered.
    pub fn precedence(mut self, precedence: i32) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn procedural<F>(mut self, check: F) -> Self
    where
        F: Fn(&WorldState, &Binding) -> bool + Send + Sync + 'static,
    {
        self.procedural = Some(Arc::new(check));
        self
    }

    pub fn id(&self) -> &ActionId {
        &self.id
    }

    pub fn params(&self) -> &[Cow<'static, str>] {
        &self.params
    }

    pub fn preconditions(&self) -> &BTreeMap<AtomKey, Term> {
        &self.preconditions
    }

    pub fn effects(&self) -> &BTreeMap<AtomKey, Term> {
        &self.effects
    }

    pub fn get_precedence(&self) -> i32 {
        self.precedence
    }

    /// Declared lower bound of this action's cost.
    pub fn cost_floor(&self) -> f64 {
        match &self.cost {
            Cost::Fixed(c) => *c,
            Cost::Evaluated { floor, .. } => *floor,
        }
    }

    pub fn fixed_cost(&self) -> Option<f64> {
        match &self.cost {
            Cost::Fixed(c) => Some(*c),
            Cost::Evaluated { .. } => None,
        }
    }

    pub fn evaluate_cost(&self, state: &WorldState, binding: &Binding) -> f64 {
        match &self.cost {
            Cost::Fixed(c) => *c,
            Cost::Evaluated { eval, .. } => eval(state, binding),
        }
    }

    /// Keys of the service effects, in key order.
    pub fn service_keys(&self) -> impl Iterator<Item = &AtomKey> {
        self.effects
            .iter()
            .filter(|(_, term)| matches!(term, Term::Service))
            .map(|(key, _)| key)
    }

    pub fn passes_procedural(&self, state: &WorldState, binding: &Binding) -> bool {
        self.procedural
            .as_ref()
            .map_or(true, |check| check(state, binding))
    }

    /// Substitute `binding` and the chosen service values.
    ///
    /// Returns `None` when a referenced parameter is missing from the binding
    /// or a service key has no chosen value.
    pub fn bind(&self, binding: &Binding, services: &Services) -> Option<(Condition, Effect)> {
        let mut precondition = Condition::new();
        for (key, term) in self.preconditions.iter() {
            precondition.insert(key.clone(), term.resolve(binding, services, key)?);
        }
        let mut effect = Effect::new();
        for (key, term) in self.effects.iter() {
            effect.insert(key.clone(), term.resolve(binding, services, key)?);
        }
        Some((precondition, effect))
    }
}

impl fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cost: &dyn fmt::Debug = match &self.cost {
            Cost::Fixed(c) => c,
            Cost::Evaluated { floor, .. } => floor,
        };
        f.debug_struct("ActionDefinition")
            .field("id", &self.id)
            .field("params", &self.params)
            .field("preconditions", &self.preconditions)
            .field("effects", &self.effects)
            .field("cost", cost)
            .field("precedence", &self.precedence)
            .field("procedural", &self.procedural.is_some())
            .finish()
    }
}

/// An action with a concrete binding, ready for search.
#[derive(Debug, Clone)]
pub struct BoundAction {
    pub definition: Arc<ActionDefinition>,
    pub binding: Binding,
    /// Values the service effects were bound to. Empty for most actions.
    pub services: Services,
    pub precondition: Condition,
    pub effect: Effect,
}

impl BoundAction {
    pub fn id(&self) -> &ActionId {
        self.definition.id()
    }

    pub fn is_applicable(&self, state: &WorldState) -> bool {
        matches(state, &self.precondition) && self.definition.passes_procedural(state, &self.binding)
    }

    pub fn apply(&self, state: &WorldState) -> WorldState {
        state.apply(&self.effect)
    }

    pub fn cost(&self, state: &WorldState) -> f64 {
        self.definition.evaluate_cost(state, &self.binding)
    }
}
