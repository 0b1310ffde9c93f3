//! Binding providers: the collaborator seam that supplies concrete parameter
//! values (cover points, targets, weapons) before a search starts.

use std::collections::BTreeMap;
use std::sync::Arc;

use goap_core::{ActionId, Binding, Condition, WorldState};

/// Read-only context handed to providers for one planning call.
#[derive(Debug, Clone, Copy)]
pub struct BindingContext<'a> {
    pub snapshot: &'a WorldState,
    pub goal: &'a Condition,
}

/// Enumerates binding candidates for parameterised actions.
///
/// Implementations must return candidates in a deterministic order for a
/// fixed context; the planner uses that order to break cost ties.
pub trait BindingProvider {
    fn candidates_for(&self, action: &ActionId, context: &BindingContext<'_>) -> Vec<Binding>;
}

impl<P: BindingProvider + ?Sized> BindingProvider for &P {
    fn candidates_for(&self, action: &ActionId, context: &BindingContext<'_>) -> Vec<Binding> {
        (**self).candidates_for(action, context)
    }
}

impl<P: BindingProvider + ?Sized> BindingProvider for Box<P> {
    fn candidates_for(&self, action: &ActionId, context: &BindingContext<'_>) -> Vec<Binding> {
        (**self).candidates_for(action, context)
    }
}

impl<P: BindingProvider + ?Sized> BindingProvider for Arc<P> {
    fn candidates_for(&self, action: &ActionId, context: &BindingContext<'_>) -> Vec<Binding> {
        (**self).candidates_for(action, context)
    }
}

/// Provider that never offers a binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBindings;

impl BindingProvider for NoBindings {
    fn candidates_for(&self, _action: &ActionId, _context: &BindingContext<'_>) -> Vec<Binding> {
        Vec::new()
    }
}

/// Fixed candidate table keyed by action id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StaticBindings {
    table: BTreeMap<ActionId, Vec<Binding>>,
}

impl StaticBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, action: impl Into<ActionId>, bindings: impl IntoIterator<Item = Binding>) -> Self {
        self.table
            .entry(action.into())
            .or_default()
            .extend(bindings);
        self
    }

    pub fn push(&mut self, action: impl Into<ActionId>, binding: Binding) {
        self.table.entry(action.into()).or_default().push(binding);
    }

    pub fn len(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.table.values().all(Vec::is_empty)
    }
}

impl BindingProvider for StaticBindings {
    fn candidates_for(&self, action: &ActionId, _context: &BindingContext<'_>) -> Vec<Binding> {
        self.table.get(action).cloned().unwrap_or_default()
    }
}

/// Concatenates the candidates of several providers, in provider order.
#[derive(Default)]
pub struct ProviderChain {
    providers: Vec<Box<dyn BindingProvider + Send + Sync>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: impl BindingProvider + Send + Sync + 'static) -> Self {
        self.push(provider);
        self
    }

    pub fn push(&mut self, provider: impl BindingProvider + Send + Sync + 'static) {
        self.providers.push(Box::new(provider));
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl BindingProvider for ProviderChain {
    fn candidates_for(&self, action: &ActionId, context: &BindingContext<'_>) -> Vec<Binding> {
        self.providers
            .iter()
            .flat_map(|p| p.candidates_for(action, context))
            .collect()
    }
}

impl core::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProviderChain")
            .field("providers", &self.providers.len())
            .finish()
    }
}
