//! World-state snapshots and the partial states tested or applied against them.
//!
//! All three types are ordered maps, so iteration order, equality and hashing
//! are independent of insertion order. Search nodes compare states by value.

use core::fmt;
use std::collections::btree_map;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{AtomKey, AtomValue};

/// Snapshot of every fact known to an agent at one instant.
///
/// Treated as a value type: planners derive new states with [`apply_effect`]
/// rather than mutating a state shared between search branches. `insert` is
/// meant for assembling a snapshot from sensors and memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct WorldState {
    atoms: BTreeMap<AtomKey, AtomValue>,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<AtomKey>, value: impl Into<AtomValue>) -> Self {
        self.atoms.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<AtomKey>, value: impl Into<AtomValue>) -> Option<AtomValue> {
        self.atoms.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&AtomValue> {
        self.atoms.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.atoms.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, AtomKey, AtomValue> {
        self.atoms.iter()
    }

    pub fn satisfies(&self, condition: &Condition) -> bool {
        matches(self, condition)
    }

    /// Number of atoms in `condition` that this state does not satisfy.
    pub fn unmatched(&self, condition: &Condition) -> usize {
        condition
            .iter()
            .filter(|(key, value)| self.atoms.get(*key) != Some(*value))
            .count()
    }

    /// Keys of `condition` that this state does not satisfy, in key order.
    pub fn diverged_keys(&self, condition: &Condition) -> Vec<AtomKey> {
        condition
            .iter()
            .filter(|(key, value)| self.atoms.get(*key) != Some(*value))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn apply(&self, effect: &Effect) -> WorldState {
        apply_effect(self, effect)
    }
}

/// Partial world state used as a precondition or goal.
///
/// Only the keys it names are checked; a key missing from the tested state
/// never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Condition {
    atoms: BTreeMap<AtomKey, AtomValue>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<AtomKey>, value: impl Into<AtomValue>) -> Self {
        self.atoms.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<AtomKey>, value: impl Into<AtomValue>) -> Option<AtomValue> {
        self.atoms.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&AtomValue> {
        self.atoms.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.atoms.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, AtomKey, AtomValue> {
        self.atoms.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, AtomKey, AtomValue> {
        self.atoms.keys()
    }
}

/// Partial world state written by an action: keys to insert or overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Effect {
    atoms: BTreeMap<AtomKey, AtomValue>,
}

impl Effect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<AtomKey>, value: impl Into<AtomValue>) -> Self {
        self.atoms.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<AtomKey>, value: impl Into<AtomValue>) -> Option<AtomValue> {
        self.atoms.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&AtomValue> {
        self.atoms.get(key)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, AtomKey, AtomValue> {
        self.atoms.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, AtomKey, AtomValue> {
        self.atoms.keys()
    }

    /// True when applying this effect to `state` would change nothing.
    pub fn is_noop_on(&self, state: &WorldState) -> bool {
        self.atoms
            .iter()
            .all(|(key, value)| state.get(key.as_str()) == Some(value))
    }
}

/// Returns true iff every key of `condition` is present in `state` with an
/// equal value. An empty condition matches every state.
pub fn matches(state: &WorldState, condition: &Condition) -> bool {
    condition
        .atoms
        .iter()
        .all(|(key, value)| state.atoms.get(key) == Some(value))
}

/// Returns a new state equal to `state` with every key of `effect` written.
pub fn apply_effect(state: &WorldState, effect: &Effect) -> WorldState {
    let mut next = state.clone();
    for (key, value) in effect.atoms.iter() {
        next.atoms.insert(key.clone(), value.clone());
    }
    next
}

macro_rules! impl_from_iter {
    ($ty:ident) => {
        impl<K, V> FromIterator<(K, V)> for $ty
        where
            K: Into<AtomKey>,
            V: Into<AtomValue>,
        {
            fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
                Self {
                    atoms: iter
                        .into_iter()
                        .map(|(k, v)| (k.into(), v.into()))
                        .collect(),
                }
            }
        }

        impl<'a> IntoIterator for &'a $ty {
            type Item = (&'a AtomKey, &'a AtomValue);
            type IntoIter = btree_map::Iter<'a, AtomKey, AtomValue>;

            fn into_iter(self) -> Self::IntoIter {
                self.atoms.iter()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("{")?;
                for (i, (key, value)) in self.atoms.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    };
}

impl_from_iter!(WorldState);
impl_from_iter!(Condition);
impl_from_iter!(Effect);

impl From<WorldState> for Condition {
    fn from(value: WorldState) -> Self {
        Self { atoms: value.atoms }
    }
}
