use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{AtomKey, AtomValue, Condition, Effect, VocabularyError, WorldState};

/// Values an atom key may take.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum AtomDomain {
    Bool,
    Int { min: i64, max: i64 },
    Symbols { values: BTreeSet<Cow<'static, str>> },
    AnySymbol,
}

impl AtomDomain {
    pub fn symbols<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        Self::Symbols {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn admits(&self, value: &AtomValue) -> bool {
        match (self, value) {
            (Self::Bool, AtomValue::Bool(_)) => true,
            (Self::Int { min, max }, AtomValue::Int(v)) => (*min..=*max).contains(v),
            (Self::Symbols { values }, AtomValue::Symbol(s)) => values.contains(s),
            (Self::AnySymbol, AtomValue::Symbol(_)) => true,
            _ => false,
        }
    }
}

/// Closed set of atom keys shared by every action and goal of a planning
/// session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Vocabulary {
    keys: BTreeMap<AtomKey, AtomDomain>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bool(self, key: impl Into<AtomKey>) -> Self {
        self.with_domain(key, AtomDomain::Bool)
    }

    pub fn with_int(self, key: impl Into<AtomKey>, min: i64, max: i64) -> Self {
        self.with_domain(key, AtomDomain::Int { min, max })
    }

    pub fn with_symbols<I, S>(self, key: impl Into<AtomKey>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        self.with_domain(key, AtomDomain::symbols(values))
    }

    /// Builder form of [`declare`](Self::declare) for vocabularies assembled
    /// in code. A rejected declaration is logged and skipped; a conflicting
    /// redeclaration keeps the first domain.
    pub fn with_domain(mut self, key: impl Into<AtomKey>, domain: AtomDomain) -> Self {
        if let Err(err) = self.declare(key, domain) {
            warn!(error = %err, "vocabulary declaration skipped");
        }
        self
    }

    pub fn declare(&mut self, key: impl Into<AtomKey>, domain: AtomDomain) -> Result<(), VocabularyError> {
        let key = key.into();
        if let AtomDomain::Int { min, max } = domain {
            if min > max {
                return Err(VocabularyError::EmptyRange { key, min, max });
            }
        }
        match self.keys.get(&key) {
            Some(existing) if *existing != domain => Err(VocabularyError::ConflictingDomain { key }),
            Some(_) => Ok(()),
            None => {
                self.keys.insert(key, domain);
                Ok(())
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn domain(&self, key: &str) -> Option<&AtomDomain> {
        self.keys.get(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &AtomKey> {
        self.keys.keys()
    }

    pub fn check(&self, key: &AtomKey, value: &AtomValue) -> Result<(), VocabularyError> {
        let domain = self
            .keys
            .get(key)
            .ok_or_else(|| VocabularyError::UnknownKey { key: key.clone() })?;
        if domain.admits(value) {
            Ok(())
        } else {
            Err(VocabularyError::OutOfDomain {
                key: key.clone(),
                value: value.clone(),
            })
        }
    }

    pub fn check_key(&self, key: &AtomKey) -> Result<(), VocabularyError> {
        if self.keys.contains_key(key) {
            Ok(())
        } else {
            Err(VocabularyError::UnknownKey { key: key.clone() })
        }
    }

    pub fn check_condition(&self, condition: &Condition) -> Result<(), VocabularyError> {
        condition.iter().try_for_each(|(k, v)| self.check(k, v))
    }

    pub fn check_effect(&self, effect: &Effect) -> Result<(), VocabularyError> {
        effect.iter().try_for_each(|(k, v)| self.check(k, v))
    }

    pub fn check_state(&self, state: &WorldState) -> Result<(), VocabularyError> {
        state.iter().try_for_each(|(k, v)| self.check(k, v))
    }

    /// First key of `condition` the vocabulary does not know, if any.
    pub fn first_unknown<'a>(&self, condition: &'a Condition) -> Option<&'a AtomKey> {
        condition.keys().find(|k| !self.keys.contains_key(*k))
    }
}
