use core::borrow::Borrow;
use core::fmt;
use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Symbolic identifier of a fact, e.g. `"hasWeapon"` or `"coverAvailable"`.
///
/// Keys order and hash by their text, so maps keyed by `AtomKey` can be
/// queried with a plain `&str`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct AtomKey(Cow<'static, str>);

impl AtomKey {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AtomKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for AtomKey {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for AtomKey {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl fmt::Display for AtomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Small discrete value of a fact.
///
/// Integers are bounded by the [`Vocabulary`](crate::Vocabulary) domain of
/// their key; symbols are enumerated identifiers such as `"north"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum AtomValue {
    Bool(bool),
    Int(i64),
    Symbol(Cow<'static, str>),
}

impl AtomValue {
    pub const fn symbol(name: &'static str) -> Self {
        Self::Symbol(Cow::Borrowed(name))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Self::Symbol(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for AtomValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for AtomValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for AtomValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<&'static str> for AtomValue {
    fn from(value: &'static str) -> Self {
        Self::symbol(value)
    }
}

impl From<String> for AtomValue {
    fn from(value: String) -> Self {
        Self::Symbol(Cow::Owned(value))
    }
}

impl fmt::Display for AtomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Symbol(v) => f.write_str(v),
        }
    }
}

/// A single named fact: the unit of world state.
pub type Atom = (AtomKey, AtomValue);
