use core::borrow::Borrow;
use core::fmt;
use std::borrow::Cow;
use std::collections::btree_map;
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::AtomValue;

/// Stable identifier of an action definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct ActionId(Cow<'static, str>);

impl ActionId {
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

impl Borrow<str> for ActionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ActionId {
    fn from(value: &'static str) -> Self {
        Self::from_static(value)
    }
}

impl From<String> for ActionId {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

impl PartialEq<str> for ActionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ActionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Concrete parameter assignment for one action, e.g. `{point: north}`.
///
/// Bindings come from collaborator systems (cover, navigation, weapons) before
/// planning starts. The empty binding is used for actions without parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Binding {
    params: BTreeMap<Cow<'static, str>, AtomValue>,
}

impl Binding {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, param: impl Into<Cow<'static, str>>, value: impl Into<AtomValue>) -> Self {
        self.params.insert(param.into(), value.into());
        self
    }

    pub fn get(&self, param: &str) -> Option<&AtomValue> {
        self.params.get(param)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, Cow<'static, str>, AtomValue> {
        self.params.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Binding
where
    K: Into<Cow<'static, str>>,
    V: Into<AtomValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.params.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, (param, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}={value}")?;
        }
        f.write_str(")")
    }
}
