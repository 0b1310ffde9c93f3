use thiserror::Error;

use crate::{AtomKey, AtomValue};

/// A fact referenced a key or value outside the agreed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabularyError {
    #[error("unknown atom key `{key}`")]
    UnknownKey { key: AtomKey },

    #[error("value `{value}` is outside the domain of `{key}`")]
    OutOfDomain { key: AtomKey, value: AtomValue },

    #[error("atom key `{key}` is already declared with a different domain")]
    ConflictingDomain { key: AtomKey },

    #[error("integer domain of `{key}` is empty ({min} > {max})")]
    EmptyRange { key: AtomKey, min: i64, max: i64 },
}
