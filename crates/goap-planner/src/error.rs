use core::fmt;
use std::path::PathBuf;

use goap_core::{ActionId, AtomKey, VocabularyError};

/// Reason code carried by every [`PlanningFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureReason {
    Unreachable,
    ExceededLimits,
    InvalidActionCost,
    Cancelled,
}

impl FailureReason {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::Unreachable => "unreachable",
            FailureReason::ExceededLimits => "exceeded_limits",
            FailureReason::InvalidActionCost => "invalid_action_cost",
            FailureReason::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which search ceiling stopped the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitKind {
    Expansions,
    Depth,
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitKind::Expansions => f.write_str("expansion"),
            LimitKind::Depth => f.write_str("depth"),
        }
    }
}

/// Runtime outcome of a planning call that produced no plan.
///
/// Every variant is recoverable: callers may retry with a relaxed goal,
/// larger limits, or fall back to a default behaviour.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanningFailure {
    #[error("goal is unreachable from the start state")]
    Unreachable,
    #[error("search exceeded the {limit} limit after {expansions} expansions")]
    ExceededLimits { limit: LimitKind, expansions: usize },
    #[error("action `{action}` produced invalid cost {cost}")]
    InvalidActionCost { action: ActionId, cost: f64 },
    #[error("planning was cancelled")]
    Cancelled,
}

impl PlanningFailure {
    pub fn reason(&self) -> FailureReason {
        match self {
            PlanningFailure::Unreachable => FailureReason::Unreachable,
            PlanningFailure::ExceededLimits { .. } => FailureReason::ExceededLimits,
            PlanningFailure::InvalidActionCost { .. } => FailureReason::InvalidActionCost,
            PlanningFailure::Cancelled => FailureReason::Cancelled,
        }
    }
}

/// Authoring error detected when an action is registered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LibraryError {
    #[error("action `{action}` is already registered")]
    DuplicateAction { action: ActionId },
    #[error("action `{action}` is not registered")]
    UnknownAction { action: ActionId },
    #[error("action `{action}`: {source}")]
    Vocabulary {
        action: ActionId,
        #[source]
        source: VocabularyError,
    },
    #[error("action `{action}` references undeclared parameter `{param}`")]
    UndeclaredParam { action: ActionId, param: String },
    #[error("action `{action}` declares precondition `{key}` as a service")]
    ServiceInPrecondition { action: ActionId, key: AtomKey },
    #[error("action `{action}`: `{key}` forwards `{service}`, which is not a service effect of this action")]
    UnknownService {
        action: ActionId,
        key: AtomKey,
        service: AtomKey,
    },
    #[error("action `{action}` declares invalid cost {cost}")]
    InvalidCost { action: ActionId, cost: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// One goal the director tried and why it produced no plan.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalAttempt {
    pub goal: String,
    pub reason: FailureReason,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SelectionError {
    #[error("no viable goal ({} attempted)", attempts.len())]
    NoViableGoal { attempts: Vec<GoalAttempt> },
    #[error("goal selection aborted while planning `{goal}`: {failure}")]
    Aborted { goal: String, failure: PlanningFailure },
}
