//! Cost-guided GOAP planning.
//!
//! - [`ActionLibrary`]: validated action definitions over a closed vocabulary.
//! - [`Planner`]: deterministic A* search producing a minimal-cost [`Plan`](goap_core::Plan).
//! - [`PlanMonitor`] / [`check_step`]: step validation against the live world.
//! - [`PlanDriver`]: per-agent replanning loop with caching, throttling and a
//!   no-progress budget.
//! - [`GoalDirector`]: picks the most relevant goal that can be planned.
//! - [`PlanBoard`]: last-writer-wins plan store shared between threads.

#![forbid(unsafe_code)]

mod action;
mod binding;
mod board;
mod config;
mod director;
mod error;
mod heuristic;
mod library;
mod monitor;
mod policy;
mod search;

pub use action::{ActionDefinition, BoundAction, CostFn, ProceduralCheck, Services, Term};
pub use binding::{BindingContext, BindingProvider, NoBindings, ProviderChain, StaticBindings};
pub use board::{PlanBoard, PublishedPlan};
pub use config::{GoapConfig, HeuristicConfig, PlannerConfig, PolicyConfig, SearchLimits};
pub use director::{Goal, GoalDirector, RelevanceFn, Selection};
pub use error::{
    ConfigError, FailureReason, GoalAttempt, LibraryError, LimitKind, PlanningFailure, SelectionError,
};
pub use heuristic::Heuristic;
pub use library::{ActionLibrary, SharedLibrary};
pub use monitor::{check_step, PlanMonitor, ReplanReason, StepSignal, StepStatus};
pub use policy::{DriveFailure, DriveStatus, PlanDriver, PlanKey};
pub use search::{plan, PlanRequest, Planner};
