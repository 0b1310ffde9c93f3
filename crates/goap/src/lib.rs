//! Umbrella crate that re-exports the `goap-*` building blocks.
//!
//! Depend on this crate for the full planner, or on the individual crates to
//! keep the dependency graph small.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

#[cfg(feature = "core")]
#[cfg_attr(docsrs, doc(cfg(feature = "core")))]
pub use goap_core as core;

#[cfg(feature = "trace")]
#[cfg_attr(docsrs, doc(cfg(feature = "trace")))]
pub use goap_trace as trace;

#[cfg(feature = "planner")]
#[cfg_attr(docsrs, doc(cfg(feature = "planner")))]
pub use goap_planner as planner;

/// The types most callers need to define actions, plan and execute.
#[cfg(feature = "planner")]
#[cfg_attr(docsrs, doc(cfg(feature = "planner")))]
pub mod prelude {
    pub use goap_core::{
        ActionId, AgentId, Binding, CancellationToken, Condition, Effect, Plan, PlanStep, Vocabulary,
        WorldState,
    };
    pub use goap_planner::{
        ActionDefinition, ActionLibrary, BindingProvider, DriveStatus, GoapConfig, Goal,
        GoalDirector, PlanBoard, PlanDriver, PlanMonitor, PlanRequest, Planner, PlanningFailure,
        SearchLimits, SharedLibrary, StepSignal, StepStatus,
    };
    pub use goap_trace::{NullTraceSink, TraceLog, TraceSink};
}
