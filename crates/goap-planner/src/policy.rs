use goap_core::{ActionId, Binding, Condition, Plan, WorldState};
use goap_trace::{TraceEvent, TraceSink};
use tracing::{debug, warn};

use crate::binding::BindingProvider;
use crate::config::PolicyConfig;
use crate::error::PlanningFailure;
use crate::library::ActionLibrary;
use crate::monitor::{PlanMonitor, ReplanReason, StepSignal, StepStatus};
use crate::search::{PlanRequest, Planner};

/// Cache/invalidation key for plan generation.
///
/// - `start`: the live state the plan was computed from.
/// - `goal`: the goal condition.
/// - `revision`: library revision, so registration changes invalidate
///   cached plans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanKey {
    pub start: WorldState,
    pub goal: Condition,
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DriveFailure {
    #[error(transparent)]
    Planning(#[from] PlanningFailure),
    #[error("plan start budget exhausted for the current state and goal")]
    BudgetExhausted,
}

/// What the agent should do this tick.
#[derive(Debug, Clone, PartialEq)]
pub enum DriveStatus {
    /// The live state satisfies the goal.
    Done,
    /// Run (or keep running) `action` with `binding`. `generation` increases
    /// with every plan start, so executors can tell a fresh plan from the
    /// one they were running.
    Execute {
        generation: u64,
        step: usize,
        action: ActionId,
        binding: Binding,
    },
    /// A replan is pending but throttled.
    Waiting,
    Failed(DriveFailure),
}

#[derive(Debug, Clone)]
struct PlanCacheEntry {
    key: PlanKey,
    plan: Result<Plan, PlanningFailure>,
}

/// Per-agent replanning loop on top of [`PlanMonitor`].
///
/// - Plans only when needed (plan cache keyed by [`PlanKey`]).
/// - Replans when the monitor reports divergence or failure, when the goal
///   changes, or when the library revision moves.
/// - Optionally throttles plan starts to avoid restart thrash.
/// - Treats a finished plan with an unmet goal as "no progress": clears the
///   cache so the same stale plan is not repeated, and counts the restart
///   against `max_plan_starts_per_key`.
#[derive(Debug, Clone)]
pub struct PlanDriver {
    planner: Planner,
    config: PolicyConfig,
    goal: Condition,

    monitor: Option<PlanMonitor>,
    plan_revision: u64,
    generation: u64,
    goal_changed: bool,
    last_planned_tick: Option<u64>,
    cache: Option<PlanCacheEntry>,
    plan_calls: u64,
    plan_starts: u64,
    starts_for_key: u32,
    last_started_key: Option<PlanKey>,
}

impl PlanDriver {
    pub fn new(planner: Planner, goal: Condition) -> Self {
        Self {
            planner,
            config: PolicyConfig::default(),
            goal,
            monitor: None,
            plan_revision: 0,
            generation: 0,
            goal_changed: false,
            last_planned_tick: None,
            cache: None,
            plan_calls: 0,
            plan_starts: 0,
            starts_for_key: 0,
            last_started_key: None,
        }
    }

    pub fn with_config(mut self, config: PolicyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn goal(&self) -> &Condition {
        &self.goal
    }

    /// Replaces the goal; a different goal drops the running plan.
    pub fn set_goal(&mut self, goal: Condition) {
        if goal != self.goal {
            self.goal = goal;
            self.goal_changed = true;
        }
    }

    /// Drops the running plan and forces a fresh search on the next tick.
    pub fn invalidate(&mut self) {
        self.monitor = None;
        self.cache = None;
    }

    pub fn current_plan(&self) -> Option<&Plan> {
        self.monitor.as_ref().map(PlanMonitor::plan)
    }

    pub fn cursor(&self) -> Option<usize> {
        self.monitor.as_ref().map(PlanMonitor::cursor)
    }

    pub fn cached_plan(&self) -> Option<&Plan> {
        self.cache.as_ref()?.plan.as_ref().ok()
    }

    /// Number of times the planner was invoked (cache misses).
    pub fn plan_calls(&self) -> u64 {
        self.plan_calls
    }

    /// Number of times a plan was started, including cached ones.
    pub fn plan_starts(&self) -> u64 {
        self.plan_starts
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn can_replan_now(&self, tick: u64) -> bool {
        let min = self.config.min_replan_interval_ticks as u64;
        match self.last_planned_tick {
            None => true,
            Some(last) => tick.saturating_sub(last) >= min,
        }
    }

    fn would_exceed_budget(&self, key: &PlanKey) -> bool {
        let Some(max) = self.config.max_plan_starts_per_key else {
            return false;
        };
        let starts = if self.last_started_key.as_ref() == Some(key) {
            self.starts_for_key
        } else {
            0
        };
        starts.saturating_add(1) > max
    }

    fn note_plan_start(&mut self, key: PlanKey, tick: u64) {
        if self.last_started_key.as_ref() != Some(&key) {
            self.starts_for_key = 0;
        }
        self.starts_for_key = self.starts_for_key.saturating_add(1);
        self.last_started_key = Some(key);
        self.plan_starts = self.plan_starts.saturating_add(1);
        self.generation = self.generation.saturating_add(1);
        self.last_planned_tick = Some(tick);
    }

    fn get_or_plan(
        &mut self,
        key: &PlanKey,
        library: &ActionLibrary,
        bindings: &dyn BindingProvider,
        trace: &mut dyn TraceSink,
        tick: u64,
    ) -> Result<Plan, PlanningFailure> {
        if let Some(entry) = self.cache.as_ref() {
            if entry.key == *key {
                trace.emit(
                    TraceEvent::new(tick, "goap.plan.cached")
                        .with_a(entry.plan.as_ref().map_or(0, Plan::len) as u64)
                        .with_b(key.revision),
                );
                return entry.plan.clone();
            }
        }

        self.plan_calls = self.plan_calls.saturating_add(1);
        let request = PlanRequest::new(&key.start, &key.goal)
            .bindings(bindings)
            .trace(trace)
            .tick(tick);
        let plan = self.planner.plan(library, request);
        self.cache = Some(PlanCacheEntry {
            key: key.clone(),
            plan: plan.clone(),
        });
        plan
    }

    /// Follows the running plan. Returns `None` when a new plan is needed.
    fn follow(
        &mut self,
        live: &WorldState,
        status: StepStatus,
        trace: &mut dyn TraceSink,
        tick: u64,
    ) -> Option<DriveStatus> {
        let monitor = self.monitor.as_mut()?;
        let mut status = status;
        loop {
            match monitor.check(live, status, trace, tick) {
                StepSignal::Continue => {
                    let step = monitor.cursor();
                    let current = monitor.current()?;
                    return Some(DriveStatus::Execute {
                        generation: self.generation,
                        step,
                        action: current.action.clone(),
                        binding: current.binding.clone(),
                    });
                }
                StepSignal::Advance => status = StepStatus::Pending,
                StepSignal::Complete => {
                    self.monitor = None;
                    return Some(DriveStatus::Done);
                }
                StepSignal::Replan(reason) => {
                    match reason {
                        ReplanReason::GoalUnmet => {
                            // Every step reported success but the goal is still unmet.
                            self.cache = None;
                            trace.emit(
                                TraceEvent::new(tick, "goap.no_progress")
                                    .with_a(live.unmatched(&self.goal) as u64)
                                    .with_b(self.goal.len() as u64),
                            );
                        }
                        ReplanReason::StepFailed { .. } => self.cache = None,
                        ReplanReason::PreconditionDiverged { .. } => {}
                    }
                    self.monitor = None;
                    return None;
                }
            }
        }
    }

    pub fn tick(
        &mut self,
        tick: u64,
        live: &WorldState,
        status: StepStatus,
        library: &ActionLibrary,
        bindings: &dyn BindingProvider,
        trace: &mut dyn TraceSink,
    ) -> DriveStatus {
        // Goal already satisfied -> nothing to run.
        if live.satisfies(&self.goal) {
            self.monitor = None;
            self.goal_changed = false;
            trace.emit(
                TraceEvent::new(tick, "goap.done")
                    .with_a(self.generation)
                    .with_b(self.goal.len() as u64),
            );
            return DriveStatus::Done;
        }

        let revision_changed = self.monitor.is_some() && self.plan_revision != library.revision();
        if self.goal_changed || revision_changed {
            self.goal_changed = false;
            self.monitor = None;
            trace.emit(
                TraceEvent::new(tick, "goap.invalidated")
                    .with_a(library.revision())
                    .with_b(self.goal.len() as u64),
            );
        }

        if let Some(status) = self.follow(live, status, trace, tick) {
            return status;
        }

        if !self.can_replan_now(tick) {
            trace.emit(
                TraceEvent::new(tick, "goap.throttled")
                    .with_a(self.last_planned_tick.unwrap_or(0))
                    .with_b(self.config.min_replan_interval_ticks as u64),
            );
            return DriveStatus::Waiting;
        }

        let key = PlanKey {
            start: live.clone(),
            goal: self.goal.clone(),
            revision: library.revision(),
        };

        if self.would_exceed_budget(&key) {
            self.cache = None;
            warn!(goal = %self.goal, starts = self.starts_for_key, "plan start budget exhausted");
            trace.emit(
                TraceEvent::new(tick, "goap.budget_exhausted")
                    .with_a(self.starts_for_key as u64)
                    .with_b(key.revision),
            );
            return DriveStatus::Failed(DriveFailure::BudgetExhausted);
        }

        let plan = match self.get_or_plan(&key, library, bindings, trace, tick) {
            Ok(plan) => plan,
            Err(failure) => {
                debug!(reason = %failure.reason(), "no plan available");
                return DriveStatus::Failed(failure.into());
            }
        };

        let steps = plan.len() as u64;
        self.note_plan_start(key, tick);
        self.plan_revision = library.revision();
        self.monitor = Some(PlanMonitor::new(plan));
        trace.emit(
            TraceEvent::new(tick, "goap.plan.start")
                .with_a(steps)
                .with_b(self.generation),
        );

        match self.follow(live, StepStatus::Pending, trace, tick) {
            Some(status) => status,
            // A fresh plan diverged from the state it was computed from; the
            // next tick plans again.
            None => DriveStatus::Waiting,
        }
    }
}
