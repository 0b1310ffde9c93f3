//! Step-by-step validation of a plan against the live world.
//!
//! The monitor never fails: a stale or diverged plan is reported as a
//! [`StepSignal::Replan`] for the caller to act on.

use goap_core::{matches, AtomKey, Plan, PlanStep, WorldState};
use goap_trace::{TraceEvent, TraceSink};
use tracing::debug;

/// Execution status of the step at the cursor, as reported by the executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepStatus {
    /// Not started yet.
    Pending,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplanReason {
    /// The live state no longer satisfies the step's precondition.
    PreconditionDiverged { step: usize, atoms: Vec<AtomKey> },
    StepFailed { step: usize },
    /// Every step ran but the goal does not hold in the live state.
    GoalUnmet,
}

impl ReplanReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplanReason::PreconditionDiverged { .. } => "precondition_diverged",
            ReplanReason::StepFailed { .. } => "step_failed",
            ReplanReason::GoalUnmet => "goal_unmet",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepSignal {
    /// Keep executing (or start) the step at the cursor.
    Continue,
    /// The step at the cursor finished; move to the next one.
    Advance,
    Replan(ReplanReason),
    /// The plan is exhausted and the goal holds.
    Complete,
}

pub fn check_step(plan: &Plan, cursor: usize, live: &WorldState, status: StepStatus) -> StepSignal {
    let Some(step) = plan.step(cursor) else {
        return if matches(live, plan.goal()) {
            StepSignal::Complete
        } else {
            StepSignal::Replan(ReplanReason::GoalUnmet)
        };
    };

    match status {
        StepStatus::Failed => StepSignal::Replan(ReplanReason::StepFailed { step: cursor }),
        StepStatus::Succeeded => StepSignal::Advance,
        StepStatus::Pending | StepStatus::Running => {
            if matches(live, &step.precondition) {
                StepSignal::Continue
            } else {
                StepSignal::Replan(ReplanReason::PreconditionDiverged {
                    step: cursor,
                    atoms: live.diverged_keys(&step.precondition),
                })
            }
        }
    }
}

/// Owns one plan and the cursor into it.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanMonitor {
    plan: Plan,
    cursor: usize,
}

impl PlanMonitor {
    pub fn new(plan: Plan) -> Self {
        Self { plan, cursor: 0 }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&PlanStep> {
        self.plan.step(self.cursor)
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.plan.len()
    }

    pub fn into_plan(self) -> Plan {
        self.plan
    }

    /// Checks the step at the cursor and applies `Advance`.
    pub fn check(
        &mut self,
        live: &WorldState,
        status: StepStatus,
        trace: &mut dyn TraceSink,
        tick: u64,
    ) -> StepSignal {
        let signal = check_step(&self.plan, self.cursor, live, status);
        match &signal {
            StepSignal::Advance => {
                let finished = self.cursor;
                self.cursor += 1;
                trace.emit(
                    TraceEvent::new(tick, "goap.step.advance")
                        .with_a(finished as u64)
                        .with_b(self.plan.len() as u64)
                        .with_label(self.plan.steps()[finished].action.as_str()),
                );
            }
            StepSignal::Replan(reason) => {
                debug!(cursor = self.cursor, reason = reason.as_str(), "plan invalidated");
                trace.emit(
                    TraceEvent::new(tick, "goap.replan")
                        .with_a(self.cursor as u64)
                        .with_b(self.plan.len() as u64)
                        .with_label(reason.as_str()),
                );
            }
            StepSignal::Continue | StepSignal::Complete => {}
        }
        signal
    }
}
