use core::fmt;
use std::borrow::Cow;
use std::sync::Arc;

use goap_core::{CancellationToken, Condition, Plan, WorldState};
use goap_trace::{NullTraceSink, TraceSink};
use tracing::debug;

use crate::binding::BindingProvider;
use crate::error::{GoalAttempt, PlanningFailure, SelectionError};
use crate::library::ActionLibrary;
use crate::search::{PlanRequest, Planner};

pub type RelevanceFn = Arc<dyn Fn(&WorldState) -> f64 + Send + Sync>;

/// A named goal condition with a priority and an optional relevance
/// evaluator. Without an evaluator the relevance is the priority.
#[derive(Clone)]
pub struct Goal {
    name: Cow<'static, str>,
    condition: Condition,
    priority: f64,
    relevance: Option<RelevanceFn>,
}

impl Goal {
    pub fn new(name: impl Into<Cow<'static, str>>, condition: Condition) -> Self {
        Self {
            name: name.into(),
            condition,
            priority: 1.0,
            relevance: None,
        }
    }

    pub fn priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn relevance<F>(mut self, relevance: F) -> Self
    where
        F: Fn(&WorldState) -> f64 + Send + Sync + 'static,
    {
        self.relevance = Some(Arc::new(relevance));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn relevance_in(&self, state: &WorldState) -> f64 {
        match &self.relevance {
            Some(eval) => eval(state),
            None => self.priority,
        }
    }
}

impl fmt::Debug for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Goal")
            .field("name", &self.name)
            .field("condition", &self.condition)
            .field("priority", &self.priority)
            .field("relevance", &self.relevance.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index of the chosen goal in registration order.
    pub index: usize,
    pub goal: String,
    pub plan: Plan,
}

/// Picks the most relevant goal that can currently be planned for.
#[derive(Debug, Clone, Default)]
pub struct GoalDirector {
    planner: Planner,
    goals: Vec<Goal>,
}

impl GoalDirector {
    pub fn new(planner: Planner) -> Self {
        Self {
            planner,
            goals: Vec::new(),
        }
    }

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goals.push(goal);
        self
    }

    pub fn add_goal(&mut self, goal: Goal) {
        self.goals.push(goal);
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    /// Candidate goals for `state`, most relevant first. Ties keep
    /// registration order; satisfied and non-positive goals are dropped.
    pub fn rank(&self, state: &WorldState) -> Vec<(usize, f64)> {
        let mut ranked: Vec<(usize, f64)> = self
            .goals
            .iter()
            .enumerate()
            .map(|(i, g)| (i, g.relevance_in(state)))
            .filter(|(i, relevance)| *relevance > 0.0 && !state.satisfies(&self.goals[*i].condition))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
    }

    pub fn select(
        &self,
        library: &ActionLibrary,
        state: &WorldState,
        bindings: &dyn BindingProvider,
        cancel: Option<&CancellationToken>,
    ) -> Result<Selection, SelectionError> {
        self.select_traced(library, state, bindings, cancel, &mut NullTraceSink, 0)
    }

    pub fn select_traced(
        &self,
        library: &ActionLibrary,
        state: &WorldState,
        bindings: &dyn BindingProvider,
        cancel: Option<&CancellationToken>,
        trace: &mut dyn TraceSink,
        tick: u64,
    ) -> Result<Selection, SelectionError> {
        let mut attempts = Vec::new();

        for (index, relevance) in self.rank(state) {
            let goal = &self.goals[index];
            let mut request = PlanRequest::new(state, &goal.condition)
                .bindings(bindings)
                .trace(&mut *trace)
                .tick(tick);
            if let Some(token) = cancel {
                request = request.cancel(token);
            }

            match self.planner.plan(library, request) {
                Ok(plan) => {
                    debug!(goal = goal.name(), relevance, steps = plan.len(), "goal selected");
                    return Ok(Selection {
                        index,
                        goal: goal.name().to_owned(),
                        plan,
                    });
                }
                Err(failure @ (PlanningFailure::Unreachable | PlanningFailure::ExceededLimits { .. })) => {
                    debug!(goal = goal.name(), reason = %failure.reason(), "goal skipped");
                    attempts.push(GoalAttempt {
                        goal: goal.name().to_owned(),
                        reason: failure.reason(),
                    });
                }
                Err(failure) => {
                    return Err(SelectionError::Aborted {
                        goal: goal.name().to_owned(),
                        failure,
                    });
                }
            }
        }

        Err(SelectionError::NoViableGoal { attempts })
    }
}
