use core::fmt;

use crate::{ActionId, Binding, Condition, Effect, WorldState};

/// One bound action of a plan together with the state the planner expects
/// after it runs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanStep {
    pub action: ActionId,
    pub binding: Binding,
    /// Precondition with every parameter substituted from `binding`.
    pub precondition: Condition,
    /// Effect with every parameter and goal reference resolved.
    pub effect: Effect,
    pub cost: f64,
    pub expected: WorldState,
}

/// Ordered, costed sequence of bound actions that turns `start` into a state
/// satisfying `goal`.
///
/// Plans are immutable once produced; execution progress is tracked outside
/// the plan by a cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    start: WorldState,
    goal: Condition,
    steps: Vec<PlanStep>,
    cost: f64,
}

impl Plan {
    pub fn new(start: WorldState, goal: Condition, steps: Vec<PlanStep>) -> Self {
        let cost = steps.iter().map(|s| s.cost).sum();
        Self {
            start,
            goal,
            steps,
            cost,
        }
    }

    /// Plan for a goal the start state already satisfies.
    pub fn empty(start: WorldState, goal: Condition) -> Self {
        Self::new(start, goal, Vec::new())
    }

    pub fn start(&self) -> &WorldState {
        &self.start
    }

    pub fn goal(&self) -> &Condition {
        &self.goal
    }

    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    pub fn step(&self, index: usize) -> Option<&PlanStep> {
        self.steps.get(index)
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn action_ids(&self) -> Vec<&ActionId> {
        self.steps.iter().map(|s| &s.action).collect()
    }

    /// State the planner predicts once every step has run.
    pub fn expected_final(&self) -> &WorldState {
        self.steps.last().map(|s| &s.expected).unwrap_or(&self.start)
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return write!(f, "<empty> (cost {})", self.cost);
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}{}", step.action, step.binding)?;
        }
        write!(f, " (cost {})", self.cost)
    }
}
