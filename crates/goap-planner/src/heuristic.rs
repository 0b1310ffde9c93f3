use goap_core::{Condition, WorldState};

use crate::action::BoundAction;
use crate::config::HeuristicConfig;

/// Estimate of remaining cost: `weight * unmatched goal atoms`.
///
/// With the admissible weight the estimate never exceeds the true remaining
/// cost: each step fixes at most `k` unmatched atoms and costs at least the
/// smallest cost floor, so `u` unmatched atoms need at least `u * floor / k`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heuristic {
    weight: f64,
}

impl Heuristic {
    pub const ZERO: Heuristic = Heuristic { weight: 0.0 };

    pub fn weighted(weight: f64) -> Self {
        Self { weight }
    }

    pub fn admissible(actions: &[BoundAction], goal: &Condition) -> Self {
        let min_floor = actions
            .iter()
            .map(|a| a.definition.cost_floor())
            .min_by(f64::total_cmp);
        let max_fixed = actions
            .iter()
            .map(|a| goal_atoms_set(a, goal))
            .max()
            .unwrap_or(0);

        match min_floor {
            Some(floor) if max_fixed > 0 => Self::weighted(floor / max_fixed as f64),
            _ => Self::ZERO,
        }
    }

    pub fn from_config(config: &HeuristicConfig, actions: &[BoundAction], goal: &Condition) -> Self {
        match *config {
            HeuristicConfig::Admissible => Self::admissible(actions, goal),
            HeuristicConfig::Weighted { weight } => Self::weighted(weight),
            HeuristicConfig::Zero => Self::ZERO,
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn estimate(&self, state: &WorldState, goal: &Condition) -> f64 {
        if self.weight == 0.0 {
            return 0.0;
        }
        self.weight * state.unmatched(goal) as f64
    }
}

fn goal_atoms_set(action: &BoundAction, goal: &Condition) -> usize {
    action
        .effect
        .iter()
        .filter(|(key, value)| goal.get(key.as_str()) == Some(*value))
        .count()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use goap_core::Binding;

    use super::*;
    use crate::action::{ActionDefinition, Services};

    fn bound(definition: ActionDefinition) -> BoundAction {
        let (precondition, effect) = definition
            .bind(&Binding::none(), &Services::new())
            .expect("no params");
        BoundAction {
            definition: Arc::new(definition),
            binding: Binding::none(),
            services: Services::new(),
            precondition,
            effect,
        }
    }

    #[test]
    fn admissible_weight_divides_cheapest_floor_by_widest_effect() {
        let goal = Condition::new().with("a", true).with("b", true).with("c", true);
        let actions = vec![
            bound(ActionDefinition::new("both").cost(3.0).effect("a", true).effect("b", true)),
            bound(ActionDefinition::new("one").cost(2.0).effect("c", true)),
        ];
        let h = Heuristic::admissible(&actions, &goal);
        assert_eq!(h.weight(), 1.0);

        let state = WorldState::new().with("a", true);
        assert_eq!(h.estimate(&state, &goal), 2.0);
    }

    #[test]
    fn weight_is_zero_when_no_action_touches_the_goal() {
        let goal = Condition::new().with("a", true);
        let actions = vec![bound(ActionDefinition::new("other").cost(5.0).effect("b", true))];
        assert_eq!(Heuristic::admissible(&actions, &goal), Heuristic::ZERO);
        assert_eq!(Heuristic::admissible(&[], &goal), Heuristic::ZERO);
    }

    #[test]
    fn effect_values_that_disagree_with_goal_do_not_count() {
        let goal = Condition::new().with("a", true);
        let actions = vec![bound(ActionDefinition::new("wrong").cost(1.0).effect("a", false))];
        assert_eq!(Heuristic::admissible(&actions, &goal).weight(), 0.0);
    }
}
