use std::collections::BTreeMap;

use goap_core::{apply_effect, matches, Condition, Vocabulary, WorldState};
use goap_planner::{plan, ActionDefinition, ActionLibrary, PlanningFailure, SearchLimits};
use proptest::prelude::*;

const KEYS: [&str; 4] = ["a", "b", "c", "d"];

#[derive(Debug, Clone)]
struct ActionSpec {
    pre: Vec<(usize, bool)>,
    eff: Vec<(usize, bool)>,
    cost: u8,
}

fn action_spec() -> impl Strategy<Value = ActionSpec> {
    (
        prop::collection::vec((0..KEYS.len(), any::<bool>()), 0..3),
        prop::collection::vec((0..KEYS.len(), any::<bool>()), 1..3),
        1u8..=5,
    )
        .prop_map(|(pre, eff, cost)| ActionSpec { pre, eff, cost })
}

fn build(specs: &[ActionSpec]) -> ActionLibrary {
    let vocabulary = KEYS.iter().fold(Vocabulary::new(), |v, k| v.with_bool(*k));
    let mut library = ActionLibrary::new(vocabulary);
    for (i, spec) in specs.iter().enumerate() {
        let mut def = ActionDefinition::new(format!("act{i}")).cost(f64::from(spec.cost));
        for (k, v) in &spec.pre {
            def = def.precondition(KEYS[*k], *v);
        }
        for (k, v) in &spec.eff {
            def = def.effect(KEYS[*k], *v);
        }
        library.register(def).expect("register");
    }
    library
}

fn state(bits: [bool; 4]) -> WorldState {
    KEYS.iter().zip(bits).map(|(k, v)| (*k, v)).collect()
}

fn goal(atoms: &[(usize, bool)]) -> Condition {
    atoms.iter().map(|(k, v)| (KEYS[*k], *v)).collect()
}

/// Minimum cost to reach `goal` by exhaustive relaxation over every reachable
/// state (Bellman-Ford on a graph of at most 16 states).
fn brute_force(library: &ActionLibrary, start: &WorldState, goal: &Condition) -> Option<f64> {
    let bound = library.bind(start, goal, &goap_planner::NoBindings);
    let mut dist: BTreeMap<WorldState, f64> = BTreeMap::new();
    dist.insert(start.clone(), 0.0);
    for _ in 0..16 {
        let snapshot: Vec<(WorldState, f64)> = dist.iter().map(|(s, d)| (s.clone(), *d)).collect();
        for (s, d) in snapshot {
            for action in &bound {
                if !matches(&s, &action.precondition) {
                    continue;
                }
                let next = apply_effect(&s, &action.effect);
                let cost = d + action.definition.cost_floor();
                let entry = dist.entry(next).or_insert(f64::INFINITY);
                if cost < *entry {
                    *entry = cost;
                }
            }
        }
    }
    dist.iter()
        .filter(|(s, _)| matches(s, goal))
        .map(|(_, d)| *d)
        .min_by(f64::total_cmp)
}

proptest! {
    #[test]
    fn plans_are_optimal_and_valid(
        specs in prop::collection::vec(action_spec(), 1..6),
        start_bits in prop::array::uniform4(any::<bool>()),
        goal_atoms in prop::collection::vec((0..KEYS.len(), any::<bool>()), 1..3),
    ) {
        let library = build(&specs);
        let start = state(start_bits);
        let goal = goal(&goal_atoms);

        let expected = brute_force(&library, &start, &goal);
        match plan(&start, &goal, &library, SearchLimits::default()) {
            Ok(found) => {
                let best = expected.expect("planner found a plan the brute force missed");
                prop_assert!((found.cost() - best).abs() < 1e-9, "cost {} vs optimum {}", found.cost(), best);

                let mut current = start.clone();
                for step in found.steps() {
                    prop_assert!(matches(&current, &step.precondition));
                    current = apply_effect(&current, &step.effect);
                    prop_assert_eq!(&current, &step.expected);
                }
                prop_assert!(matches(&current, &goal));
            }
            Err(failure) => {
                prop_assert_eq!(failure, PlanningFailure::Unreachable);
                prop_assert!(expected.is_none());
            }
        }
    }

    #[test]
    fn planning_is_deterministic(
        specs in prop::collection::vec(action_spec(), 1..6),
        start_bits in prop::array::uniform4(any::<bool>()),
        goal_atoms in prop::collection::vec((0..KEYS.len(), any::<bool>()), 1..3),
    ) {
        let library = build(&specs);
        let start = state(start_bits);
        let goal = goal(&goal_atoms);

        let first = plan(&start, &goal, &library, SearchLimits::default());
        let second = plan(&start, &goal, &library, SearchLimits::default());
        prop_assert_eq!(first, second);
    }
}
