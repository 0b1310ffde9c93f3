use goap_core::{apply_effect, matches, AtomValue, Condition, Effect, WorldState};
use proptest::prelude::*;

const KEYS: [&str; 6] = ["hasWeapon", "inCover", "ammo", "stance", "alerted", "coverPoint"];

fn atom_value() -> impl Strategy<Value = AtomValue> {
    prop_oneof![
        any::<bool>().prop_map(AtomValue::Bool),
        (0i64..4).prop_map(AtomValue::Int),
        prop::sample::select(vec!["north", "south", "crouch"]).prop_map(AtomValue::symbol),
    ]
}

fn world_state() -> impl Strategy<Value = WorldState> {
    prop::collection::vec((prop::sample::select(KEYS.to_vec()), atom_value()), 0..6)
        .prop_map(|atoms| atoms.into_iter().collect())
}

fn condition() -> impl Strategy<Value = Condition> {
    prop::collection::vec((prop::sample::select(KEYS.to_vec()), atom_value()), 0..4)
        .prop_map(|atoms| atoms.into_iter().collect())
}

fn effect() -> impl Strategy<Value = Effect> {
    prop::collection::vec((prop::sample::select(KEYS.to_vec()), atom_value()), 0..4)
        .prop_map(|atoms| atoms.into_iter().collect())
}

proptest! {
    #[test]
    fn empty_condition_matches_every_state(state in world_state()) {
        prop_assert!(matches(&state, &Condition::new()));
    }

    #[test]
    fn empty_effect_is_identity(state in world_state()) {
        prop_assert_eq!(apply_effect(&state, &Effect::new()), state);
    }

    #[test]
    fn state_satisfies_itself(state in world_state()) {
        prop_assert!(matches(&state, &Condition::from(state.clone())));
    }

    #[test]
    fn applied_effect_is_satisfied(state in world_state(), effect in effect()) {
        let next = apply_effect(&state, &effect);
        let as_condition: Condition = effect.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        prop_assert!(matches(&next, &as_condition));
    }

    #[test]
    fn apply_effect_keeps_untouched_keys(state in world_state(), effect in effect()) {
        let next = apply_effect(&state, &effect);
        for (key, value) in state.iter() {
            if effect.get(key.as_str()).is_none() {
                prop_assert_eq!(next.get(key.as_str()), Some(value));
            }
        }
    }

    #[test]
    fn unmatched_is_zero_iff_matches(state in world_state(), cond in condition()) {
        prop_assert_eq!(state.unmatched(&cond) == 0, matches(&state, &cond));
    }
}

#[test]
fn matches_requires_equal_values() {
    let state = WorldState::new().with("hasWeapon", false).with("inCover", true);

    assert!(matches(&state, &Condition::new().with("inCover", true)));
    assert!(!matches(&state, &Condition::new().with("hasWeapon", true)));
    assert!(matches(
        &state,
        &Condition::new().with("inCover", true).with("hasWeapon", false)
    ));
}

#[test]
fn missing_key_never_matches() {
    let state = WorldState::new().with("inCover", true);
    assert!(!matches(&state, &Condition::new().with("coverAvailable", true)));
}

#[test]
fn apply_effect_does_not_mutate_source() {
    let start = WorldState::new().with("inCover", false);
    let next = apply_effect(&start, &Effect::new().with("inCover", true).with("ammo", 3));

    assert_eq!(start.get("inCover"), Some(&AtomValue::Bool(false)));
    assert_eq!(next.get("inCover"), Some(&AtomValue::Bool(true)));
    assert_eq!(next.get("ammo"), Some(&AtomValue::Int(3)));
    assert_eq!(start.len(), 1);
}

#[test]
fn equal_states_compare_equal_regardless_of_insertion_order() {
    let a = WorldState::new().with("a", true).with("b", 1);
    let b = WorldState::new().with("b", 1).with("a", true);
    assert_eq!(a, b);
}

#[test]
fn diverged_keys_lists_failing_atoms() {
    let state = WorldState::new().with("inCover", false).with("hasWeapon", true);
    let cond = Condition::new()
        .with("inCover", true)
        .with("hasWeapon", true)
        .with("alerted", false);

    let keys: Vec<_> = state
        .diverged_keys(&cond)
        .into_iter()
        .map(|k| k.as_str().to_string())
        .collect();
    assert_eq!(keys, vec!["alerted".to_string(), "inCover".to_string()]);
    assert_eq!(state.unmatched(&cond), 2);
}
