use goap_core::{ActionId, AtomKey, Binding, Condition, Vocabulary, VocabularyError, WorldState};
use goap_planner::{
    ActionDefinition, ActionLibrary, BindingContext, BindingProvider, LibraryError, NoBindings,
    ProviderChain, SharedLibrary, StaticBindings, Term,
};

fn vocabulary() -> Vocabulary {
    Vocabulary::new()
        .with_bool("inCover")
        .with_bool("hasWeapon")
        .with_symbols("coverPoint", ["north", "south", "west"])
}

#[test]
fn register_bumps_revision_and_keeps_order() {
    let mut library = ActionLibrary::new(vocabulary());
    assert_eq!(library.revision(), 0);
    library
        .register(ActionDefinition::new("TakeCover").effect("inCover", true))
        .expect("register");
    library
        .register(ActionDefinition::new("PickUpWeapon").effect("hasWeapon", true))
        .expect("register");

    assert_eq!(library.revision(), 2);
    assert_eq!(library.len(), 2);
    let order: Vec<&str> = library.iter().map(|a| a.id().as_str()).collect();
    assert_eq!(order, vec!["TakeCover", "PickUpWeapon"]);

    let removed = library.deregister("TakeCover").expect("deregister");
    assert_eq!(removed.id(), &ActionId::from("TakeCover"));
    assert_eq!(library.revision(), 3);
    assert!(library.get("TakeCover").is_none());
    assert_eq!(
        library.deregister("TakeCover").expect_err("already gone"),
        LibraryError::UnknownAction {
            action: ActionId::from("TakeCover")
        }
    );
}

#[test]
fn authoring_errors_are_rejected_at_registration() {
    let mut library = ActionLibrary::new(vocabulary());
    library
        .register(ActionDefinition::new("TakeCover").effect("inCover", true))
        .expect("register");

    assert!(matches!(
        library.register(ActionDefinition::new("TakeCover").effect("inCover", true)),
        Err(LibraryError::DuplicateAction { .. })
    ));

    assert_eq!(
        library.register(ActionDefinition::new("Fly").effect("airborne", true)),
        Err(LibraryError::Vocabulary {
            action: ActionId::from("Fly"),
            source: VocabularyError::UnknownKey {
                key: AtomKey::from("airborne")
            },
        })
    );

    assert!(matches!(
        library.register(ActionDefinition::new("Hide").precondition("inCover", 1)),
        Err(LibraryError::Vocabulary {
            source: VocabularyError::OutOfDomain { .. },
            ..
        })
    ));

    assert_eq!(
        library.register(ActionDefinition::new("Move").effect_param("coverPoint", "point")),
        Err(LibraryError::UndeclaredParam {
            action: ActionId::from("Move"),
            param: "point".into()
        })
    );

    assert_eq!(
        library.register(ActionDefinition::new("Cheat").precondition("inCover", Term::Service)),
        Err(LibraryError::ServiceInPrecondition {
            action: ActionId::from("Cheat"),
            key: AtomKey::from("inCover")
        })
    );

    assert_eq!(
        library.register(
            ActionDefinition::new("Echo")
                .precondition_from_service("inCover", "hasWeapon")
                .effect("hasWeapon", true)
        ),
        Err(LibraryError::UnknownService {
            action: ActionId::from("Echo"),
            key: AtomKey::from("inCover"),
            service: AtomKey::from("hasWeapon")
        })
    );

    for bad in [-1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            library.register(ActionDefinition::new("Bad").cost(bad).effect("inCover", true)),
            Err(LibraryError::InvalidCost { .. })
        ));
    }
    assert!(matches!(
        library.register(
            ActionDefinition::new("BadFloor")
                .cost_fn_with_floor(-0.5, |_, _| 1.0)
                .effect("inCover", true)
        ),
        Err(LibraryError::InvalidCost { .. })
    ));

    assert_eq!(library.len(), 1);
    assert_eq!(library.revision(), 1);
}

#[test]
fn errors_render_the_offending_action() {
    let mut library = ActionLibrary::new(vocabulary());
    let err = library
        .register(ActionDefinition::new("Fly").effect("airborne", true))
        .expect_err("unknown key");
    assert!(err.to_string().contains("Fly"));
}

struct CoverSystem;

impl BindingProvider for CoverSystem {
    fn candidates_for(&self, action: &ActionId, context: &BindingContext<'_>) -> Vec<Binding> {
        if action != "MoveToCover" {
            return Vec::new();
        }
        // Only offer cover when not already in cover.
        if context.snapshot.get("inCover") == Some(&true.into()) {
            return Vec::new();
        }
        vec![
            Binding::none().with("point", "north"),
            Binding::none().with("point", "south"),
        ]
    }
}

#[test]
fn provider_chain_concatenates_in_provider_order() {
    let mut library = ActionLibrary::new(vocabulary());
    library
        .register(
            ActionDefinition::new("MoveToCover")
                .param("point")
                .effect_param("coverPoint", "point")
                .effect("inCover", true),
        )
        .expect("register");

    let chain = ProviderChain::new().with(CoverSystem).with(
        StaticBindings::new().with("MoveToCover", [Binding::none().with("point", "west")]),
    );
    assert_eq!(chain.len(), 2);

    let state = WorldState::new().with("inCover", false);
    let bound = library.bind(&state, &Condition::new(), &chain);
    let points: Vec<String> = bound
        .iter()
        .map(|b| b.binding.get("point").map(ToString::to_string).unwrap_or_default())
        .collect();
    assert_eq!(points, vec!["north", "south", "west"]);
    assert_eq!(bound[2].effect.get("coverPoint"), Some(&"west".into()));
}

#[test]
fn applicable_actions_respect_bound_preconditions() {
    let mut library = ActionLibrary::new(vocabulary());
    library
        .register(
            ActionDefinition::new("LeaveCover")
                .param("point")
                .precondition_param("coverPoint", "point")
                .effect("inCover", false),
        )
        .expect("register");
    library
        .register(ActionDefinition::new("PickUpWeapon").effect("hasWeapon", true))
        .expect("register");

    let bindings = StaticBindings::new().with(
        "LeaveCover",
        [
            Binding::none().with("point", "north"),
            Binding::none().with("point", "south"),
        ],
    );
    let state = WorldState::new().with("coverPoint", "south");
    let applicable = library.actions_applicable_to(&state, &Condition::new(), &bindings);
    let names: Vec<String> = applicable
        .iter()
        .map(|b| format!("{}{}", b.id(), b.binding))
        .collect();
    assert_eq!(names, vec!["LeaveCover(point=south)", "PickUpWeapon"]);

    assert_eq!(
        library
            .actions_applicable_to(&state, &Condition::new(), &NoBindings)
            .len(),
        1
    );
}

#[test]
fn shared_library_configure_is_exclusive_and_visible_to_readers() {
    let shared = SharedLibrary::new(ActionLibrary::new(vocabulary()));
    assert_eq!(shared.revision(), 0);

    let result = shared.configure(|lib| lib.register(ActionDefinition::new("TakeCover").effect("inCover", true)));
    assert!(result.is_ok());

    let reader = shared.clone();
    assert_eq!(reader.revision(), 1);
    assert!(reader.read().get("TakeCover").is_some());
}
