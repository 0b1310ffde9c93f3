//! YAML scenario files: vocabulary, actions, bindings, start, goal and
//! scripted disturbances for `goap simulate`.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use goap::core::{AtomValue, Binding, Condition, Vocabulary, WorldState};
use goap::planner::{ActionDefinition, ActionLibrary, LibraryError, StaticBindings, Term};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub vocabulary: Vocabulary,
    #[serde(default)]
    pub start: WorldState,
    pub goal: Condition,
    #[serde(default)]
    pub actions: Vec<ActionSpec>,
    /// Binding candidates per action id, in provider order.
    #[serde(default)]
    pub bindings: BTreeMap<String, Vec<Binding>>,
    #[serde(default)]
    pub disturbances: Vec<Disturbance>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionSpec {
    pub id: String,
    #[serde(default = "default_cost")]
    pub cost: f64,
    /// Cost floor. Only meaningful together with `cost_param`.
    #[serde(default)]
    pub min_cost: Option<f64>,
    /// Integer binding parameter used as the cost (e.g. a path length).
    #[serde(default)]
    pub cost_param: Option<String>,
    #[serde(default)]
    pub precedence: i32,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default)]
    pub preconditions: BTreeMap<String, TermSpec>,
    #[serde(default)]
    pub effects: BTreeMap<String, TermSpec>,
}

fn default_cost() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermSource {
    Service,
}

/// A precondition or effect value: a literal, `{param: name}`,
/// `{from: service}` or `{forward: service_key}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TermSpec {
    Param { param: String },
    From { from: TermSource },
    Forward { forward: String },
    Literal(AtomValue),
}

impl From<&TermSpec> for Term {
    fn from(spec: &TermSpec) -> Self {
        match spec {
            TermSpec::Param { param } => Term::Param(param.clone().into()),
            TermSpec::From {
                from: TermSource::Service,
            } => Term::Service,
            TermSpec::Forward { forward } => Term::Forward(forward.clone().into()),
            TermSpec::Literal(value) => Term::Value(value.clone()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Disturbance {
    pub tick: u64,
    /// Atoms overwritten in the simulated world at `tick`.
    pub set: WorldState,
}

impl ActionSpec {
    pub fn to_definition(&self) -> ActionDefinition {
        let mut definition = ActionDefinition::new(self.id.clone()).precedence(self.precedence);
        for param in &self.params {
            definition = definition.param(param.clone());
        }

        definition = match &self.cost_param {
            Some(param) => {
                let param = param.clone();
                let fallback = self.cost;
                definition.cost_fn_with_floor(self.min_cost.unwrap_or(0.0), move |_, binding| {
                    binding
                        .get(&param)
                        .and_then(AtomValue::as_int)
                        .map_or(fallback, |v| v as f64)
                })
            }
            None => definition.cost(self.cost),
        };

        for (key, term) in &self.preconditions {
            definition = definition.precondition(key.clone(), Term::from(term));
        }
        for (key, term) in &self.effects {
            definition = definition.effect(key.clone(), Term::from(term));
        }
        definition
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario from {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse scenario from {}", path.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("scenario")
    }

    /// Registers every action, collecting all authoring errors instead of
    /// stopping at the first.
    pub fn library(&self) -> (ActionLibrary, Vec<LibraryError>) {
        let mut library = ActionLibrary::new(self.vocabulary.clone());
        let errors = self
            .actions
            .iter()
            .filter_map(|spec| library.register(spec.to_definition()).err())
            .collect();
        (library, errors)
    }

    pub fn binding_provider(&self) -> StaticBindings {
        self.bindings
            .iter()
            .fold(StaticBindings::new(), |provider, (action, candidates)| {
                provider.with(action.clone(), candidates.iter().cloned())
            })
    }

    /// Disturbances scheduled for `tick`, in file order.
    pub fn disturbances_at(&self, tick: u64) -> impl Iterator<Item = &Disturbance> {
        self.disturbances.iter().filter(move |d| d.tick == tick)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goap::planner::{plan, PlanRequest, Planner, SearchLimits};

    const AMBUSH: &str = include_str!("../scenarios/ambush.yaml");

    #[test]
    fn bundled_scenario_parses_and_plans() {
        let scenario = Scenario::from_yaml_str(AMBUSH).expect("parse");
        let (library, errors) = scenario.library();
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(library.len(), scenario.actions.len());

        let bindings = scenario.binding_provider();
        let plan = Planner::default()
            .plan(
                &library,
                PlanRequest::new(&scenario.start, &scenario.goal).bindings(&bindings),
            )
            .expect("plan");
        assert!(plan.expected_final().satisfies(&scenario.goal));
        assert!(!scenario.disturbances.is_empty());
    }

    #[test]
    fn term_forms_parse() {
        let yaml = r#"
vocabulary:
  inCover: {type: bool}
  ammo: {type: int, min: 0, max: 3}
  coverPoint: {type: symbols, values: [north, south]}
goal:
  inCover: true
actions:
  - id: MoveToCover
    params: [point]
    effects:
      coverPoint: {param: point}
      inCover: true
  - id: Restock
    effects:
      ammo: {from: service}
  - id: Barter
    preconditions:
      coverPoint: {forward: ammo}
    effects:
      ammo: {from: service}
"#;
        let scenario = Scenario::from_yaml_str(yaml).expect("parse");
        let effects = &scenario.actions[0].effects;
        assert_eq!(
            effects["coverPoint"],
            TermSpec::Param {
                param: "point".into()
            }
        );
        assert_eq!(effects["inCover"], TermSpec::Literal(AtomValue::Bool(true)));
        assert_eq!(
            scenario.actions[1].effects["ammo"],
            TermSpec::From {
                from: TermSource::Service
            }
        );
        assert_eq!(
            scenario.actions[2].preconditions["coverPoint"],
            TermSpec::Forward {
                forward: "ammo".into()
            }
        );
        assert_eq!(scenario.actions[1].cost, 1.0);
    }

    #[test]
    fn authoring_errors_are_collected() {
        let yaml = r#"
vocabulary:
  inCover: {type: bool}
goal:
  inCover: true
actions:
  - id: Fly
    effects:
      airborne: true
  - id: Hide
    cost: -2
    effects:
      inCover: true
  - id: TakeCover
    effects:
      inCover: true
"#;
        let scenario = Scenario::from_yaml_str(yaml).expect("parse");
        let (library, errors) = scenario.library();
        assert_eq!(errors.len(), 2);
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn cost_param_reads_binding_values() {
        let yaml = r#"
vocabulary:
  coverPoint: {type: symbols, values: [none, near, far]}
start:
  coverPoint: none
goal:
  coverPoint: far
actions:
  - id: MoveTo
    params: [point, distance]
    cost_param: distance
    min_cost: 1
    effects:
      coverPoint: {param: point}
bindings:
  MoveTo:
    - {point: near, distance: 2}
    - {point: far, distance: 7}
"#;
        let scenario = Scenario::from_yaml_str(yaml).expect("parse");
        let (library, errors) = scenario.library();
        assert!(errors.is_empty());
        let bindings = scenario.binding_provider();
        let plan = Planner::default()
            .plan(
                &library,
                PlanRequest::new(&scenario.start, &scenario.goal).bindings(&bindings),
            )
            .expect("plan");
        assert_eq!(plan.cost(), 7.0);

        // Without bindings the parameterised action is never available.
        let failure = plan_without_bindings(&scenario, &library);
        assert!(failure.is_err());
    }

    fn plan_without_bindings(
        scenario: &Scenario,
        library: &ActionLibrary,
    ) -> Result<goap::core::Plan, goap::planner::PlanningFailure> {
        plan(&scenario.start, &scenario.goal, library, SearchLimits::default())
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let yaml = "vocabulary: {}\ngoal: {}\nactoins: []\n";
        assert!(Scenario::from_yaml_str(yaml).is_err());
    }
}
