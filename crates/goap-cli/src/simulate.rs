//! Toy execution loop for `goap simulate`: every step succeeds one tick after
//! it starts and writes its effects into the simulated world.

use goap::core::{Effect, WorldState};
use goap::planner::{
    ActionLibrary, DriveFailure, DriveStatus, GoapConfig, PlanDriver, Planner, StepStatus,
};
use goap::trace::{TraceLog, TracingSink};
use tracing::info;

use crate::scenario::Scenario;

#[derive(Debug)]
pub struct Simulation {
    pub reached: bool,
    pub ticks: u64,
    pub world: WorldState,
    pub plan_starts: u64,
    pub log: Vec<String>,
    pub trace: TraceLog,
    pub failure: Option<DriveFailure>,
}

pub fn run(scenario: &Scenario, library: &ActionLibrary, config: &GoapConfig, max_ticks: u64) -> Simulation {
    let bindings = scenario.binding_provider();
    let mut driver = PlanDriver::new(Planner::new(config.planner), scenario.goal.clone())
        .with_config(config.policy);
    let mut sink = (TraceLog::new(), TracingSink);

    let mut world = scenario.start.clone();
    let mut running: Option<Effect> = None;
    let mut log = Vec::new();
    let mut reached = false;
    let mut failure = None;
    let mut ticks = 0;

    for tick in 0..max_ticks {
        ticks = tick + 1;
        let mut status = StepStatus::Pending;
        if let Some(effect) = running.take() {
            world = world.apply(&effect);
            status = StepStatus::Succeeded;
        }
        for disturbance in scenario.disturbances_at(tick) {
            for (key, value) in disturbance.set.iter() {
                world.insert(key.clone(), value.clone());
            }
            info!(tick, atoms = %disturbance.set, "disturbance");
            log.push(format!("tick {tick}: disturbance {}", disturbance.set));
        }

        match driver.tick(tick, &world, status, library, &bindings, &mut sink) {
            DriveStatus::Done => {
                log.push(format!("tick {tick}: goal reached"));
                reached = true;
                break;
            }
            DriveStatus::Execute {
                generation,
                step,
                action,
                binding,
            } => {
                log.push(format!("tick {tick}: execute {action}{binding} (plan {generation}, step {step})"));
                running = driver
                    .current_plan()
                    .and_then(|plan| plan.step(step))
                    .map(|s| s.effect.clone());
            }
            DriveStatus::Waiting => log.push(format!("tick {tick}: waiting")),
            DriveStatus::Failed(err) => {
                log.push(format!("tick {tick}: failed: {err}"));
                failure = Some(err);
                break;
            }
        }
    }

    Simulation {
        reached,
        ticks,
        world,
        plan_starts: driver.plan_starts(),
        log,
        trace: sink.0,
        failure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambush_recovers_from_being_flushed_out_of_cover() {
        let scenario = Scenario::from_yaml_str(include_str!("../scenarios/ambush.yaml")).expect("parse");
        let (library, errors) = scenario.library();
        assert!(errors.is_empty());

        let sim = run(&scenario, &library, &GoapConfig::default(), 32);

        assert!(sim.reached, "{:#?}", sim.log);
        assert!(sim.failure.is_none());
        assert_eq!(sim.world.get("enemyDead"), Some(&true.into()));
        assert_eq!(sim.plan_starts, 2);
        assert_eq!(sim.trace.count("goap.replan"), 1);
        assert!(sim.log.iter().any(|line| line.contains("disturbance")));
    }

    #[test]
    fn unreachable_goal_fails_the_simulation() {
        let yaml = r#"
vocabulary:
  inCover: {type: bool}
  enemyDead: {type: bool}
goal:
  enemyDead: true
actions:
  - id: TakeCover
    effects:
      inCover: true
"#;
        let scenario = Scenario::from_yaml_str(yaml).expect("parse");
        let (library, _) = scenario.library();
        let sim = run(&scenario, &library, &GoapConfig::default(), 8);

        assert!(!sim.reached);
        assert_eq!(sim.ticks, 1);
        assert!(matches!(sim.failure, Some(DriveFailure::Planning(_))));
    }
}
