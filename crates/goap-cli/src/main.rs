//! goap CLI - plan, validate and simulate GOAP scenarios.
//!
//! - `goap plan` - search for a minimal-cost plan
//! - `goap check` - report authoring errors in a scenario
//! - `goap simulate` - drive a replanning loop against a toy world

mod scenario;
mod simulate;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use goap::core::Plan;
use goap::planner::{GoapConfig, PlanRequest, Planner};
use goap::trace::TracingSink;

use scenario::Scenario;

#[derive(Parser)]
#[command(name = "goap")]
#[command(about = "Goal-oriented action planning scenarios", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a scenario and print the result
    Plan {
        scenario: PathBuf,

        /// Planner/policy configuration (YAML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the expansion limit
        #[arg(long)]
        max_expansions: Option<usize>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Register every action and report authoring errors
    Check { scenario: PathBuf },

    /// Drive a replanning loop against a simulated world
    Simulate {
        scenario: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Maximum number of ticks to simulate
        #[arg(long, default_value_t = 32)]
        ticks: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Plan {
            scenario,
            config,
            max_expansions,
            json,
        } => plan_scenario(&scenario, config.as_deref(), max_expansions, json),
        Commands::Check { scenario } => check_scenario(&scenario),
        Commands::Simulate {
            scenario,
            config,
            ticks,
        } => simulate_scenario(&scenario, config.as_deref(), ticks),
    }
}

fn load_config(path: Option<&Path>) -> Result<GoapConfig> {
    match path {
        Some(path) => GoapConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(GoapConfig::default()),
    }
}

fn load_library(scenario: &Scenario) -> Result<goap::planner::ActionLibrary> {
    let (library, errors) = scenario.library();
    if let Some(first) = errors.first() {
        bail!(
            "{} has {} invalid action(s); first: {first}",
            scenario.display_name(),
            errors.len()
        );
    }
    Ok(library)
}

#[derive(Serialize)]
struct PlanReport {
    scenario: String,
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cost: Option<f64>,
    steps: Vec<StepReport>,
}

#[derive(Serialize)]
struct StepReport {
    action: String,
    binding: String,
    cost: f64,
    expected: String,
}

impl PlanReport {
    fn from_plan(scenario: &str, plan: &Plan) -> Self {
        Self {
            scenario: scenario.to_owned(),
            found: true,
            failure: None,
            cost: Some(plan.cost()),
            steps: plan
                .steps()
                .iter()
                .map(|s| StepReport {
                    action: s.action.to_string(),
                    binding: s.binding.to_string(),
                    cost: s.cost,
                    expected: s.expected.to_string(),
                })
                .collect(),
        }
    }
}

fn plan_scenario(path: &Path, config: Option<&Path>, max_expansions: Option<usize>, json: bool) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let mut config = load_config(config)?;
    if let Some(max) = max_expansions {
        config.planner.limits.max_expansions = max;
    }
    config.validate()?;
    let library = load_library(&scenario)?;
    let bindings = scenario.binding_provider();

    tracing::info!(scenario = scenario.display_name(), actions = library.len(), "Planning");

    let mut sink = TracingSink;
    let result = Planner::new(config.planner).plan(
        &library,
        PlanRequest::new(&scenario.start, &scenario.goal)
            .bindings(&bindings)
            .trace(&mut sink),
    );

    match result {
        Ok(plan) => {
            if json {
                let report = PlanReport::from_plan(scenario.display_name(), &plan);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_plan(&plan);
            }
            Ok(())
        }
        Err(failure) => {
            if json {
                let report = PlanReport {
                    scenario: scenario.display_name().to_owned(),
                    found: false,
                    failure: Some(failure.reason().to_string()),
                    cost: None,
                    steps: Vec::new(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            bail!("planning failed ({}): {failure}", failure.reason())
        }
    }
}

fn print_plan(plan: &Plan) {
    if plan.is_empty() {
        println!("Goal already satisfied.");
        return;
    }
    println!("Plan ({} steps, cost {}):", plan.len(), plan.cost());
    for (i, step) in plan.steps().iter().enumerate() {
        println!(
            "  {:>2}. {}{}  [cost {}]  -> {}",
            i + 1,
            step.action,
            step.binding,
            step.cost,
            step.expected
        );
    }
}

fn check_scenario(path: &Path) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let (library, errors) = scenario.library();

    let mut problems = errors.len();
    for err in &errors {
        println!("error: {err}");
    }
    if let Err(err) = scenario.vocabulary.check_state(&scenario.start) {
        println!("error: start state: {err}");
        problems += 1;
    }
    if let Err(err) = scenario.vocabulary.check_condition(&scenario.goal) {
        println!("error: goal: {err}");
        problems += 1;
    }
    for action in scenario.bindings.keys() {
        if library.get(action).is_none() {
            println!("warning: bindings for unknown action `{action}`");
        }
    }

    if problems > 0 {
        bail!("{}: {problems} problem(s) found", scenario.display_name());
    }
    println!(
        "{}: {} action(s) OK (library revision {})",
        scenario.display_name(),
        library.len(),
        library.revision()
    );
    Ok(())
}

fn simulate_scenario(path: &Path, config: Option<&Path>, ticks: u64) -> Result<()> {
    let scenario = Scenario::load(path)?;
    let config = load_config(config)?;
    let library = load_library(&scenario)?;

    let sim = simulate::run(&scenario, &library, &config, ticks);
    for line in &sim.log {
        println!("{line}");
    }
    println!();
    println!("Trace ({} events):", sim.trace.len());
    for event in &sim.trace.events {
        println!(
            "  [{:>3}] {:<22} a={:<3} b={:<3} {}",
            event.tick,
            event.tag,
            event.a,
            event.b,
            event.label.as_deref().unwrap_or("")
        );
    }
    println!("Final state: {}", sim.world);

    if let Some(failure) = sim.failure {
        bail!("simulation failed: {failure}");
    }
    if !sim.reached {
        bail!("goal not reached within {} ticks", sim.ticks);
    }
    Ok(())
}
