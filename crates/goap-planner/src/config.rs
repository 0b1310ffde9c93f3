use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Search ceilings. Exceeding either is an explicit failure, never a
/// truncated plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLimits {
    pub max_expansions: usize,
    /// Maximum number of steps in a plan.
    pub max_depth: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_expansions: 4096,
            max_depth: 32,
        }
    }
}

impl SearchLimits {
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HeuristicConfig {
    /// Unmatched goal atoms weighted so the estimate never overestimates.
    #[default]
    Admissible,
    /// Unmatched goal atoms times a fixed weight. Weights above the
    /// admissible one trade optimality for fewer expansions.
    Weighted { weight: f64 },
    /// Uniform-cost search.
    Zero,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub limits: SearchLimits,
    pub heuristic: HeuristicConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Minimum interval (in driver ticks) between plan starts. Avoids thrash
    /// when inputs fluctuate.
    pub min_replan_interval_ticks: u32,

    /// Number of times a plan may be started for the same
    /// `(start, goal, library revision)` key before the driver gives up.
    /// Guards against loops where steps report success but the goal stays
    /// unmet.
    pub max_plan_starts_per_key: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoapConfig {
    pub planner: PlannerConfig,
    pub policy: PolicyConfig,
}

impl GoapConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: GoapConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.planner.limits.max_expansions == 0 {
            return Err(ConfigError::Invalid(
                "planner.limits.max_expansions must be at least 1".into(),
            ));
        }
        if let HeuristicConfig::Weighted { weight } = self.planner.heuristic {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "planner.heuristic.weight must be finite and non-negative, got {weight}"
                )));
            }
        }
        if self.policy.max_plan_starts_per_key == Some(0) {
            return Err(ConfigError::Invalid(
                "policy.max_plan_starts_per_key must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}
