use crate::error::ConfigError;
use crate::grounding::{
    ConstraintMatcher, FallbackSelection, GroundingMode, DEFAULT_GROUNDING_CACHE_CAPACITY,
};
use crate::search::SearchBudget;
use serde::Deserialize;
use std::str::FromStr;
use strum_macros::{Display, EnumString};

/// Implements name lookup that reports unknown names as configuration
/// errors, and deserialisation through that lookup.
macro_rules! config_name {
    ($name:ident, $kind:literal) => {
        impl $name {
            pub fn from_name(name: &str) -> Result<Self, ConfigError> {
                <Self as FromStr>::from_str(name).map_err(|_| ConfigError::UnknownName {
                    kind: $kind,
                    name: name.to_owned(),
                })
            }
        }

        impl TryFrom<String> for $name {
            type Error = ConfigError;

            fn try_from(name: String) -> Result<Self, Self::Error> {
                Self::from_name(&name)
            }
        }
    };
}

/// How candidate policies are scored.
#[derive(
    clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Deserialize,
)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[serde(try_from = "String")]
pub enum HeuristicName {
    /// Count the training problems the policy fails to solve
    PolicyEvaluation,
    /// Compare the policy against plans found by a task planner, or
    /// against user supplied demonstrations
    DemoPlanComparison,
    /// Compare the policy against plans found by a planner guided by the
    /// policy itself
    PolicyGuided,
}
config_name!(HeuristicName, "heuristic");

/// How the space of policies is searched.
#[derive(
    clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Deserialize,
)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[serde(try_from = "String")]
pub enum SearchMethod {
    Gbfs,
    HillClimbing,
}
config_name!(SearchMethod, "search method");

/// Heuristic of the planner that produces reference plans.
#[derive(
    clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Deserialize,
)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[serde(try_from = "String")]
pub enum TaskPlanningHeuristic {
    /// Number of goal atoms not yet achieved
    GoalCount,
    /// Zero everywhere, i.e. uniform cost search
    Blind,
}
config_name!(TaskPlanningHeuristic, "task planning heuristic");

#[derive(
    clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Deserialize,
)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[serde(try_from = "String")]
pub enum EditOperatorName {
    AddRule,
    AddCondition,
    DeleteRule,
    DeleteCondition,
}
config_name!(EditOperatorName, "edit operator");

#[derive(
    clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Deserialize,
)]
#[clap(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
#[serde(try_from = "String")]
pub enum GroundingModeName {
    Exhaustive,
    ConstraintMatching,
}
config_name!(GroundingModeName, "grounding mode");

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GroundingConfig {
    pub mode: GroundingModeName,
    /// Number of bindings the constraint matcher looks for per rule
    pub max_matches: usize,
    pub fallback: FallbackSelection,
}

impl GroundingConfig {
    pub fn grounding_mode(&self) -> GroundingMode {
        match self.mode {
            GroundingModeName::Exhaustive => GroundingMode::Exhaustive,
            GroundingModeName::ConstraintMatching => GroundingMode::ConstraintMatching(
                ConstraintMatcher::new(self.max_matches, self.fallback),
            ),
        }
    }
}

impl Default for GroundingConfig {
    fn default() -> Self {
        Self {
            mode: GroundingModeName::Exhaustive,
            max_matches: 1,
            fallback: FallbackSelection::FirstCandidate,
        }
    }
}

/// Settings of a policy search run. Every field has a default, so a TOML
/// file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PolicySearchConfig {
    /// Maximum number of steps a policy is executed for, per problem
    pub horizon: usize,
    /// Policies with a rule of more parameters than this are never visited
    pub max_rule_params: usize,
    pub heuristic: HeuristicName,
    pub search_method: SearchMethod,
    pub task_planning_heuristic: TaskPlanningHeuristic,
    pub max_policy_guided_rollout: usize,
    pub gbfs_max_expansions: usize,
    pub hc_enforced_depth: usize,
    /// Whether conditions may introduce variables that are not yet
    /// parameters of the rule
    pub allow_new_vars: bool,
    /// Score the policies of one hill climbing level in parallel
    pub parallelize: bool,
    pub edit_operators: Vec<EditOperatorName>,
    pub grounding: GroundingConfig,
    pub grounding_cache_capacity: usize,
    /// Limits of each planner call made while scoring a policy
    pub planner_budget: SearchBudget,
}

impl Default for PolicySearchConfig {
    fn default() -> Self {
        Self {
            horizon: 50,
            max_rule_params: 50,
            heuristic: HeuristicName::PolicyGuided,
            search_method: SearchMethod::HillClimbing,
            task_planning_heuristic: TaskPlanningHeuristic::GoalCount,
            max_policy_guided_rollout: 50,
            gbfs_max_expansions: 100,
            hc_enforced_depth: 0,
            allow_new_vars: true,
            parallelize: false,
            edit_operators: vec![EditOperatorName::AddRule, EditOperatorName::AddCondition],
            grounding: GroundingConfig::default(),
            grounding_cache_capacity: DEFAULT_GROUNDING_CACHE_CAPACITY,
            planner_budget: SearchBudget::default().with_max_expansions(100_000),
        }
    }
}

impl PolicySearchConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Checks that the inputs of a run fit this configuration. Called before
    /// any search work is done.
    pub fn validate(
        &self,
        num_problems: usize,
        demos: Option<&[Vec<String>]>,
    ) -> Result<(), ConfigError> {
        if num_problems == 0 {
            return Err(ConfigError::NoProblems);
        }
        if let Some(demos) = demos {
            if demos.len() != num_problems {
                return Err(ConfigError::DemoCountMismatch {
                    demos: demos.len(),
                    problems: num_problems,
                });
            }
            if self.heuristic != HeuristicName::DemoPlanComparison {
                return Err(ConfigError::DemosRequirePlanComparison(
                    self.heuristic.to_string(),
                ));
            }
        }
        Ok(())
    }
}
