//! Searching the space of lifted decision lists for a policy that solves
//! a set of training tasks.

mod config;
mod edit_operators;
mod heuristics;
mod planning;
mod trajectory;

pub use config::{
    EditOperatorName, GroundingConfig, GroundingModeName, HeuristicName, PolicySearchConfig,
    SearchMethod, TaskPlanningHeuristic,
};
pub use edit_operators::{
    AddCondition, AddRule, DeleteCondition, DeleteRule, PolicyEditOperator,
};
pub use heuristics::{PlanComparison, PolicyEvaluation, PolicyHeuristic, TrainingSet};
pub use planning::PlanningContext;
pub use trajectory::{Trajectory, TrajectoryGenerator};

use crate::error::Result;
use crate::grounding::Grounder;
use crate::search::{
    run_gbfs, run_hill_climbing, BestFirstOptions, HillClimbingOptions, SearchBudget,
};
use crate::structs::{Domain, LiftedDecisionList, Task};
use std::sync::Arc;
use tracing::info;

/// The best policy found by [`learn_policy`].
#[derive(Debug, Clone)]
pub struct LearnOutcome {
    pub policy: LiftedDecisionList,
    /// Number of policies scored during the search
    pub num_heuristic_calls: usize,
}

/// Builds the heuristic of a run. Demonstrations, if any, are checked
/// against their tasks here.
pub fn create_heuristic(
    domain: &Domain,
    problems: &[Task],
    demos: Option<&[Vec<String>]>,
    config: &PolicySearchConfig,
) -> Result<Box<dyn PolicyHeuristic>> {
    config.validate(problems.len(), demos)?;
    let contexts: Vec<PlanningContext> = problems
        .iter()
        .map(|task| PlanningContext::new(domain, task))
        .collect();
    let demos = demos
        .map(|demos| {
            demos
                .iter()
                .zip(&contexts)
                .enumerate()
                .map(|(index, (steps, context))| {
                    Trajectory::from_demo(domain, context, index, steps)
                })
                .collect::<std::result::Result<Vec<_>, _>>()
        })
        .transpose()?;
    let generator = TrajectoryGenerator::new(config, demos);
    let grounder = Grounder::new(
        config.grounding.grounding_mode(),
        config.grounding_cache_capacity,
    );
    let training = Arc::new(TrainingSet::new(contexts, grounder, config.horizon));
    Ok(config.heuristic.create(training, generator))
}

/// Searches policy space from `initial_policies` (the empty policy if
/// none are given) and returns the best policy seen.
pub fn learn_policy(
    domain: &Domain,
    problems: &[Task],
    demos: Option<&[Vec<String>]>,
    config: &PolicySearchConfig,
    initial_policies: Option<&[LiftedDecisionList]>,
) -> Result<LearnOutcome> {
    let heuristic = create_heuristic(domain, problems, demos, config)?;
    let edit_operators: Vec<Box<dyn PolicyEditOperator>> = config
        .edit_operators
        .iter()
        .map(|name| name.create(domain, config.allow_new_vars))
        .collect();
    let initial_policies = initial_policies
        .map(<[LiftedDecisionList]>::to_vec)
        .unwrap_or_else(|| vec![LiftedDecisionList::default()]);

    let get_successors = |policy: &LiftedDecisionList| {
        let mut successors = vec![];
        for operator in &edit_operators {
            for (i, child) in operator.get_successors(policy).into_iter().enumerate() {
                if child
                    .rules()
                    .iter()
                    .any(|rule| rule.parameters().len() > config.max_rule_params)
                {
                    continue;
                }
                successors.push(((operator.name(), i), child, 1.));
            }
        }
        successors
    };
    let score = |policy: &LiftedDecisionList| heuristic.score(policy);

    info!(search_method = %config.search_method, heuristic = %config.heuristic, "learning policy");
    let policy = match config.search_method {
        SearchMethod::Gbfs => {
            let budget = SearchBudget::default().with_max_expansions(config.gbfs_max_expansions);
            let outcome = run_gbfs(
                initial_policies,
                |_| false,
                get_successors,
                score,
                BestFirstOptions::new(budget, true),
            )?;
            outcome.states.last().cloned()
        }
        SearchMethod::HillClimbing => {
            let outcome = run_hill_climbing(
                initial_policies,
                |_| false,
                get_successors,
                score,
                HillClimbingOptions {
                    early_termination_threshold: Some(0.),
                    enforced_depth: config.hc_enforced_depth,
                    parallelize: config.parallelize,
                },
            )?;
            outcome.states.last().cloned()
        }
    }
    .unwrap_or_default();

    let num_heuristic_calls = heuristic.num_calls();
    info!(num_heuristic_calls, num_rules = policy.len(), "learned policy");
    Ok(LearnOutcome {
        policy,
        num_heuristic_calls,
    })
}

/// Scores each of `policies` (the empty policy if none are given) with the
/// configured heuristic.
pub fn score_policies(
    domain: &Domain,
    problems: &[Task],
    demos: Option<&[Vec<String>]>,
    config: &PolicySearchConfig,
    policies: Option<&[LiftedDecisionList]>,
) -> Result<Vec<f64>> {
    let heuristic = create_heuristic(domain, problems, demos, config)?;
    let scores = match policies {
        Some(policies) => policies.iter().map(|policy| heuristic.score(policy)).collect(),
        None => vec![heuristic.score(&LiftedDecisionList::default())],
    };
    Ok(scores)
}
