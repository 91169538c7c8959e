use crate::error::ConfigError;
use crate::grounding::Grounder;
use crate::policy_search::{HeuristicName, PlanningContext, PolicySearchConfig, TaskPlanningHeuristic};
use crate::search::{run_policy_guided_astar, BestFirstOptions, PolicyGuidedOptions, SearchBudget};
use crate::structs::{Domain, GroundOperator, LiftedDecisionList, State};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// A sequence of states and the operators between them. There is one more
/// state than there are operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trajectory {
    states: Vec<State>,
    operators: Vec<GroundOperator>,
}

impl Trajectory {
    pub fn new(states: Vec<State>, operators: Vec<GroundOperator>) -> Self {
        debug_assert_eq!(states.len(), operators.len() + 1);
        Self { states, operators }
    }

    /// Replays demonstration steps, each `(operator object ...)`, from the
    /// initial state of the task.
    pub fn from_demo(
        domain: &Domain,
        context: &PlanningContext,
        task_index: usize,
        steps: &[String],
    ) -> Result<Self, ConfigError> {
        let invalid = |step: usize, reason: String| ConfigError::InvalidDemo {
            task: task_index,
            step,
            reason,
        };
        let mut state = context.initial_state().clone();
        let mut states = vec![state.clone()];
        let mut operators = vec![];
        for (i, text) in steps.iter().enumerate() {
            let parsed = context
                .task()
                .parse_plan(domain, text)
                .map_err(|e| invalid(i, e.to_string()))?;
            let [operator] = parsed[..] else {
                return Err(invalid(
                    i,
                    format!("expected one action, found {}", parsed.len()),
                ));
            };
            if !context.is_applicable(&state, operator) {
                return Err(invalid(i, format!("{} is not applicable", operator)));
            }
            state = context.successor(&state, operator);
            states.push(state.clone());
            operators.push(operator);
        }
        Ok(Self::new(states, operators))
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn operators(&self) -> &[GroundOperator] {
        &self.operators
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Pairs of a state and the operator taken in it.
    pub fn steps(&self) -> impl Iterator<Item = (&State, GroundOperator)> + '_ {
        self.states.iter().zip(self.operators.iter().copied())
    }
}

/// Where the reference trajectories that a policy is compared against come
/// from.
#[derive(Debug)]
pub enum TrajectoryGenerator {
    /// Plans from a task planner. They do not depend on the policy, so
    /// each task is planned for once.
    StaticPlanning {
        heuristic: TaskPlanningHeuristic,
        budget: SearchBudget,
        cache: Mutex<HashMap<usize, Option<Arc<Trajectory>>>>,
    },
    /// Plans from a planner that rolls out the policy being scored.
    PolicyGuided {
        heuristic: TaskPlanningHeuristic,
        budget: SearchBudget,
        max_rollout: usize,
    },
    /// One demonstration per task.
    UserSuppliedDemos { demos: Vec<Arc<Trajectory>> },
}

impl TrajectoryGenerator {
    pub fn new(config: &PolicySearchConfig, demos: Option<Vec<Trajectory>>) -> Self {
        match (config.heuristic, demos) {
            (HeuristicName::PolicyGuided, _) => TrajectoryGenerator::PolicyGuided {
                heuristic: config.task_planning_heuristic,
                budget: config.planner_budget,
                max_rollout: config.max_policy_guided_rollout,
            },
            (_, Some(demos)) => TrajectoryGenerator::UserSuppliedDemos {
                demos: demos.into_iter().map(Arc::new).collect(),
            },
            (_, None) => TrajectoryGenerator::StaticPlanning {
                heuristic: config.task_planning_heuristic,
                budget: config.planner_budget,
                cache: Mutex::new(HashMap::new()),
            },
        }
    }

    /// The reference trajectory of the `task_index`th training task, or
    /// `None` if none could be found.
    pub fn trajectory(
        &self,
        task_index: usize,
        context: &PlanningContext,
        policy: &LiftedDecisionList,
        grounder: &Grounder,
    ) -> Option<Arc<Trajectory>> {
        match self {
            TrajectoryGenerator::StaticPlanning {
                heuristic,
                budget,
                cache,
            } => {
                let cached = cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .get(&task_index)
                    .cloned();
                if let Some(trajectory) = cached {
                    return trajectory;
                }
                let trajectory = context
                    .plan(*heuristic, *budget)
                    .map(|(states, operators)| Arc::new(Trajectory::new(states, operators)));
                cache
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(task_index, trajectory.clone());
                trajectory
            }
            TrajectoryGenerator::PolicyGuided {
                heuristic,
                budget,
                max_rollout,
            } => policy_guided_plan(context, policy, grounder, *heuristic, *budget, *max_rollout)
                .map(Arc::new),
            TrajectoryGenerator::UserSuppliedDemos { demos } => demos.get(task_index).cloned(),
        }
    }
}

fn policy_guided_plan(
    context: &PlanningContext,
    policy: &LiftedDecisionList,
    grounder: &Grounder,
    heuristic: TaskPlanningHeuristic,
    budget: SearchBudget,
    max_rollout: usize,
) -> Option<Trajectory> {
    let outcome = run_policy_guided_astar(
        [context.initial_state().clone()],
        |state| context.is_goal(state),
        |state| {
            context
                .applicable(state)
                .map(|operator| (operator, 1.))
                .collect::<Vec<_>>()
        },
        |state, operator| context.successor(state, *operator),
        |state| match heuristic {
            TaskPlanningHeuristic::GoalCount => context.num_unsatisfied_goals(state) as f64,
            TaskPlanningHeuristic::Blind => 0.,
        },
        |state| grounder.query(policy, context.scope(), state, context.goal()),
        PolicyGuidedOptions {
            num_rollout_steps: max_rollout,
            rollout_step_cost: 0.,
            search: BestFirstOptions::new(budget, false),
        },
    )
    .ok()?;
    if !outcome.is_goal_reached() {
        debug!(task = %context.task().name(), "policy guided planning found no plan");
        return None;
    }
    Some(Trajectory::new(outcome.states, outcome.actions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn demos_are_replayed() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let context = PlanningContext::new(&domain, &task);
        let steps: Vec<String> = ["(pick-up b)", "(stack b c)", "(pick-up a)", "(stack a b)"]
            .iter()
            .map(|step| step.to_string())
            .collect();
        let trajectory = Trajectory::from_demo(&domain, &context, 0, &steps).unwrap();
        assert_eq!(trajectory.len(), 4);
        assert!(context.is_goal(&trajectory.states()[4]));
        assert_eq!(trajectory.operators()[1].to_string(), "(stack b c)");
    }

    #[test]
    fn invalid_demos_are_reported() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let context = PlanningContext::new(&domain, &task);
        let error = Trajectory::from_demo(
            &domain,
            &context,
            3,
            &["(pick-up a)".to_owned(), "(pick-up b)".to_owned()],
        )
        .unwrap_err();
        assert!(matches!(
            error,
            ConfigError::InvalidDemo { task: 3, step: 1, .. }
        ));
        let error =
            Trajectory::from_demo(&domain, &context, 0, &["(fly a)".to_owned()]).unwrap_err();
        assert!(matches!(error, ConfigError::InvalidDemo { step: 0, .. }));
    }

    #[test]
    fn static_plans_are_cached() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let context = PlanningContext::new(&domain, &task);
        let config = PolicySearchConfig {
            heuristic: HeuristicName::DemoPlanComparison,
            ..Default::default()
        };
        let generator = TrajectoryGenerator::new(&config, None);
        let grounder = Grounder::default();
        let policy = LiftedDecisionList::default();
        let first = generator.trajectory(0, &context, &policy, &grounder).unwrap();
        let second = generator.trajectory(0, &context, &policy, &grounder).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn policy_guided_plans_reach_the_goal() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let context = PlanningContext::new(&domain, &task);
        let generator = TrajectoryGenerator::new(&PolicySearchConfig::default(), None);
        let policy = LiftedDecisionList::new(vec![pick_up_rule(&domain)]);
        let trajectory = generator
            .trajectory(0, &context, &policy, &Grounder::default())
            .unwrap();
        assert!(context.is_goal(&trajectory.states()[trajectory.len()]));
        for (state, operator) in trajectory.steps() {
            assert!(operator.is_applicable(state));
        }
    }
}
