use crate::grounding::Grounder;
use crate::policy_search::{HeuristicName, PlanningContext, Trajectory, TrajectoryGenerator};
use crate::structs::LiftedDecisionList;
use std::fmt::Debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Scores a policy on the training tasks. Lower is better and 0 is the
/// best possible score.
pub trait PolicyHeuristic: Debug + Send + Sync {
    fn score(&self, policy: &LiftedDecisionList) -> f64;

    /// How many times `score` has been called.
    fn num_calls(&self) -> usize;
}

/// The training tasks and the grounder shared by all heuristics of a run.
#[derive(Debug)]
pub struct TrainingSet {
    contexts: Vec<PlanningContext>,
    grounder: Grounder,
    horizon: usize,
}

impl TrainingSet {
    pub fn new(contexts: Vec<PlanningContext>, grounder: Grounder, horizon: usize) -> Self {
        Self {
            contexts,
            grounder,
            horizon,
        }
    }

    pub fn contexts(&self) -> &[PlanningContext] {
        &self.contexts
    }

    pub fn grounder(&self) -> &Grounder {
        &self.grounder
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Executes `policy` for at most `horizon` steps. The run fails as soon
    /// as the policy abstains or picks an inapplicable operator.
    pub fn solves(&self, context: &PlanningContext, policy: &LiftedDecisionList) -> bool {
        let mut state = context.initial_state().clone();
        for _ in 0..self.horizon {
            if context.is_goal(&state) {
                return true;
            }
            let Some(operator) =
                self.grounder
                    .query(policy, context.scope(), &state, context.goal())
            else {
                return false;
            };
            if !context.is_applicable(&state, operator) {
                return false;
            }
            state = context.successor(&state, operator);
        }
        context.is_goal(&state)
    }

    /// Number of steps of `trajectory` where the policy would not take the
    /// demonstrated operator.
    pub fn missed_steps(
        &self,
        context: &PlanningContext,
        policy: &LiftedDecisionList,
        trajectory: &Trajectory,
    ) -> usize {
        trajectory
            .steps()
            .filter(|(state, operator)| {
                self.grounder
                    .query(policy, context.scope(), state, context.goal())
                    != Some(*operator)
            })
            .count()
    }
}

impl HeuristicName {
    pub fn create(
        &self,
        training: Arc<TrainingSet>,
        generator: TrajectoryGenerator,
    ) -> Box<dyn PolicyHeuristic> {
        match self {
            HeuristicName::PolicyEvaluation => Box::new(PolicyEvaluation::new(training)),
            HeuristicName::DemoPlanComparison | HeuristicName::PolicyGuided => {
                Box::new(PlanComparison::new(training, generator))
            }
        }
    }
}

/// The number of training tasks the policy does not solve within the
/// horizon.
#[derive(Debug)]
pub struct PolicyEvaluation {
    training: Arc<TrainingSet>,
    calls: AtomicUsize,
}

impl PolicyEvaluation {
    pub fn new(training: Arc<TrainingSet>) -> Self {
        Self {
            training,
            calls: AtomicUsize::new(0),
        }
    }
}

impl PolicyHeuristic for PolicyEvaluation {
    fn score(&self, policy: &LiftedDecisionList) -> f64 {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let unsolved = self
            .training
            .contexts()
            .iter()
            .filter(|context| !self.training.solves(context, policy))
            .count();
        trace!(unsolved, "evaluated policy");
        unsolved as f64
    }

    fn num_calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

/// The number of reference trajectory steps where the policy disagrees
/// with the reference. A task without a reference trajectory costs the
/// full horizon.
#[derive(Debug)]
pub struct PlanComparison {
    training: Arc<TrainingSet>,
    generator: TrajectoryGenerator,
    calls: AtomicUsize,
}

impl PlanComparison {
    pub fn new(training: Arc<TrainingSet>, generator: TrajectoryGenerator) -> Self {
        Self {
            training,
            generator,
            calls: AtomicUsize::new(0),
        }
    }
}

impl PolicyHeuristic for PlanComparison {
    fn score(&self, policy: &LiftedDecisionList) -> f64 {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let training = &self.training;
        let missed: usize = training
            .contexts()
            .iter()
            .enumerate()
            .map(|(index, context)| {
                match self
                    .generator
                    .trajectory(index, context, policy, training.grounder())
                {
                    Some(trajectory) => training.missed_steps(context, policy, &trajectory),
                    None => training.horizon(),
                }
            })
            .sum();
        trace!(missed, "evaluated policy");
        missed as f64
    }

    fn num_calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}
