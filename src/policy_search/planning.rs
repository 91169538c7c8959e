use crate::grounding::GroundingScope;
use crate::policy_search::TaskPlanningHeuristic;
use crate::search::{run_astar, BestFirstOptions, SearchBudget};
use crate::structs::{Domain, GroundOperator, State, StripsOperator, Task};
use itertools::Itertools;
use tracing::debug;

/// The ground state space of one task: every ground operator that can ever
/// be applicable, with successor and goal tests.
#[derive(Debug, Clone)]
pub struct PlanningContext {
    task: Task,
    scope: GroundingScope,
    ground_operators: Vec<GroundOperator>,
}

impl PlanningContext {
    pub fn new(domain: &Domain, task: &Task) -> Self {
        let scope = GroundingScope::for_task(domain, task);
        let mut ground_operators: Vec<GroundOperator> = domain
            .operators()
            .iter()
            .flat_map(|operator| ground_operator(operator, &scope))
            .collect();
        ground_operators.sort();
        debug!(
            task = %task.name(),
            num_ground_operators = ground_operators.len(),
            "grounded task"
        );
        Self {
            task: task.clone(),
            scope,
            ground_operators,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn scope(&self) -> GroundingScope {
        self.scope
    }

    /// Sorted by operator name, then objects.
    pub fn ground_operators(&self) -> &[GroundOperator] {
        &self.ground_operators
    }

    pub fn initial_state(&self) -> &State {
        self.task.init()
    }

    pub fn goal(&self) -> &State {
        self.task.goal()
    }

    pub fn applicable<'a>(&'a self, state: &'a State) -> impl Iterator<Item = GroundOperator> + 'a {
        self.ground_operators
            .iter()
            .filter(move |operator| operator.is_applicable(state))
            .copied()
    }

    pub fn is_applicable(&self, state: &State, operator: GroundOperator) -> bool {
        operator.is_applicable(state)
    }

    pub fn successor(&self, state: &State, operator: GroundOperator) -> State {
        operator.apply(state)
    }

    pub fn is_goal(&self, state: &State) -> bool {
        self.task.goal().is_subset(state)
    }

    pub fn num_unsatisfied_goals(&self, state: &State) -> usize {
        self.task.goal().difference(state).count()
    }

    /// A* from the initial state. Returns the states and operators of the
    /// plan, or `None` when the budget runs out or the task is unsolvable.
    pub fn plan(
        &self,
        heuristic: TaskPlanningHeuristic,
        budget: SearchBudget,
    ) -> Option<(Vec<State>, Vec<GroundOperator>)> {
        let outcome = run_astar(
            [self.initial_state().clone()],
            |state| self.is_goal(state),
            |state| {
                self.applicable(state)
                    .map(|operator| (operator, self.successor(state, operator), 1.))
                    .collect::<Vec<_>>()
            },
            |state| match heuristic {
                TaskPlanningHeuristic::GoalCount => self.num_unsatisfied_goals(state) as f64,
                TaskPlanningHeuristic::Blind => 0.,
            },
            BestFirstOptions::new(budget, false),
        )
        .ok()?;
        if !outcome.is_goal_reached() {
            debug!(task = %self.task.name(), status = ?outcome.status, "no plan found");
            return None;
        }
        Some((outcome.states, outcome.actions))
    }
}

/// Groundings of `operator` whose static preconditions agree with the
/// initial state.
fn ground_operator(operator: &StripsOperator, scope: &GroundingScope) -> Vec<GroundOperator> {
    let static_preconditions_hold = |ground: &GroundOperator| {
        ground
            .preconditions()
            .iter()
            .filter(|atom| scope.is_static(atom.predicate()))
            .all(|atom| scope.static_init().contains(atom))
            && !ground
                .negative_preconditions()
                .iter()
                .filter(|atom| scope.is_static(atom.predicate()))
                .any(|atom| scope.static_init().contains(atom))
    };
    let candidates: Vec<Vec<_>> = operator
        .parameters()
        .iter()
        .map(|parameter| {
            scope
                .objects()
                .iter()
                .copied()
                .filter(|object| object.is_instance(parameter.type_()))
                .collect()
        })
        .collect();
    if candidates.is_empty() {
        return operator.ground(&[]).into_iter().collect();
    }
    candidates
        .into_iter()
        .multi_cartesian_product()
        .filter_map(|objects| operator.ground(&objects))
        .filter(static_preconditions_hold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn ground_operators_are_sorted_and_typed() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let context = PlanningContext::new(&domain, &task);
        // 3 pick-up, 3 put-down, 9 stack, 9 unstack
        assert_eq!(context.ground_operators().len(), 24);
        assert!(context.ground_operators().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn static_preconditions_prune_operators() {
        let domain = logistics_domain();
        let task = logistics_task(&domain);
        let context = PlanningContext::new(&domain, &task);
        let drives: Vec<String> = context
            .ground_operators()
            .iter()
            .filter(|operator| operator.name().as_str() == "drive")
            .map(|operator| operator.to_string())
            .collect();
        assert_eq!(drives, vec!["(drive t1 l1 l2)", "(drive t1 l2 l1)"]);
    }

    #[test]
    fn applicable_operators_in_initial_state() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let context = PlanningContext::new(&domain, &task);
        let applicable: Vec<String> = context
            .applicable(context.initial_state())
            .map(|operator| operator.to_string())
            .collect();
        assert!(!applicable.is_empty());
        for operator in context.applicable(context.initial_state()) {
            let next = context.successor(context.initial_state(), operator);
            assert_ne!(&next, context.initial_state());
        }
    }

    #[test]
    fn planner_solves_blocks() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let context = PlanningContext::new(&domain, &task);
        for heuristic in [TaskPlanningHeuristic::GoalCount, TaskPlanningHeuristic::Blind] {
            let (states, operators) = context.plan(heuristic, SearchBudget::default()).unwrap();
            assert_eq!(states.len(), operators.len() + 1);
            assert!(context.is_goal(&states[states.len() - 1]));
            for (i, operator) in operators.iter().enumerate() {
                assert!(operator.is_applicable(&states[i]));
                assert_eq!(operator.apply(&states[i]), states[i + 1]);
            }
        }
    }

    #[test]
    fn goal_count() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let context = PlanningContext::new(&domain, &task);
        assert_eq!(
            context.num_unsatisfied_goals(context.initial_state()),
            task.goal().difference(task.init()).count()
        );
        assert!(!context.is_goal(context.initial_state()));
    }
}
