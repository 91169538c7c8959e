use crate::error::SearchError;
use crate::search::{run_astar, BestFirstOptions, SearchOutcome};
use std::hash::Hash;

#[derive(Debug, Clone, Copy, Default)]
pub struct PolicyGuidedOptions {
    /// Maximum length of a policy rollout from a single node
    pub num_rollout_steps: usize,
    /// Cost charged for each step of a rollout, whatever the action costs
    pub rollout_step_cost: f64,
    pub search: BestFirstOptions,
}

/// A* where each node is also extended by rolling out `policy` for up to
/// `num_rollout_steps` steps. Every prefix of the rollout becomes a successor,
/// next to the ordinary single-action successors. The rollout stops early
/// when the policy abstains or proposes an action that is not valid.
///
/// The returned path is dense: one state per action, rebuilt by replaying
/// the chosen action sequences with `get_next_state`.
pub fn run_policy_guided_astar<S, A, G, V, VI, N, H, P>(
    initial_states: impl IntoIterator<Item = S>,
    check_goal: G,
    mut get_valid_actions: V,
    mut get_next_state: N,
    heuristic: H,
    mut policy: P,
    options: PolicyGuidedOptions,
) -> Result<SearchOutcome<S, A>, SearchError>
where
    S: Clone + Eq + Hash,
    A: Clone + PartialEq,
    G: FnMut(&S) -> bool,
    V: FnMut(&S) -> VI,
    VI: IntoIterator<Item = (A, f64)>,
    N: FnMut(&S, &A) -> S,
    H: FnMut(&S) -> f64,
    P: FnMut(&S) -> Option<A>,
{
    let get_successors = |state: &S| {
        let mut successors = vec![];

        let mut rollout_state = state.clone();
        let mut rollout_actions = vec![];
        let mut rollout_cost = 0.;
        for _ in 0..options.num_rollout_steps {
            let Some(action) = policy(&rollout_state) else {
                break;
            };
            if !get_valid_actions(&rollout_state)
                .into_iter()
                .any(|(valid, _)| valid == action)
            {
                break;
            }
            rollout_state = get_next_state(&rollout_state, &action);
            rollout_actions.push(action);
            rollout_cost += options.rollout_step_cost;
            successors.push((rollout_actions.clone(), rollout_state.clone(), rollout_cost));
        }

        for (action, cost) in get_valid_actions(state) {
            let next_state = get_next_state(state, &action);
            successors.push((vec![action], next_state, cost));
        }
        successors
    };

    let jumpy = run_astar(
        initial_states,
        check_goal,
        get_successors,
        heuristic,
        options.search,
    )?;

    let Some(mut state) = jumpy.states.first().cloned() else {
        return Err(SearchError::NoInitialStates);
    };
    let mut states = vec![state.clone()];
    let mut actions = vec![];
    for action in jumpy.actions.into_iter().flatten() {
        state = get_next_state(&state, &action);
        states.push(state.clone());
        actions.push(action);
    }
    Ok(SearchOutcome {
        states,
        actions,
        status: jumpy.status,
        statistics: jumpy.statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchStatus;

    fn moves(n: &i32) -> Vec<(i32, f64)> {
        vec![(1, 1.), (-1, 1.)]
            .into_iter()
            .filter(|(step, _)| (0..=10).contains(&(n + step)))
            .collect()
    }

    fn step(n: &i32, action: &i32) -> i32 {
        n + action
    }

    fn options(num_rollout_steps: usize) -> PolicyGuidedOptions {
        PolicyGuidedOptions {
            num_rollout_steps,
            rollout_step_cost: 1.,
            search: BestFirstOptions::default(),
        }
    }

    #[test]
    fn rollouts_are_replayed_into_a_dense_path() {
        let outcome = run_policy_guided_astar(
            [0],
            |n| *n == 7,
            moves,
            step,
            |_| 0.,
            |_| Some(1),
            options(3),
        )
        .unwrap();

        assert_eq!(outcome.status, SearchStatus::GoalReached);
        assert_eq!(outcome.states, (0..=7).collect::<Vec<_>>());
        assert_eq!(outcome.actions.len(), outcome.states.len() - 1);
        for (i, action) in outcome.actions.iter().enumerate() {
            assert_eq!(step(&outcome.states[i], action), outcome.states[i + 1]);
        }
    }

    #[test]
    fn invalid_policy_actions_end_the_rollout() {
        let mut highest = 0;
        let outcome = run_policy_guided_astar(
            [9],
            |n| *n == 0,
            moves,
            |n: &i32, action: &i32| {
                highest = highest.max(n + action);
                n + action
            },
            |n: &i32| *n as f64,
            |_| Some(1),
            options(5),
        )
        .unwrap();
        assert_eq!(outcome.final_state(), Some(&0));
        assert_eq!(outcome.states, (0..=9).rev().collect::<Vec<_>>());
        // the policy keeps proposing +1, which is only valid below the wall
        assert_eq!(highest, 10);
    }

    #[test]
    fn abstaining_policy_falls_back_to_primitive_successors() {
        let outcome = run_policy_guided_astar(
            [2],
            |n| *n == 5,
            moves,
            step,
            |n: &i32| (5 - n).abs() as f64,
            |_| None,
            options(3),
        )
        .unwrap();
        assert_eq!(outcome.states, vec![2, 3, 4, 5]);
        assert_eq!(outcome.actions, vec![1, 1, 1]);
    }
}
