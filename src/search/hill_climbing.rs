//! Enforced hill climbing with a bounded lookahead.
//!
//! From the current node, the best child is taken if it improves on the
//! current heuristic value. Otherwise the children of all children are
//! tried, and so on down to `enforced_depth` levels; depth 0 is plain hill
//! climbing. A state is only ever evaluated once per run.

use crate::error::SearchError;
use crate::search::{SearchNode, SearchStatistics};
use rayon::prelude::*;
use std::collections::HashSet;
use std::hash::Hash;
use std::rc::Rc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HillClimbingOptions {
    /// Stop as soon as the heuristic reaches this value or lower
    pub early_termination_threshold: Option<f64>,
    /// How many extra levels to look below the current node when no child
    /// improves on it
    pub enforced_depth: usize,
    /// Evaluate all nodes of a depth level on a worker pool
    pub parallelize: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HillClimbingStatus {
    GoalReached,
    ThresholdReached,
    NoSuccessors,
    NoImprovement,
}

#[derive(Debug, Clone)]
pub struct HillClimbingOutcome<S, A> {
    pub states: Vec<S>,
    pub actions: Vec<A>,
    /// Heuristic value recorded for each state of the path, same length as
    /// `states`. States crossed during a lookahead carry the value held
    /// before the jump, so the trace never increases.
    pub heuristics: Vec<f64>,
    pub status: HillClimbingStatus,
    pub statistics: SearchStatistics,
}

impl<S, A> HillClimbingOutcome<S, A> {
    pub fn final_state(&self) -> Option<&S> {
        self.states.last()
    }

    pub fn final_heuristic(&self) -> Option<f64> {
        self.heuristics.last().copied()
    }
}

pub fn run_hill_climbing<S, A, G, F, I, H>(
    initial_states: impl IntoIterator<Item = S>,
    mut check_goal: G,
    mut get_successors: F,
    heuristic: H,
    options: HillClimbingOptions,
) -> Result<HillClimbingOutcome<S, A>, SearchError>
where
    S: Clone + Eq + Hash + Send + Sync,
    A: Clone,
    G: FnMut(&S) -> bool,
    F: FnMut(&S) -> I,
    I: IntoIterator<Item = (A, S, f64)>,
    H: Fn(&S) -> f64 + Sync,
{
    let mut statistics = SearchStatistics::new();
    let mut visited: HashSet<S> = HashSet::new();
    let mut current: Option<(f64, Rc<SearchNode<S, A>>)> = None;
    for state in initial_states {
        let value = heuristic(&state);
        statistics.increment_evaluated_nodes();
        if current.as_ref().map_or(true, |(best, _)| value < *best) {
            current = Some((value, Rc::new(SearchNode::new_root(state.clone()))));
        }
        visited.insert(state);
    }
    let Some((mut last_heuristic, mut current)) = current else {
        return Err(SearchError::NoInitialStates);
    };
    let mut heuristics = vec![last_heuristic];
    let below_threshold = |value: f64| {
        options
            .early_termination_threshold
            .is_some_and(|threshold| value <= threshold)
    };
    info!(heuristic = last_heuristic, "starting hill climbing");

    let status = loop {
        if below_threshold(last_heuristic) {
            break HillClimbingStatus::ThresholdReached;
        }
        if check_goal(current.state()) {
            info!("terminating hill climbing, goal reached");
            break HillClimbingStatus::GoalReached;
        }

        let mut best: Option<(f64, Rc<SearchNode<S, A>>)> = None;
        let mut level = vec![Rc::clone(&current)];
        let mut early_break = false;
        for depth in 0..=options.enforced_depth {
            debug!(depth, "searching for an improvement");
            let mut successors = vec![];
            'level: for parent in &level {
                statistics.increment_expanded_nodes();
                for (action, state, cost) in get_successors(parent.state()) {
                    statistics.increment_generated_nodes(1);
                    if visited.contains(&state) {
                        statistics.increment_pruned_nodes();
                        continue;
                    }
                    visited.insert(state.clone());
                    let child = Rc::new(SearchNode::new_child(
                        Rc::clone(parent),
                        action,
                        state,
                        cost,
                    ));
                    successors.push(Rc::clone(&child));
                    if options.parallelize {
                        continue;
                    }
                    let value = heuristic(child.state());
                    statistics.increment_evaluated_nodes();
                    if best.as_ref().map_or(true, |(b, _)| value < *b) {
                        best = Some((value, child));
                    }
                    if below_threshold(value) {
                        early_break = true;
                        break 'level;
                    }
                }
            }
            if options.parallelize {
                let values = evaluate_in_parallel(&successors, &heuristic);
                for (value, child) in values.into_iter().zip(&successors) {
                    statistics.increment_evaluated_nodes();
                    if best.as_ref().map_or(true, |(b, _)| value < *b) {
                        best = Some((value, Rc::clone(child)));
                    }
                }
            }

            let best_value = best.as_ref().map_or(f64::INFINITY, |(value, _)| *value);
            if best_value < last_heuristic || early_break {
                debug!(depth, "found an improvement");
                break;
            }
            level = successors;
        }

        let Some((best_value, best_node)) = best else {
            info!("terminating hill climbing, no more successors");
            break HillClimbingStatus::NoSuccessors;
        };
        if best_value >= last_heuristic {
            info!("terminating hill climbing, could not improve score");
            break HillClimbingStatus::NoImprovement;
        }
        let steps = best_node.depth() - current.depth();
        heuristics.extend(std::iter::repeat(last_heuristic).take(steps - 1));
        heuristics.push(best_value);
        current = best_node;
        last_heuristic = best_value;
        info!(heuristic = last_heuristic, "hill climbing reached a new state");
        if early_break {
            break HillClimbingStatus::ThresholdReached;
        }
    };

    statistics.finalise_search();
    let (states, actions) = current.extract_path();
    debug_assert_eq!(states.len(), heuristics.len());
    Ok(HillClimbingOutcome {
        states,
        actions,
        heuristics,
        status,
        statistics,
    })
}

/// Scores every node on a worker pool sized to the machine, built for this
/// level only. Falls back to evaluating in order if no pool can be built.
fn evaluate_in_parallel<S, A, H>(nodes: &[Rc<SearchNode<S, A>>], heuristic: &H) -> Vec<f64>
where
    S: Sync,
    H: Fn(&S) -> f64 + Sync,
{
    let states: Vec<&S> = nodes.iter().map(|node| node.state()).collect();
    let num_threads = std::thread::available_parallelism().map_or(1, |n| n.get());
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
    {
        Ok(pool) => pool.install(|| states.par_iter().map(|state| heuristic(*state)).collect()),
        Err(e) => {
            warn!(error = %e, "could not build worker pool, evaluating sequentially");
            states.iter().map(|state| heuristic(*state)).collect()
        }
    }
}
