//! A generic best-first search over any hashable state type. The priority
//! function decides the algorithm: the heuristic alone gives greedy
//! best-first search, heuristic plus path cost gives A*.

use crate::error::SearchError;
use crate::search::{BudgetExhausted, SearchBudget, SearchNode, SearchStatistics};
use ordered_float::OrderedFloat;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;
use tracing::debug;

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// The returned path ends in a goal state
    GoalReached,
    /// Every reachable state was expanded without finding a goal
    OpenListExhausted,
    /// A budget ran out first
    BudgetExhausted(BudgetExhausted),
}

/// The result of a search. If no goal was found, the path leads to the best
/// node seen, i.e. the one with the lowest priority.
#[derive(Debug, Clone)]
pub struct SearchOutcome<S, A> {
    pub states: Vec<S>,
    pub actions: Vec<A>,
    pub status: SearchStatus,
    pub statistics: SearchStatistics,
}

impl<S, A> SearchOutcome<S, A> {
    pub fn is_goal_reached(&self) -> bool {
        self.status == SearchStatus::GoalReached
    }

    pub fn final_state(&self) -> Option<&S> {
        self.states.last()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BestFirstOptions {
    pub budget: SearchBudget,
    /// When a child beats the best priority seen so far, push the parent
    /// back onto the open list and skip its remaining children.
    pub lazy_expansion: bool,
}

impl BestFirstOptions {
    pub fn new(budget: SearchBudget, lazy_expansion: bool) -> Self {
        Self {
            budget,
            lazy_expansion,
        }
    }
}

type OpenEntry = Reverse<(OrderedFloat<f64>, usize)>;

struct OpenList<S, A> {
    queue: PriorityQueue<usize, OpenEntry>,
    nodes: HashMap<usize, Rc<SearchNode<S, A>>>,
    next_tiebreak: usize,
}

impl<S, A> OpenList<S, A> {
    fn new() -> Self {
        Self {
            queue: PriorityQueue::new(),
            nodes: HashMap::new(),
            next_tiebreak: 0,
        }
    }

    /// Entries with equal priority come out in insertion order.
    fn push(&mut self, priority: f64, node: Rc<SearchNode<S, A>>) {
        let id = self.next_tiebreak;
        self.next_tiebreak += 1;
        self.nodes.insert(id, node);
        self.queue.push(id, Reverse((OrderedFloat(priority), id)));
    }

    fn pop(&mut self) -> Option<Rc<SearchNode<S, A>>> {
        let (id, _) = self.queue.pop()?;
        self.nodes.remove(&id)
    }

    fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Runs a best-first search from several initial states at once.
///
/// `get_successors` yields `(action, state, cost)` triples and
/// `get_priority` scores nodes, lower being better. A state is only
/// (re)opened when reached by a strictly cheaper path than any seen before.
pub fn run_heuristic_search<S, A, G, F, I, P>(
    initial_states: impl IntoIterator<Item = S>,
    mut check_goal: G,
    mut get_successors: F,
    mut get_priority: P,
    options: BestFirstOptions,
) -> Result<SearchOutcome<S, A>, SearchError>
where
    S: Clone + Eq + Hash,
    A: Clone,
    G: FnMut(&S) -> bool,
    F: FnMut(&S) -> I,
    I: IntoIterator<Item = (A, S, f64)>,
    P: FnMut(&SearchNode<S, A>) -> f64,
{
    let mut statistics = SearchStatistics::new();
    let budget = options.budget;
    let mut open_list = OpenList::new();
    let mut best_path_costs: HashMap<S, f64> = HashMap::new();
    let mut best: Option<(f64, Rc<SearchNode<S, A>>)> = None;

    for state in initial_states {
        let root = Rc::new(SearchNode::new_root(state.clone()));
        let priority = get_priority(&root);
        statistics.increment_evaluated_nodes();
        if best.as_ref().map_or(true, |(p, _)| priority < *p) {
            best = Some((priority, Rc::clone(&root)));
        }
        best_path_costs.insert(state, 0.);
        open_list.push(priority, root);
    }
    let Some((mut best_priority, mut best_node)) = best else {
        return Err(SearchError::NoInitialStates);
    };

    let mut status = SearchStatus::OpenListExhausted;
    'search: while !open_list.is_empty() {
        if let Some(reason) = budget.should_terminate(&statistics) {
            status = SearchStatus::BudgetExhausted(reason);
            break;
        }
        let Some(node) = open_list.pop() else {
            break;
        };
        let known = best_path_costs
            .get(node.state())
            .copied()
            .unwrap_or(f64::INFINITY);
        if known < node.cumulative_cost() {
            continue;
        }
        if check_goal(node.state()) {
            debug!(cost = node.cumulative_cost(), "goal reached");
            return Ok(finish(&node, SearchStatus::GoalReached, statistics));
        }
        statistics.increment_expanded_nodes();

        for (action, child_state, cost) in get_successors(node.state()) {
            if budget.is_out_of_time(&statistics) {
                status = SearchStatus::BudgetExhausted(BudgetExhausted::TimeLimit);
                break 'search;
            }
            statistics.increment_generated_nodes(1);
            let child_cost = node.cumulative_cost() + cost;
            let known = best_path_costs
                .get(&child_state)
                .copied()
                .unwrap_or(f64::INFINITY);
            if known <= child_cost {
                statistics.increment_pruned_nodes();
                continue;
            }

            let child = Rc::new(SearchNode::new_child(
                Rc::clone(&node),
                action,
                child_state.clone(),
                cost,
            ));
            let priority = get_priority(&child);
            statistics.increment_evaluated_nodes();
            best_path_costs.insert(child_state, child_cost);
            open_list.push(priority, Rc::clone(&child));

            if priority < best_priority {
                best_priority = priority;
                best_node = child;
                if options.lazy_expansion {
                    open_list.push(priority, Rc::clone(&node));
                    break;
                }
            }
            if statistics.evaluated_nodes() >= budget.max_evaluations {
                break;
            }
        }
    }

    debug!(?status, best_priority, "no goal found, returning best node");
    Ok(finish(&best_node, status, statistics))
}

fn finish<S: Clone, A: Clone>(
    node: &SearchNode<S, A>,
    status: SearchStatus,
    mut statistics: SearchStatistics,
) -> SearchOutcome<S, A> {
    statistics.finalise_search();
    let (states, actions) = node.extract_path();
    SearchOutcome {
        states,
        actions,
        status,
        statistics,
    }
}

/// Greedy best-first search: nodes are ordered by `heuristic` alone.
pub fn run_gbfs<S, A, G, F, I, H>(
    initial_states: impl IntoIterator<Item = S>,
    check_goal: G,
    get_successors: F,
    mut heuristic: H,
    options: BestFirstOptions,
) -> Result<SearchOutcome<S, A>, SearchError>
where
    S: Clone + Eq + Hash,
    A: Clone,
    G: FnMut(&S) -> bool,
    F: FnMut(&S) -> I,
    I: IntoIterator<Item = (A, S, f64)>,
    H: FnMut(&S) -> f64,
{
    run_heuristic_search(
        initial_states,
        check_goal,
        get_successors,
        |node: &SearchNode<S, A>| heuristic(node.state()),
        options,
    )
}

/// A* search: nodes are ordered by `heuristic` plus path cost.
pub fn run_astar<S, A, G, F, I, H>(
    initial_states: impl IntoIterator<Item = S>,
    check_goal: G,
    get_successors: F,
    mut heuristic: H,
    options: BestFirstOptions,
) -> Result<SearchOutcome<S, A>, SearchError>
where
    S: Clone + Eq + Hash,
    A: Clone,
    G: FnMut(&S) -> bool,
    F: FnMut(&S) -> I,
    I: IntoIterator<Item = (A, S, f64)>,
    H: FnMut(&S) -> f64,
{
    run_heuristic_search(
        initial_states,
        check_goal,
        get_successors,
        |node: &SearchNode<S, A>| heuristic(node.state()) + node.cumulative_cost(),
        options,
    )
}
