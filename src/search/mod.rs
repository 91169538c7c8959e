//! Search algorithms over arbitrary hashable state types. Callers supply the
//! successor function, the goal test and the heuristic or priority.

mod best_first;
mod hill_climbing;
mod policy_guided;
mod search_node;
mod search_statistics;
mod termination_condition;

pub use best_first::{
    run_astar, run_gbfs, run_heuristic_search, BestFirstOptions, SearchOutcome, SearchStatus,
};
pub use hill_climbing::{
    run_hill_climbing, HillClimbingOptions, HillClimbingOutcome, HillClimbingStatus,
};
pub use policy_guided::{run_policy_guided_astar, PolicyGuidedOptions};
pub use search_node::SearchNode;
pub use search_statistics::{NodeCounts, SearchStatistics};
pub use termination_condition::{BudgetExhausted, SearchBudget};
