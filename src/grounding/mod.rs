//! Grounding lifted rules into ground rules, and querying decision lists.

mod cache;
mod constraint_matcher;
mod exhaustive;
mod grounder;
mod query;
mod scope;

pub use cache::{GroundingCache, DEFAULT_GROUNDING_CACHE_CAPACITY};
pub use constraint_matcher::{objects_in, ConstraintMatcher, FallbackSelection};
pub use exhaustive::{ground_exhaustively, parameter_candidates};
pub use grounder::{Candidates, Grounder, GroundingMode};
pub use scope::GroundingScope;
