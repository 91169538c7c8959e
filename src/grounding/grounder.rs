use crate::grounding::{ground_exhaustively, ConstraintMatcher, GroundingCache, GroundingScope};
use crate::structs::{GroundLdlRule, LdlRule, State};
use std::sync::Arc;

/// Which procedure produces the candidate groundings of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundingMode {
    /// All type-correct groundings, filtered by static unary predicates and
    /// memoised. Independent of the current state.
    Exhaustive,
    /// Only groundings that already satisfy the rule in the current state.
    ConstraintMatching(ConstraintMatcher),
}

/// Candidate groundings, either shared from the cache or freshly matched.
#[derive(Debug, Clone)]
pub enum Candidates {
    Cached(Arc<[GroundLdlRule]>),
    Matched(Vec<GroundLdlRule>),
}

impl Candidates {
    pub fn as_slice(&self) -> &[GroundLdlRule] {
        match self {
            Candidates::Cached(groundings) => groundings,
            Candidates::Matched(groundings) => groundings,
        }
    }
}

/// The single entry point for grounding rules. Owns the grounding cache, so
/// cached results live as long as the grounder.
#[derive(Debug)]
pub struct Grounder {
    mode: GroundingMode,
    cache: GroundingCache,
}

impl Grounder {
    pub fn new(mode: GroundingMode, cache_capacity: usize) -> Self {
        Self {
            mode,
            cache: GroundingCache::new(cache_capacity),
        }
    }

    pub fn mode(&self) -> GroundingMode {
        self.mode
    }

    pub fn cache(&self) -> &GroundingCache {
        &self.cache
    }

    /// Candidate groundings of `rule`, in a deterministic order. Callers
    /// must still check each candidate against the state and goal.
    pub fn candidates(
        &self,
        rule: &LdlRule,
        scope: GroundingScope,
        atoms: &State,
        goal: &State,
    ) -> Candidates {
        match &self.mode {
            GroundingMode::Exhaustive => Candidates::Cached(
                self.cache
                    .get_or_insert_with(rule, scope, || ground_exhaustively(rule, &scope)),
            ),
            GroundingMode::ConstraintMatching(matcher) => {
                Candidates::Matched(matcher.match_rule(rule, atoms, goal, scope.objects()))
            }
        }
    }
}

impl Default for Grounder {
    fn default() -> Self {
        Self {
            mode: GroundingMode::Exhaustive,
            cache: GroundingCache::default(),
        }
    }
}
