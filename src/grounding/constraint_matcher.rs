//! An incomplete but fast alternative to exhaustive grounding. Instead of
//! enumerating every binding of a rule and testing it, the positive state
//! and goal preconditions are treated as constraints that must each be
//! matched against a fact, and bindings are built by backtracking over the
//! facts that can still match.

use crate::structs::{GroundAtom, GroundLdlRule, LdlRule, LiftedAtom, Object, Predicate, State, Variable};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// How parameters that no positive precondition constrains are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum FallbackSelection {
    /// The first type-correct object in sorted order.
    #[default]
    FirstCandidate,
    /// A type-correct object drawn from a generator seeded with `seed`.
    /// Each match starts from the same seed.
    Random { seed: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum FactTag {
    State,
    Wanted,
}

/// Facts indexed by tag and predicate. Goal atoms are tagged `Wanted` so
/// they never satisfy a state precondition and vice versa.
struct FactDatabase<'a> {
    facts: HashMap<(FactTag, Predicate), Vec<&'a [Object]>>,
}

impl<'a> FactDatabase<'a> {
    fn new(atoms: &'a State, goal: &'a State) -> Self {
        let mut facts: HashMap<(FactTag, Predicate), Vec<&'a [Object]>> = HashMap::new();
        for (tag, set) in [(FactTag::State, atoms), (FactTag::Wanted, goal)] {
            for atom in set {
                facts
                    .entry((tag, atom.predicate()))
                    .or_default()
                    .push(atom.objects());
            }
        }
        Self { facts }
    }

    fn facts(&self, tag: FactTag, predicate: Predicate) -> &[&'a [Object]] {
        self.facts
            .get(&(tag, predicate))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[derive(Clone, Copy)]
struct Constraint<'r> {
    tag: FactTag,
    atom: &'r LiftedAtom,
}

type Binding = HashMap<Variable, Object>;

/// The assignments `fact` adds to `binding` if it can match `atom`, or
/// `None` if it conflicts with the binding or the variable types.
fn unify(atom: &LiftedAtom, fact: &[Object], binding: &Binding) -> Option<Vec<(Variable, Object)>> {
    let mut extension: Vec<(Variable, Object)> = vec![];
    for (variable, object) in atom.variables().iter().zip(fact) {
        let bound = binding.get(variable).copied().or_else(|| {
            extension
                .iter()
                .find(|(v, _)| v == variable)
                .map(|(_, o)| *o)
        });
        match bound {
            Some(existing) if existing != *object => return None,
            Some(_) => {}
            None => {
                if !object.is_instance(variable.type_()) {
                    return None;
                }
                extension.push((*variable, *object));
            }
        }
    }
    Some(extension)
}

/// Finds up to `max_matches` bindings of a rule that satisfy all of its
/// preconditions in a given state and goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintMatcher {
    max_matches: usize,
    fallback: FallbackSelection,
}

struct MatchContext<'a, 'r> {
    rule: &'r LdlRule,
    database: FactDatabase<'a>,
    atoms: &'a State,
    objects: &'a [Object],
}

impl ConstraintMatcher {
    pub fn new(max_matches: usize, fallback: FallbackSelection) -> Self {
        Self {
            max_matches: max_matches.max(1),
            fallback,
        }
    }

    pub fn max_matches(&self) -> usize {
        self.max_matches
    }

    pub fn fallback(&self) -> FallbackSelection {
        self.fallback
    }

    /// Returns groundings of `rule` whose positive preconditions hold in
    /// `atoms`, whose negative preconditions do not, and whose goal
    /// preconditions are in `goal`. An empty result means the rule does not
    /// apply. `objects` must be sorted.
    pub fn match_rule(
        &self,
        rule: &LdlRule,
        atoms: &State,
        goal: &State,
        objects: &[Object],
    ) -> Vec<GroundLdlRule> {
        let context = MatchContext {
            rule,
            database: FactDatabase::new(atoms, goal),
            atoms,
            objects,
        };
        let constraints: Vec<Constraint> = rule
            .pos_state_preconditions()
            .iter()
            .map(|atom| Constraint {
                tag: FactTag::State,
                atom,
            })
            .chain(rule.goal_preconditions().iter().map(|atom| Constraint {
                tag: FactTag::Wanted,
                atom,
            }))
            .collect();

        let mut rng = match self.fallback {
            FallbackSelection::FirstCandidate => None,
            FallbackSelection::Random { seed } => Some(StdRng::seed_from_u64(seed)),
        };
        let mut results = vec![];
        self.assign(&context, constraints, &mut Binding::new(), &mut rng, &mut results);
        results
    }

    fn assign(
        &self,
        context: &MatchContext,
        remaining: Vec<Constraint>,
        binding: &mut Binding,
        rng: &mut Option<StdRng>,
        results: &mut Vec<GroundLdlRule>,
    ) {
        if results.len() >= self.max_matches {
            return;
        }

        // Pick the constraint with the fewest matching facts. A constraint
        // with none means this branch is dead.
        let mut best: Option<(usize, Vec<Vec<(Variable, Object)>>)> = None;
        for (index, constraint) in remaining.iter().enumerate() {
            let extensions: Vec<_> = context
                .database
                .facts(constraint.tag, constraint.atom.predicate())
                .iter()
                .filter_map(|fact| unify(constraint.atom, fact, binding))
                .collect();
            if extensions.is_empty() {
                return;
            }
            if best
                .as_ref()
                .map_or(true, |(_, current)| extensions.len() < current.len())
            {
                best = Some((index, extensions));
            }
        }

        let Some((index, extensions)) = best else {
            if let Some(ground) = self.complete(context, binding, rng) {
                results.push(ground);
            }
            return;
        };

        let mut rest = remaining;
        rest.swap_remove(index);
        for extension in extensions {
            for (variable, object) in &extension {
                binding.insert(*variable, *object);
            }
            if negatives_hold(context, binding) {
                self.assign(context, rest.clone(), binding, rng, results);
            }
            for (variable, _) in &extension {
                binding.remove(variable);
            }
            if results.len() >= self.max_matches {
                return;
            }
        }
    }

    /// Fills the parameters no positive constraint mentions, in parameter
    /// order, backtracking if a negative precondition rules a choice out.
    fn complete(
        &self,
        context: &MatchContext,
        binding: &mut Binding,
        rng: &mut Option<StdRng>,
    ) -> Option<GroundLdlRule> {
        let unbound: Vec<Variable> = context
            .rule
            .parameters()
            .iter()
            .copied()
            .filter(|parameter| !binding.contains_key(parameter))
            .collect();
        let candidates: Vec<Vec<Object>> = unbound
            .iter()
            .map(|parameter| {
                let mut candidates: Vec<Object> = context
                    .objects
                    .iter()
                    .copied()
                    .filter(|object| object.is_instance(parameter.type_()))
                    .collect();
                if let Some(rng) = rng.as_mut() {
                    candidates.shuffle(rng);
                }
                candidates
            })
            .collect();

        let mut filled = binding.clone();
        if !fill(context, &unbound, &candidates, &mut filled) {
            return None;
        }
        let objects: Vec<Object> = context
            .rule
            .parameters()
            .iter()
            .map(|parameter| filled.get(parameter).copied())
            .collect::<Option<_>>()?;
        context.rule.ground(&objects)
    }
}

fn fill(
    context: &MatchContext,
    unbound: &[Variable],
    candidates: &[Vec<Object>],
    binding: &mut Binding,
) -> bool {
    let (Some(variable), Some(choices)) = (unbound.first(), candidates.first()) else {
        return true;
    };
    for object in choices {
        binding.insert(*variable, *object);
        if negatives_hold(context, binding) && fill(context, &unbound[1..], &candidates[1..], binding)
        {
            return true;
        }
        binding.remove(variable);
    }
    false
}

/// Every negative precondition whose variables are all bound is absent from
/// the state.
fn negatives_hold(context: &MatchContext, binding: &Binding) -> bool {
    context
        .rule
        .neg_state_preconditions()
        .iter()
        .filter_map(|atom| atom.ground(binding))
        .all(|atom: GroundAtom| !context.atoms.contains(&atom))
}

impl Default for ConstraintMatcher {
    fn default() -> Self {
        Self::new(1, FallbackSelection::FirstCandidate)
    }
}

/// The objects appearing in `atoms`, sorted.
pub fn objects_in(atoms: &State) -> Vec<Object> {
    atoms
        .iter()
        .flat_map(|atom| atom.objects().iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grounding::{ground_exhaustively, GroundingScope};
    use crate::structs::LdlRule;
    use crate::test_utils::*;

    fn unstack_goal_rule(domain: &crate::structs::Domain) -> LdlRule {
        let block = domain.type_by_name("block").unwrap();
        let (x, y, z) = (
            Variable::new("x", block),
            Variable::new("y", block),
            Variable::new("z", block),
        );
        let on = domain.predicate_by_name("on").unwrap();
        let clear = domain.predicate_by_name("clear").unwrap();
        LdlRule::new(
            "unstack-blocker",
            vec![x, y, z],
            BTreeSet::from([on.lift([x, y]), clear.lift([x])]),
            BTreeSet::new(),
            BTreeSet::from([on.lift([z, y])]),
            domain.operator_by_name("unstack").unwrap(),
            vec![x, y],
        )
        .unwrap()
    }

    #[test]
    fn matches_agree_with_exhaustive_grounding() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let unstack = domain.operator_by_name("unstack").unwrap();
        let stack = domain.operator_by_name("stack").unwrap();
        let (a, b, c) = (
            task.object_by_name("a").unwrap(),
            task.object_by_name("b").unwrap(),
            task.object_by_name("c").unwrap(),
        );
        // c on b, the goal wants a on b
        let state = stack
            .ground(&[c, b])
            .unwrap()
            .apply(&domain.operator_by_name("pick-up").unwrap().ground(&[c]).unwrap().apply(task.init()));
        assert!(unstack.ground(&[c, b]).unwrap().is_applicable(&state));

        let rule = unstack_goal_rule(&domain);
        let matcher = ConstraintMatcher::new(10, FallbackSelection::FirstCandidate);
        let matches = matcher.match_rule(&rule, &state, task.goal(), task.objects());
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].objects(), &[c, b, a]);

        let scope = GroundingScope::unfiltered(task.objects().iter().copied());
        let expected: Vec<_> = ground_exhaustively(&rule, &scope)
            .into_iter()
            .filter(|ground| ground.is_satisfied(&state, task.goal()))
            .collect();
        assert_eq!(matches, expected);
    }

    #[test]
    fn goal_facts_do_not_satisfy_state_preconditions() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let rule = unstack_goal_rule(&domain);
        let matches = ConstraintMatcher::default().match_rule(&rule, task.init(), task.goal(), task.objects());
        assert!(matches.is_empty());
    }

    #[test]
    fn unconstrained_parameters_take_first_candidate() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let block = domain.type_by_name("block").unwrap();
        let (x, y) = (Variable::new("x", block), Variable::new("y", block));
        let holding = domain.predicate_by_name("holding").unwrap();
        let on_table = domain.predicate_by_name("on-table").unwrap();
        let clear = domain.predicate_by_name("clear").unwrap();
        // ?y is only negatively constrained: it must not be on the table
        let rule = LdlRule::new(
            "r",
            vec![x, y],
            BTreeSet::from([clear.lift([x])]),
            BTreeSet::from([on_table.lift([y]), holding.lift([x])]),
            BTreeSet::new(),
            domain.operator_by_name("pick-up").unwrap(),
            vec![x],
        )
        .unwrap();
        let c = task.object_by_name("c").unwrap();
        let state = domain
            .operator_by_name("pick-up")
            .unwrap()
            .ground(&[c])
            .unwrap()
            .apply(task.init());
        let state = domain
            .operator_by_name("put-down")
            .unwrap()
            .ground(&[c])
            .unwrap()
            .apply(&state)
            .into_iter()
            .filter(|atom| atom != &ground(&domain, &task, "on-table", &["c"]))
            .collect();

        let matches = ConstraintMatcher::default().match_rule(&rule, &state, task.goal(), task.objects());
        assert_eq!(matches.len(), 1);
        let names: Vec<&str> = matches[0].objects().iter().map(|o| o.name().as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[test]
    fn seeded_fallback_is_repeatable_and_type_correct() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let block = domain.type_by_name("block").unwrap();
        let (x, y) = (Variable::new("x", block), Variable::new("y", block));
        let clear = domain.predicate_by_name("clear").unwrap();
        let rule = LdlRule::new(
            "r",
            vec![x, y],
            BTreeSet::from([clear.lift([x])]),
            BTreeSet::new(),
            BTreeSet::new(),
            domain.operator_by_name("pick-up").unwrap(),
            vec![x],
        )
        .unwrap();
        let matcher = ConstraintMatcher::new(3, FallbackSelection::Random { seed: 7 });

        let first = matcher.match_rule(&rule, task.init(), task.goal(), task.objects());
        let second = matcher.match_rule(&rule, task.init(), task.goal(), task.objects());
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        for ground in &first {
            assert!(ground.is_satisfied(task.init(), task.goal()));
        }
    }

    #[test]
    fn objects_in_collects_sorted_arguments() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        assert_eq!(objects_in(task.init()), task.objects());
    }
}
