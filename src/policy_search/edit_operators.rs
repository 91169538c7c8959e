//! Edit operators generate the neighbours of a policy in policy space.

use crate::policy_search::EditOperatorName;
use crate::structs::{
    Domain, LdlRule, LiftedAtom, LiftedDecisionList, Predicate, StripsOperator, Type, Variable,
};
use itertools::Itertools;
use std::collections::BTreeSet;
use std::fmt::Debug;

pub trait PolicyEditOperator: Debug + Send + Sync {
    fn name(&self) -> EditOperatorName;

    /// Every policy one edit away from `policy`, in a deterministic order.
    fn get_successors(&self, policy: &LiftedDecisionList) -> Vec<LiftedDecisionList>;
}

impl EditOperatorName {
    pub fn create(&self, domain: &Domain, allow_new_vars: bool) -> Box<dyn PolicyEditOperator> {
        match self {
            EditOperatorName::AddRule => Box::new(AddRule::new(domain.operators().to_vec())),
            EditOperatorName::AddCondition => Box::new(AddCondition::new(
                domain.predicates().collect(),
                allow_new_vars,
            )),
            EditOperatorName::DeleteRule => Box::new(DeleteRule),
            EditOperatorName::DeleteCondition => Box::new(DeleteCondition),
        }
    }
}

/// Inserts, at every position, a rule that applies an operator whenever
/// the operator is applicable.
#[derive(Debug, Clone)]
pub struct AddRule {
    operators: Vec<StripsOperator>,
}

impl AddRule {
    pub fn new(operators: Vec<StripsOperator>) -> Self {
        Self { operators }
    }

    fn rule_for(operator: &StripsOperator) -> Option<LdlRule> {
        LdlRule::new(
            format!("{}-rule", operator.name()),
            operator.parameters().to_vec(),
            operator.preconditions().clone(),
            operator.negative_preconditions().clone(),
            BTreeSet::new(),
            *operator,
            operator.parameters().to_vec(),
        )
        .ok()
    }
}

impl PolicyEditOperator for AddRule {
    fn name(&self) -> EditOperatorName {
        EditOperatorName::AddRule
    }

    fn get_successors(&self, policy: &LiftedDecisionList) -> Vec<LiftedDecisionList> {
        let rules: Vec<LdlRule> = self.operators.iter().filter_map(Self::rule_for).collect();
        (0..=policy.len())
            .flat_map(|index| {
                rules
                    .iter()
                    .map(move |rule| policy.with_rule_inserted(index, rule.clone()))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placement {
    PositiveState,
    NegativeState,
    Goal,
}

/// Adds one literal to one rule. Literals range over every predicate and
/// every type-correct choice of the rule's parameters, and of fresh
/// variables if `allow_new_vars` is set.
#[derive(Debug, Clone)]
pub struct AddCondition {
    predicates: Vec<Predicate>,
    allow_new_vars: bool,
}

impl AddCondition {
    pub fn new(predicates: Vec<Predicate>, allow_new_vars: bool) -> Self {
        Self {
            predicates,
            allow_new_vars,
        }
    }

    fn refinements(&self, rule: &LdlRule) -> Vec<LdlRule> {
        let mut refined = vec![];
        for predicate in &self.predicates {
            let fresh = fresh_variables(predicate.types(), rule.parameters());
            for placement in [
                Placement::PositiveState,
                Placement::NegativeState,
                Placement::Goal,
            ] {
                let mut variables: Vec<Variable> = rule.parameters().to_vec();
                // a fresh variable under negation would range over every object
                if self.allow_new_vars && placement != Placement::NegativeState {
                    variables.extend(fresh.iter().copied());
                }
                for combination in variable_combinations(&variables, predicate.types()) {
                    let atom = predicate.lift(combination);
                    if let Some(rule) = with_literal(rule, placement, atom, &fresh) {
                        refined.push(rule);
                    }
                }
            }
        }
        refined
    }
}

impl PolicyEditOperator for AddCondition {
    fn name(&self) -> EditOperatorName {
        EditOperatorName::AddCondition
    }

    fn get_successors(&self, policy: &LiftedDecisionList) -> Vec<LiftedDecisionList> {
        policy
            .rules()
            .iter()
            .enumerate()
            .flat_map(|(index, rule)| {
                self.refinements(rule)
                    .into_iter()
                    .map(move |refined| policy.with_rule_replaced(index, refined))
            })
            .collect()
    }
}

fn with_literal(
    rule: &LdlRule,
    placement: Placement,
    atom: LiftedAtom,
    fresh: &[Variable],
) -> Option<LdlRule> {
    let mut pos = rule.pos_state_preconditions().clone();
    let mut neg = rule.neg_state_preconditions().clone();
    let mut goal = rule.goal_preconditions().clone();
    let added = match placement {
        Placement::PositiveState => !neg.contains(&atom) && pos.insert(atom),
        Placement::NegativeState => !pos.contains(&atom) && neg.insert(atom),
        Placement::Goal => goal.insert(atom),
    };
    if !added {
        return None;
    }
    rule.with_conditions(pos, neg, goal, fresh).ok()
}

/// One new variable per type, named `x<N>` so as not to collide with the
/// existing `x<N>` variables.
fn fresh_variables(types: &[Type], existing: &[Variable]) -> Vec<Variable> {
    let first = existing
        .iter()
        .filter_map(|variable| variable.name().strip_prefix('x')?.parse::<usize>().ok())
        .max()
        .map_or(0, |n| n + 1);
    types
        .iter()
        .enumerate()
        .map(|(i, type_)| Variable::new(format!("x{}", first + i), *type_))
        .collect()
}

/// All sequences of `variables` matching `types` position by position, in
/// lexicographic order of the sorted variables.
fn variable_combinations(variables: &[Variable], types: &[Type]) -> Vec<Vec<Variable>> {
    if types.is_empty() {
        return vec![vec![]];
    }
    let sorted: Vec<Variable> = variables.iter().copied().sorted().dedup().collect();
    types
        .iter()
        .map(|type_| {
            sorted
                .iter()
                .copied()
                .filter(|variable| variable.is_instance(*type_))
                .collect::<Vec<_>>()
        })
        .multi_cartesian_product()
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteRule;

impl PolicyEditOperator for DeleteRule {
    fn name(&self) -> EditOperatorName {
        EditOperatorName::DeleteRule
    }

    fn get_successors(&self, policy: &LiftedDecisionList) -> Vec<LiftedDecisionList> {
        (0..policy.len())
            .map(|index| policy.with_rule_removed(index))
            .collect()
    }
}

/// Removes one literal from one rule. Parameters no longer mentioned by
/// the rule are dropped with it.
#[derive(Debug, Clone, Copy)]
pub struct DeleteCondition;

impl DeleteCondition {
    fn coarsenings(rule: &LdlRule) -> Vec<LdlRule> {
        let pos = rule.pos_state_preconditions();
        let neg = rule.neg_state_preconditions();
        let goal = rule.goal_preconditions();
        let without = |set: &BTreeSet<LiftedAtom>, atom: &LiftedAtom| {
            let mut set = set.clone();
            set.remove(atom);
            set
        };
        let mut coarsened = vec![];
        for atom in pos {
            coarsened.push(rule.with_conditions(without(pos, atom), neg.clone(), goal.clone(), &[]));
        }
        for atom in neg {
            coarsened.push(rule.with_conditions(pos.clone(), without(neg, atom), goal.clone(), &[]));
        }
        for atom in goal {
            coarsened.push(rule.with_conditions(pos.clone(), neg.clone(), without(goal, atom), &[]));
        }
        coarsened.into_iter().filter_map(Result::ok).collect()
    }
}

impl PolicyEditOperator for DeleteCondition {
    fn name(&self) -> EditOperatorName {
        EditOperatorName::DeleteCondition
    }

    fn get_successors(&self, policy: &LiftedDecisionList) -> Vec<LiftedDecisionList> {
        policy
            .rules()
            .iter()
            .enumerate()
            .flat_map(|(index, rule)| {
                Self::coarsenings(rule)
                    .into_iter()
                    .map(move |coarsened| policy.with_rule_replaced(index, coarsened))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn add_rule_inserts_every_operator_everywhere() {
        let domain = blocks_domain();
        let add_rule = EditOperatorName::AddRule.create(&domain, true);
        let empty = add_rule.get_successors(&LiftedDecisionList::default());
        assert_eq!(empty.len(), 4);
        assert_eq!(empty[0].rules()[0].operator().name().as_str(), "pick-up");
        assert_eq!(
            empty[0].rules()[0].pos_state_preconditions(),
            domain.operator_by_name("pick-up").unwrap().preconditions()
        );

        let one = LiftedDecisionList::new(vec![pick_up_rule(&domain)]);
        let children = add_rule.get_successors(&one);
        assert_eq!(children.len(), 8);
        assert_eq!(children[0].rules()[1], pick_up_rule(&domain));
        assert_eq!(children[4].rules()[0], pick_up_rule(&domain));
    }

    #[test]
    fn add_condition_without_new_vars() {
        let domain = blocks_domain();
        let policy = LiftedDecisionList::new(vec![pick_up_rule(&domain)]);
        let children = EditOperatorName::AddCondition
            .create(&domain, false)
            .get_successors(&policy);
        let holding = domain.predicate_by_name("holding").unwrap();
        let x = pick_up_rule(&domain).parameters()[0];

        assert!(children.iter().all(|child| child.len() == 1));
        assert!(children
            .iter()
            .all(|child| child.rules()[0].parameters() == [x]));
        assert!(children.iter().any(|child| child.rules()[0]
            .neg_state_preconditions()
            .contains(&holding.lift([x]))));
        assert!(children.iter().any(|child| child.rules()[0]
            .goal_preconditions()
            .contains(&holding.lift([x]))));
        // clear and on-table are already positive conditions
        let clear = domain.predicate_by_name("clear").unwrap();
        assert!(!children.iter().any(|child| child.rules()[0]
            .neg_state_preconditions()
            .contains(&clear.lift([x]))));
    }

    #[test]
    fn add_condition_with_new_vars_introduces_parameters() {
        let domain = blocks_domain();
        let policy = LiftedDecisionList::new(vec![pick_up_rule(&domain)]);
        let children = EditOperatorName::AddCondition
            .create(&domain, true)
            .get_successors(&policy);
        let on = domain.predicate_by_name("on").unwrap();
        let block = domain.type_by_name("block").unwrap();
        let x = pick_up_rule(&domain).parameters()[0];
        let x0 = Variable::new("x0", block);

        let extended = children
            .iter()
            .find(|child| child.rules()[0].goal_preconditions().contains(&on.lift([x, x0])))
            .unwrap();
        assert_eq!(extended.rules()[0].parameters(), [x, x0]);
        assert!(!children.iter().any(|child| child.rules()[0]
            .neg_state_preconditions()
            .iter()
            .any(|atom| atom.variables().contains(&x0))));
    }

    #[test]
    fn fresh_variables_avoid_existing_names() {
        let domain = blocks_domain();
        let block = domain.type_by_name("block").unwrap();
        let existing = [Variable::new("x", block), Variable::new("x3", block)];
        let fresh = fresh_variables(&[block, block], &existing);
        assert_eq!(
            fresh.iter().map(|v| v.to_string()).collect::<Vec<_>>(),
            vec!["?x4", "?x5"]
        );
    }

    #[test]
    fn delete_operators() {
        let domain = blocks_domain();
        let policy = LiftedDecisionList::new(vec![pick_up_rule(&domain)]);
        assert_eq!(
            DeleteRule.get_successors(&policy),
            vec![LiftedDecisionList::default()]
        );
        let coarsened = DeleteCondition.get_successors(&policy);
        assert_eq!(coarsened.len(), 2);
        assert!(coarsened
            .iter()
            .all(|child| child.rules()[0].pos_state_preconditions().len() == 1));
    }
}
