use crate::error::PolicyParseError;
use crate::parsed_types::{Atom as ParsedAtom, Name, PolicyDefinition, PropCondition, RuleDefinition, Term};
use crate::parsers::parse_policy;
use crate::structs::{Domain, LdlRule, LiftedAtom, Variable};
use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};

/// An ordered list of lifted rules. The first rule with a satisfied
/// grounding decides the action, so order matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LiftedDecisionList {
    rules: Vec<LdlRule>,
}

impl LiftedDecisionList {
    pub fn new(rules: Vec<LdlRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[LdlRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Parses policy text against `domain`. Either the whole policy is
    /// valid or an error is returned.
    pub fn parse(text: &str, domain: &Domain) -> Result<Self, PolicyParseError> {
        let definition = parse_policy(text)?;
        Self::from_definition(&definition, domain)
    }

    pub fn from_definition(
        definition: &PolicyDefinition,
        domain: &Domain,
    ) -> Result<Self, PolicyParseError> {
        definition
            .rules()
            .iter()
            .map(|rule| resolve_rule(rule, domain))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    pub fn with_rule_inserted(&self, index: usize, rule: LdlRule) -> Self {
        let mut rules = self.rules.clone();
        rules.insert(index.min(rules.len()), rule);
        Self::new(rules)
    }

    pub fn with_rule_replaced(&self, index: usize, rule: LdlRule) -> Self {
        let mut rules = self.rules.clone();
        if let Some(slot) = rules.get_mut(index) {
            *slot = rule;
        }
        Self::new(rules)
    }

    pub fn with_rule_removed(&self, index: usize) -> Self {
        let mut rules = self.rules.clone();
        if index < rules.len() {
            rules.remove(index);
        }
        Self::new(rules)
    }
}

impl Display for LiftedDecisionList {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "(define (policy)")?;
        for rule in &self.rules {
            for line in rule.to_string().lines() {
                writeln!(f, "  {}", line)?;
            }
        }
        write!(f, ")")
    }
}

struct RuleScope<'a> {
    rule: &'a Name,
    domain: &'a Domain,
    variables: HashMap<&'a Name, Variable>,
}

impl<'a> RuleScope<'a> {
    fn variable(&self, term: &Term) -> Result<Variable, PolicyParseError> {
        match term {
            Term::Variable(variable) => self.variables.get(variable.name()).copied().ok_or_else(
                || PolicyParseError::UndeclaredParameter {
                    rule: self.rule.to_string(),
                    variable: variable.to_string(),
                },
            ),
            Term::Name(name) => Err(PolicyParseError::ConstantArgument {
                rule: self.rule.to_string(),
                name: name.to_string(),
            }),
        }
    }

    fn lift(&self, atom: &ParsedAtom<Term>) -> Result<LiftedAtom, PolicyParseError> {
        let predicate = self
            .domain
            .predicate_by_name(atom.predicate_name())
            .ok_or_else(|| PolicyParseError::UnknownPredicate {
                rule: self.rule.to_string(),
                predicate: atom.predicate_name().to_string(),
            })?;
        if predicate.arity() != atom.len() {
            return Err(PolicyParseError::ArityMismatch {
                rule: self.rule.to_string(),
                name: predicate.name().to_string(),
                expected: predicate.arity(),
                found: atom.len(),
            });
        }
        let variables = atom
            .iter()
            .zip(predicate.types())
            .map(|(term, expected)| {
                let variable = self.variable(term)?;
                if variable.is_instance(*expected) {
                    Ok(variable)
                } else {
                    Err(PolicyParseError::TypeMismatch {
                        rule: self.rule.to_string(),
                        variable: variable.to_string(),
                        expected: expected.to_string(),
                        found: variable.type_().to_string(),
                    })
                }
            })
            .collect::<Result<_, _>>()?;
        Ok(LiftedAtom::new(predicate, variables))
    }

    fn literals(
        &self,
        conditions: &[PropCondition],
    ) -> Result<(BTreeSet<LiftedAtom>, BTreeSet<LiftedAtom>), PolicyParseError> {
        let mut positive = BTreeSet::new();
        let mut negative = BTreeSet::new();
        for condition in conditions {
            let literals = condition
                .to_literals()
                .ok_or_else(|| PolicyParseError::Disjunction {
                    rule: self.rule.to_string(),
                })?;
            for literal in literals {
                let atom = self.lift(literal.atom())?;
                if literal.is_negated() {
                    negative.insert(atom);
                } else {
                    positive.insert(atom);
                }
            }
        }
        Ok((positive, negative))
    }
}

fn resolve_rule(definition: &RuleDefinition, domain: &Domain) -> Result<LdlRule, PolicyParseError> {
    let rule = definition.name();
    let parameters = definition
        .parameters()
        .iter()
        .map(|typed| {
            domain
                .type_by_name(typed.type_name())
                .map(|type_| Variable::new(typed.value().name().clone(), type_))
                .ok_or_else(|| PolicyParseError::UnknownType {
                    rule: rule.to_string(),
                    type_name: typed.type_name().to_string(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let scope = RuleScope {
        rule,
        domain,
        variables: definition
            .parameters()
            .iter()
            .zip(&parameters)
            .map(|(typed, variable)| (typed.value().name(), *variable))
            .collect(),
    };

    let (pos_state_preconditions, neg_state_preconditions) =
        scope.literals(definition.preconditions())?;
    let (goal_preconditions, negative_goals) = scope.literals(definition.goals())?;
    if let Some(atom) = negative_goals.first() {
        return Err(PolicyParseError::NegativeGoal {
            rule: rule.to_string(),
            predicate: atom.predicate().name().to_string(),
        });
    }

    let action = definition.action();
    let operator = domain
        .operator_by_name(action.predicate_name())
        .ok_or_else(|| PolicyParseError::UnknownOperator {
            rule: rule.to_string(),
            operator: action.predicate_name().to_string(),
        })?;
    let action_arguments = action
        .iter()
        .map(|term| match scope.variable(term) {
            Err(PolicyParseError::UndeclaredParameter { rule, variable }) => {
                Err(PolicyParseError::ActionParameterNotInRule { rule, variable })
            }
            other => other,
        })
        .collect::<Result<Vec<_>, _>>()?;

    LdlRule::new(
        rule.clone(),
        parameters,
        pos_state_preconditions,
        neg_state_preconditions,
        goal_preconditions,
        operator,
        action_arguments,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    const STACK_POLICY: &str = r#"
    (define (policy stacking)
      (:rule stack-goal
        :parameters (?x - block ?y - block)
        :preconditions (and (holding ?x) (clear ?y))
        :goals (on ?x ?y)
        :action (stack ?x ?y))
      (:rule pick-up-misplaced
        :parameters (?x - block ?y - block)
        :preconditions (and (clear ?x) (on-table ?x) (handempty) (not (on ?x ?y)))
        :goals (and (on ?x ?y))
        :action (pick-up ?x)))
    "#;

    #[test]
    fn parses_rules_in_order() {
        let domain = blocks_domain();
        let policy = LiftedDecisionList::parse(STACK_POLICY, &domain).unwrap();
        assert_eq!(policy.len(), 2);
        assert_eq!(policy.rules()[0].name().as_str(), "stack-goal");
        assert_eq!(policy.rules()[1].neg_state_preconditions().len(), 1);
        assert_eq!(policy.rules()[1].goal_preconditions().len(), 1);
    }

    #[test]
    fn display_round_trips() {
        let domain = blocks_domain();
        let policy = LiftedDecisionList::parse(STACK_POLICY, &domain).unwrap();
        let text = policy.to_string();
        assert!(text.starts_with("(define (policy)"));
        assert_eq!(LiftedDecisionList::parse(&text, &domain).unwrap(), policy);

        let empty = LiftedDecisionList::default();
        assert_eq!(LiftedDecisionList::parse(&empty.to_string(), &domain).unwrap(), empty);
    }

    fn parse_error(text: &str) -> PolicyParseError {
        LiftedDecisionList::parse(text, &blocks_domain()).unwrap_err()
    }

    #[test]
    fn unbalanced_parentheses() {
        let error = parse_error("(:rule r :parameters (?x - block) :action (pick-up ?x)");
        assert!(matches!(error, PolicyParseError::Syntax(_)));
    }

    #[test]
    fn unknown_names() {
        assert!(matches!(
            parse_error("(:rule r :parameters (?x - block) :preconditions (sparkly ?x) :action (pick-up ?x))"),
            PolicyParseError::UnknownPredicate { .. }
        ));
        assert!(matches!(
            parse_error("(:rule r :parameters (?x - gizmo) :action (pick-up ?x))"),
            PolicyParseError::UnknownType { .. }
        ));
        assert!(matches!(
            parse_error("(:rule r :parameters (?x - block) :action (juggle ?x))"),
            PolicyParseError::UnknownOperator { .. }
        ));
    }

    #[test]
    fn undeclared_variables() {
        assert!(matches!(
            parse_error("(:rule r :parameters (?x - block) :preconditions (on ?x ?y) :action (pick-up ?x))"),
            PolicyParseError::UndeclaredParameter { .. }
        ));
        assert!(matches!(
            parse_error("(:rule r :parameters (?x - block) :action (pick-up ?y))"),
            PolicyParseError::ActionParameterNotInRule { .. }
        ));
    }

    #[test]
    fn negative_goals_and_disjunctions() {
        assert!(matches!(
            parse_error("(:rule r :parameters (?x - block) :goals (not (holding ?x)) :action (pick-up ?x))"),
            PolicyParseError::NegativeGoal { .. }
        ));
        assert!(matches!(
            parse_error("(:rule r :parameters (?x - block) :preconditions (or (clear ?x) (holding ?x)) :action (pick-up ?x))"),
            PolicyParseError::Disjunction { .. }
        ));
    }
}
