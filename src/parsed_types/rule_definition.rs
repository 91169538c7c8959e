//! Syntax trees for policies, i.e. lists of `(:rule ...)` blocks.

use crate::parsed_types::{Atom, Name, PropCondition, Term, TypedVariables};

/// A single rule block as written in policy text.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDefinition {
    name: Name,
    parameters: TypedVariables,
    preconditions: Vec<PropCondition>,
    goals: Vec<PropCondition>,
    action: Atom<Term>,
}

impl RuleDefinition {
    pub fn new(
        name: Name,
        parameters: TypedVariables,
        preconditions: Vec<PropCondition>,
        goals: Vec<PropCondition>,
        action: Atom<Term>,
    ) -> Self {
        Self {
            name,
            parameters,
            preconditions,
            goals,
            action,
        }
    }

    pub const fn name(&self) -> &Name {
        &self.name
    }

    pub const fn parameters(&self) -> &TypedVariables {
        &self.parameters
    }

    pub fn preconditions(&self) -> &[PropCondition] {
        &self.preconditions
    }

    pub fn goals(&self) -> &[PropCondition] {
        &self.goals
    }

    pub const fn action(&self) -> &Atom<Term> {
        &self.action
    }
}

/// An ordered sequence of rule blocks, optionally wrapped in
/// `(define (policy <name>) ...)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolicyDefinition {
    name: Option<Name>,
    rules: Vec<RuleDefinition>,
}

impl PolicyDefinition {
    pub fn new(name: Option<Name>, rules: Vec<RuleDefinition>) -> Self {
        Self { name, rules }
    }

    pub fn name(&self) -> Option<&Name> {
        self.name.as_ref()
    }

    pub fn rules(&self) -> &[RuleDefinition] {
        &self.rules
    }
}
