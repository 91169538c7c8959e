//! Domain syntax trees: the [`Domain`] itself along with the predicate and
//! action schemas it declares.

use crate::parsed_types::{Literal, Name, PropCondition, Term, TypedNames, TypedVariables};

/// A parsed `(define (domain ...))` block. Sections missing from the source
/// are left empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Domain {
    pub(crate) name: Name,
    pub(crate) requirements: Vec<Name>,
    pub(crate) types: TypedNames,
    pub(crate) constants: TypedNames,
    pub(crate) predicates: Vec<PredicateDefinition>,
    pub(crate) actions: Vec<ActionSchema>,
}

impl Domain {
    pub const fn name(&self) -> &Name {
        &self.name
    }

    /// Requirement keys, including their leading colon.
    pub fn requirements(&self) -> &[Name] {
        &self.requirements
    }

    pub const fn types(&self) -> &TypedNames {
        &self.types
    }

    pub const fn constants(&self) -> &TypedNames {
        &self.constants
    }

    pub fn predicates(&self) -> &[PredicateDefinition] {
        &self.predicates
    }

    pub fn actions(&self) -> &[ActionSchema] {
        &self.actions
    }

    pub fn action(&self, name: &str) -> Option<&ActionSchema> {
        self.actions.iter().find(|action| action.name.as_str() == name)
    }
}

/// `(<name> <typed list (variable)>)` inside `:predicates`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PredicateDefinition {
    pub(crate) name: Name,
    pub(crate) parameters: TypedVariables,
}

impl PredicateDefinition {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn parameters(&self) -> &TypedVariables {
        &self.parameters
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }
}

/// A STRIPS action schema. The precondition is kept as written; effects are
/// literals where a positive literal adds its atom and a negative one
/// deletes it.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSchema {
    pub(crate) name: Name,
    pub(crate) parameters: TypedVariables,
    pub(crate) precondition: Option<PropCondition>,
    pub(crate) effects: Vec<Literal<Term>>,
}

impl ActionSchema {
    pub const fn name(&self) -> &Name {
        &self.name
    }

    pub const fn parameters(&self) -> &TypedVariables {
        &self.parameters
    }

    pub fn precondition(&self) -> Option<&PropCondition> {
        self.precondition.as_ref()
    }

    pub fn effects(&self) -> &[Literal<Term>] {
        &self.effects
    }

    pub fn add_effects(&self) -> impl Iterator<Item = &Literal<Term>> {
        self.effects.iter().filter(|effect| !effect.is_negated())
    }

    pub fn delete_effects(&self) -> impl Iterator<Item = &Literal<Term>> {
        self.effects.iter().filter(|effect| effect.is_negated())
    }
}
