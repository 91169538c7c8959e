//! Syntax trees produced by [`crate::parsers`]. Nothing in here is resolved
//! against a domain yet; names are plain strings and validation happens when
//! the trees are converted into [`crate::structs`] values.

mod atom;
mod domain;
mod name;
mod problem;
mod prop_condition;
mod rule_definition;
mod typed;

pub use atom::{Atom, Literal, Term};
pub use domain::{ActionSchema, Domain, PredicateDefinition};
pub use name::{Name, Variable};
pub use problem::Problem;
pub use prop_condition::PropCondition;
pub use rule_definition::{PolicyDefinition, RuleDefinition};
pub use typed::{Typed, TypedList, TypedNames, TypedVariables, TYPE_OBJECT};

/// A literal over object names, as found in `:init` and `:goal` sections.
pub type NameLiteral = Literal<Name>;
