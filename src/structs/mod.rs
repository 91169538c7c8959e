//! The semantic data model: types, objects, predicates, atoms, operators,
//! rules, decision lists and tasks. Everything here is immutable once built;
//! the small value types are interned so they are cheap to copy and hash.

mod atom;
mod domain;
mod object;
mod operator;
mod policy;
mod predicate;
mod rule;
mod task;
mod type_;

pub use atom::{GroundAtom, LiftedAtom, ObjectTuple, VariableTuple};
pub use domain::Domain;
pub use object::{Object, Variable};
pub use operator::{GroundOperator, StripsOperator};
pub use policy::LiftedDecisionList;
pub use predicate::Predicate;
pub use rule::{GroundLdlRule, LdlRule};
pub use task::Task;
pub use type_::Type;

/// A symbolic state: the set of ground atoms that currently hold.
pub type State = std::collections::BTreeSet<GroundAtom>;
