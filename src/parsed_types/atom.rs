//! Atoms and literals over terms. The argument type is a parameter: facts in
//! `:init` use [`Name`]s, while schemas and rules use [`Term`]s.

use crate::parsed_types::{Name, Variable};
use std::ops::Deref;

/// A predicate (or operator) name applied to arguments.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Atom<T> {
    predicate_name: Name,
    values: Vec<T>,
}

impl<T> Atom<T> {
    pub fn new<N: Into<Name>>(predicate_name: N, values: Vec<T>) -> Self {
        Self {
            predicate_name: predicate_name.into(),
            values,
        }
    }

    pub fn predicate_name(&self) -> &Name {
        &self.predicate_name
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
}

impl<T> Deref for Atom<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.values
    }
}

/// An atom, possibly negated.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Literal<T> {
    atom: Atom<T>,
    negated: bool,
}

impl<T> Literal<T> {
    pub const fn new(atom: Atom<T>) -> Self {
        Self {
            atom,
            negated: false,
        }
    }

    pub const fn new_not(atom: Atom<T>) -> Self {
        Self {
            atom,
            negated: true,
        }
    }

    pub const fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn atom(&self) -> &Atom<T> {
        &self.atom
    }

    pub fn into_atom(self) -> Atom<T> {
        self.atom
    }
}

impl<T> From<Atom<T>> for Literal<T> {
    fn from(atom: Atom<T>) -> Self {
        Self::new(atom)
    }
}

/// An argument in a schema: an object name or a `?variable`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Term {
    Name(Name),
    Variable(Variable),
}

impl Term {
    pub fn new_name<N: Into<Name>>(name: N) -> Self {
        Self::Name(name.into())
    }

    pub fn new_variable<V: Into<Variable>>(var: V) -> Self {
        Self::Variable(var.into())
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Self::Variable(variable) => Some(variable),
            Self::Name(_) => None,
        }
    }
}

impl From<Name> for Term {
    fn from(value: Name) -> Self {
        Self::Name(value)
    }
}

impl From<Variable> for Term {
    fn from(value: Variable) -> Self {
        Self::Variable(value)
    }
}
