//! Typed names and lists of them, i.e. `?x ?y - block ?r - robot`.

use crate::parsed_types::{Name, Variable};
use std::ops::Deref;

/// The implicit root type of every PDDL type hierarchy.
pub const TYPE_OBJECT: &str = "object";

/// A value together with the name of its declared type.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Typed<T> {
    value: T,
    type_name: Name,
}

impl<T> Typed<T> {
    pub fn new<N: Into<Name>>(value: T, type_name: N) -> Self {
        Self {
            value,
            type_name: type_name.into(),
        }
    }

    /// Values without an explicit type are of type `object`.
    pub fn new_object(value: T) -> Self {
        Self::new(value, TYPE_OBJECT)
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn type_name(&self) -> &Name {
        &self.type_name
    }
}

#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct TypedList<T>(Vec<Typed<T>>);

impl<T> TypedList<T> {
    pub fn new(list: Vec<Typed<T>>) -> Self {
        Self(list)
    }

    pub fn values(&self) -> &[Typed<T>] {
        &self.0
    }
}

impl<T> FromIterator<Typed<T>> for TypedList<T> {
    fn from_iter<I: IntoIterator<Item = Typed<T>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> Deref for TypedList<T> {
    type Target = [Typed<T>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> IntoIterator for TypedList<T> {
    type Item = Typed<T>;
    type IntoIter = std::vec::IntoIter<Typed<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

pub type TypedNames = TypedList<Name>;
pub type TypedVariables = TypedList<Variable>;
