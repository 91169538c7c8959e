//! Contains the [`Problem`] type.

use crate::parsed_types::{Name, NameLiteral, TypedNames};

/// A parsed `(define (problem ...))` block. The goal is always stored as a
/// flat conjunction of literals.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub(crate) name: Name,
    pub(crate) domain: Name,
    pub(crate) requirements: Vec<Name>,
    pub(crate) objects: TypedNames,
    pub(crate) init: Vec<NameLiteral>,
    pub(crate) goal: Vec<NameLiteral>,
}

impl Problem {
    pub const fn name(&self) -> &Name {
        &self.name
    }

    /// Name of the domain this problem claims to belong to.
    pub const fn domain(&self) -> &Name {
        &self.domain
    }

    pub fn requirements(&self) -> &[Name] {
        &self.requirements
    }

    pub const fn objects(&self) -> &TypedNames {
        &self.objects
    }

    pub fn init(&self) -> &[NameLiteral] {
        &self.init
    }

    pub fn goal(&self) -> &[NameLiteral] {
        &self.goal
    }
}
