use crate::parsed_types::Name;
use crate::structs::{GroundAtom, LiftedAtom, Object, Type, Variable};
use internment::Intern;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, PartialEq, Eq, Hash)]
struct PredicateData {
    name: Name,
    types: Vec<Type>,
}

/// A predicate symbol with the ordered types of its arguments.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Predicate(Intern<PredicateData>);

impl Predicate {
    pub fn new<N: Into<Name>>(name: N, types: Vec<Type>) -> Self {
        Self(Intern::new(PredicateData {
            name: name.into(),
            types,
        }))
    }

    pub fn name(&self) -> &Name {
        &self.0.name
    }

    pub fn types(&self) -> &[Type] {
        &self.0.types
    }

    pub fn arity(&self) -> usize {
        self.0.types.len()
    }

    pub fn lift<I: IntoIterator<Item = Variable>>(&self, variables: I) -> LiftedAtom {
        LiftedAtom::new(*self, variables.into_iter().collect())
    }

    pub fn ground<I: IntoIterator<Item = Object>>(&self, objects: I) -> GroundAtom {
        GroundAtom::new(*self, objects.into_iter().collect())
    }
}

impl PartialOrd for Predicate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Predicate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(other.name())
            .then_with(|| self.types().cmp(other.types()))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name(), self.arity())
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
