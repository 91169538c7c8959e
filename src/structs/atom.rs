use crate::structs::{Object, Predicate, Variable};
use itertools::Itertools;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};

pub type VariableTuple = SmallVec<[Variable; 4]>;
pub type ObjectTuple = SmallVec<[Object; 4]>;

/// A predicate applied to variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LiftedAtom {
    predicate: Predicate,
    variables: VariableTuple,
}

impl LiftedAtom {
    pub fn new(predicate: Predicate, variables: VariableTuple) -> Self {
        Self {
            predicate,
            variables,
        }
    }

    #[inline(always)]
    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    #[inline(always)]
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Substitutes every variable. Returns `None` if some variable is not
    /// bound.
    pub fn ground(&self, binding: &HashMap<Variable, Object>) -> Option<GroundAtom> {
        let objects = self
            .variables
            .iter()
            .map(|variable| binding.get(variable).copied())
            .collect::<Option<ObjectTuple>>()?;
        Some(GroundAtom::new(self.predicate, objects))
    }
}

impl Display for LiftedAtom {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.variables.is_empty() {
            write!(f, "({})", self.predicate)
        } else {
            write!(f, "({} {})", self.predicate, self.variables.iter().join(" "))
        }
    }
}

/// A predicate applied to objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroundAtom {
    predicate: Predicate,
    objects: ObjectTuple,
}

impl GroundAtom {
    pub fn new(predicate: Predicate, objects: ObjectTuple) -> Self {
        Self { predicate, objects }
    }

    #[inline(always)]
    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    #[inline(always)]
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }
}

impl Display for GroundAtom {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.objects.is_empty() {
            write!(f, "({})", self.predicate)
        } else {
            write!(f, "({} {})", self.predicate, self.objects.iter().join(" "))
        }
    }
}
