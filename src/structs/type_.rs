use crate::parsed_types::{Name, TYPE_OBJECT};
use internment::Intern;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, PartialEq, Eq, Hash)]
struct TypeData {
    name: Name,
    parent: Option<Type>,
}

/// An object type. Types form a forest through their optional parent, and
/// every declared type descends from the implicit `object` root.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Type(Intern<TypeData>);

impl Type {
    pub fn new<N: Into<Name>>(name: N, parent: Option<Type>) -> Self {
        Self(Intern::new(TypeData {
            name: name.into(),
            parent,
        }))
    }

    /// The implicit root type.
    pub fn object() -> Self {
        Self::new(TYPE_OBJECT, None)
    }

    pub fn name(&self) -> &Name {
        &self.0.name
    }

    pub fn parent(&self) -> Option<Type> {
        self.0.parent
    }

    /// Whether `self` is `other` or one of its descendants.
    pub fn is_subtype_of(&self, other: Type) -> bool {
        let mut current = Some(*self);
        while let Some(t) = current {
            if t == other {
                return true;
            }
            current = t.parent();
        }
        false
    }
}

impl PartialOrd for Type {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Type {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(other.name())
            .then_with(|| self.parent().cmp(&other.parent()))
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self.name())
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
