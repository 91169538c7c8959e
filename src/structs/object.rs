use crate::parsed_types::Name;
use crate::structs::Type;
use internment::Intern;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

#[derive(Debug, PartialEq, Eq, Hash)]
struct TermData {
    name: Name,
    type_: Type,
}

fn compare_terms(a: &TermData, b: &TermData) -> Ordering {
    a.name.cmp(&b.name).then_with(|| a.type_.cmp(&b.type_))
}

/// A typed constant of a task.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Object(Intern<TermData>);

impl Object {
    pub fn new<N: Into<Name>>(name: N, type_: Type) -> Self {
        Self(Intern::new(TermData {
            name: name.into(),
            type_,
        }))
    }

    pub fn name(&self) -> &Name {
        &self.0.name
    }

    pub fn type_(&self) -> Type {
        self.0.type_
    }

    pub fn is_instance(&self, type_: Type) -> bool {
        self.type_().is_subtype_of(type_)
    }
}

/// A typed variable of a lifted atom, operator or rule. The name is stored
/// without the leading `?`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Variable(Intern<TermData>);

impl Variable {
    pub fn new<N: Into<Name>>(name: N, type_: Type) -> Self {
        Self(Intern::new(TermData {
            name: name.into(),
            type_,
        }))
    }

    pub fn name(&self) -> &Name {
        &self.0.name
    }

    pub fn type_(&self) -> Type {
        self.0.type_
    }

    pub fn is_instance(&self, type_: Type) -> bool {
        self.type_().is_subtype_of(type_)
    }
}

macro_rules! impl_term_traits {
    ($term:ident, $prefix:literal) => {
        impl PartialOrd for $term {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $term {
            fn cmp(&self, other: &Self) -> Ordering {
                compare_terms(&self.0, &other.0)
            }
        }

        impl fmt::Debug for $term {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}:{}", $prefix, self.name(), self.type_())
            }
        }

        impl Display for $term {
            fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.name())
            }
        }
    };
}

impl_term_traits!(Object, "");
impl_term_traits!(Variable, "?");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objects_sort_by_name() {
        let block = Type::new("block", Some(Type::object()));
        let mut objects = vec![Object::new("c", block), Object::new("a", block)];
        objects.sort();
        assert_eq!(objects[0].name().as_str(), "a");
        assert_eq!(objects[0].to_string(), "a");
    }

    #[test]
    fn variables_print_with_question_mark() {
        let block = Type::new("block", Some(Type::object()));
        let x = Variable::new("x", block);
        assert_eq!(x.to_string(), "?x");
        assert!(x.is_instance(Type::object()));
    }
}
