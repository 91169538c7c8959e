//! Contains propositional condition definitions via the [`PropCondition`] type.

use crate::parsed_types::{Atom, Literal, Term};

/// A condition as written in a precondition, goal or rule body.
#[derive(Debug, Clone, PartialEq)]
pub enum PropCondition {
    Atom(Atom<Term>),
    And(Vec<PropCondition>),
    Or(Vec<PropCondition>),
    Not(Box<PropCondition>),
}

impl PropCondition {
    #[inline(always)]
    pub const fn new_atom(value: Atom<Term>) -> Self {
        Self::Atom(value)
    }

    #[inline(always)]
    pub fn new_and<T: IntoIterator<Item = PropCondition>>(values: T) -> Self {
        Self::And(values.into_iter().collect())
    }

    #[inline(always)]
    pub fn new_or<T: IntoIterator<Item = PropCondition>>(values: T) -> Self {
        Self::Or(values.into_iter().collect())
    }

    #[inline(always)]
    pub fn new_not(value: PropCondition) -> Self {
        Self::Not(Box::new(value))
    }

    /// Flattens nested conjunctions into a list of literals. Returns `None`
    /// if the condition contains a disjunction or a negation of anything
    /// other than an atom.
    pub fn to_literals(&self) -> Option<Vec<Literal<Term>>> {
        let mut literals = vec![];
        self.collect_literals(&mut literals).then_some(literals)
    }

    fn collect_literals(&self, literals: &mut Vec<Literal<Term>>) -> bool {
        match self {
            PropCondition::Atom(atom) => {
                literals.push(Literal::new(atom.clone()));
                true
            }
            PropCondition::And(conditions) => conditions
                .iter()
                .all(|condition| condition.collect_literals(literals)),
            PropCondition::Not(inner) => match inner.as_ref() {
                PropCondition::Atom(atom) => {
                    literals.push(Literal::new_not(atom.clone()));
                    true
                }
                _ => false,
            },
            PropCondition::Or(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on(x: &str, y: &str) -> Atom<Term> {
        Atom::new("on", vec![Term::new_variable(x), Term::new_variable(y)])
    }

    #[test]
    fn nested_conjunctions_flatten() {
        let condition = PropCondition::new_and([
            PropCondition::new_atom(on("x", "y")),
            PropCondition::new_and([PropCondition::new_not(PropCondition::new_atom(on(
                "y", "x",
            )))]),
        ]);

        assert_eq!(
            condition.to_literals(),
            Some(vec![Literal::new(on("x", "y")), Literal::new_not(on("y", "x"))])
        );
    }

    #[test]
    fn disjunctions_are_not_literals() {
        let condition = PropCondition::new_or([PropCondition::new_atom(on("x", "y"))]);
        assert_eq!(condition.to_literals(), None);
    }
}
