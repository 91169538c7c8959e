use crate::parsed_types::Name;
use crate::structs::{GroundAtom, LiftedAtom, Object, ObjectTuple, Variable};
use internment::Intern;
use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

#[derive(Debug, PartialEq, Eq, Hash)]
struct OperatorData {
    name: Name,
    parameters: Vec<Variable>,
    preconditions: BTreeSet<LiftedAtom>,
    negative_preconditions: BTreeSet<LiftedAtom>,
    add_effects: BTreeSet<LiftedAtom>,
    delete_effects: BTreeSet<LiftedAtom>,
}

/// A lifted STRIPS operator with typed parameters, positive and negative
/// preconditions and add/delete effects.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StripsOperator(Intern<OperatorData>);

impl StripsOperator {
    pub fn new<N: Into<Name>>(
        name: N,
        parameters: Vec<Variable>,
        preconditions: BTreeSet<LiftedAtom>,
        negative_preconditions: BTreeSet<LiftedAtom>,
        add_effects: BTreeSet<LiftedAtom>,
        delete_effects: BTreeSet<LiftedAtom>,
    ) -> Self {
        Self(Intern::new(OperatorData {
            name: name.into(),
            parameters,
            preconditions,
            negative_preconditions,
            add_effects,
            delete_effects,
        }))
    }

    pub fn name(&self) -> &Name {
        &self.0.name
    }

    pub fn parameters(&self) -> &[Variable] {
        &self.0.parameters
    }

    pub fn preconditions(&self) -> &BTreeSet<LiftedAtom> {
        &self.0.preconditions
    }

    pub fn negative_preconditions(&self) -> &BTreeSet<LiftedAtom> {
        &self.0.negative_preconditions
    }

    pub fn add_effects(&self) -> &BTreeSet<LiftedAtom> {
        &self.0.add_effects
    }

    pub fn delete_effects(&self) -> &BTreeSet<LiftedAtom> {
        &self.0.delete_effects
    }

    /// Grounds the operator by binding its parameters positionally. Returns
    /// `None` if the number of objects does not match or an object has the
    /// wrong type.
    pub fn ground(&self, objects: &[Object]) -> Option<GroundOperator> {
        if objects.len() != self.parameters().len()
            || !objects
                .iter()
                .zip(self.parameters())
                .all(|(object, parameter)| object.is_instance(parameter.type_()))
        {
            return None;
        }
        let binding: HashMap<Variable, Object> = self
            .parameters()
            .iter()
            .copied()
            .zip(objects.iter().copied())
            .collect();
        let ground_all = |atoms: &BTreeSet<LiftedAtom>| -> Option<BTreeSet<GroundAtom>> {
            atoms.iter().map(|atom| atom.ground(&binding)).collect()
        };

        Some(GroundOperator(Intern::new(GroundOperatorData {
            operator: *self,
            objects: objects.iter().copied().collect(),
            preconditions: ground_all(self.preconditions())?,
            negative_preconditions: ground_all(self.negative_preconditions())?,
            add_effects: ground_all(self.add_effects())?,
            delete_effects: ground_all(self.delete_effects())?,
        })))
    }
}

impl PartialOrd for StripsOperator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for StripsOperator {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(other.name())
            .then_with(|| self.parameters().cmp(other.parameters()))
    }
}

impl fmt::Debug for StripsOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({} {:?})", self.name(), self.parameters())
    }
}

impl Display for StripsOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct GroundOperatorData {
    operator: StripsOperator,
    objects: ObjectTuple,
    preconditions: BTreeSet<GroundAtom>,
    negative_preconditions: BTreeSet<GroundAtom>,
    add_effects: BTreeSet<GroundAtom>,
    delete_effects: BTreeSet<GroundAtom>,
}

/// A fully instantiated operator. Two ground operators are equal, and are
/// ordered, by operator name and then by their objects.
#[derive(Clone, Copy)]
pub struct GroundOperator(Intern<GroundOperatorData>);

impl GroundOperator {
    pub fn operator(&self) -> StripsOperator {
        self.0.operator
    }

    pub fn name(&self) -> &Name {
        self.0.operator.name()
    }

    pub fn objects(&self) -> &[Object] {
        &self.0.objects
    }

    pub fn preconditions(&self) -> &BTreeSet<GroundAtom> {
        &self.0.preconditions
    }

    pub fn negative_preconditions(&self) -> &BTreeSet<GroundAtom> {
        &self.0.negative_preconditions
    }

    pub fn add_effects(&self) -> &BTreeSet<GroundAtom> {
        &self.0.add_effects
    }

    pub fn delete_effects(&self) -> &BTreeSet<GroundAtom> {
        &self.0.delete_effects
    }

    pub fn is_applicable(&self, state: &BTreeSet<GroundAtom>) -> bool {
        self.preconditions().is_subset(state)
            && self.negative_preconditions().is_disjoint(state)
    }

    /// `(state \ delete) ∪ add`.
    pub fn apply(&self, state: &BTreeSet<GroundAtom>) -> BTreeSet<GroundAtom> {
        let mut successor: BTreeSet<GroundAtom> = state
            .difference(self.delete_effects())
            .cloned()
            .collect();
        successor.extend(self.add_effects().iter().cloned());
        successor
    }
}

impl PartialEq for GroundOperator {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.objects() == other.objects()
    }
}

impl Eq for GroundOperator {}

impl Hash for GroundOperator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
        self.objects().hash(state);
    }
}

impl PartialOrd for GroundOperator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroundOperator {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name()
            .cmp(other.name())
            .then_with(|| self.objects().cmp(other.objects()))
    }
}

impl fmt::Debug for GroundOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for GroundOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.objects().is_empty() {
            write!(f, "({})", self.name())
        } else {
            write!(f, "({} {})", self.name(), self.objects().iter().join(" "))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_utils::*;

    #[test]
    fn ground_operator_applies_effects() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let pick_up = domain.operator_by_name("pick-up").unwrap();
        let a = task.object_by_name("a").unwrap();

        let action = pick_up.ground(&[a]).unwrap();
        assert_eq!(action.to_string(), "(pick-up a)");
        assert!(action.is_applicable(task.init()));

        let next = action.apply(task.init());
        assert!(next.contains(&ground(&domain, &task, "holding", &["a"])));
        assert!(!next.contains(&ground(&domain, &task, "on-table", &["a"])));
        assert!(!action.is_applicable(&next));
    }

    #[test]
    fn grounding_checks_arity() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let stack = domain.operator_by_name("stack").unwrap();
        let a = task.object_by_name("a").unwrap();
        assert!(stack.ground(&[a]).is_none());
    }

    #[test]
    fn ground_operators_order_by_name_then_objects() {
        let domain = blocks_domain();
        let task = blocks_task(&domain);
        let pick_up = domain.operator_by_name("pick-up").unwrap();
        let put_down = domain.operator_by_name("put-down").unwrap();
        let a = task.object_by_name("a").unwrap();
        let b = task.object_by_name("b").unwrap();

        let mut actions = vec![
            put_down.ground(&[a]).unwrap(),
            pick_up.ground(&[b]).unwrap(),
            pick_up.ground(&[a]).unwrap(),
        ];
        actions.sort();
        let names: Vec<String> = actions.iter().map(|a| a.to_string()).collect();
        assert_eq!(names, vec!["(pick-up a)", "(pick-up b)", "(put-down a)"]);
    }
}
