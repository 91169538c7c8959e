use crate::structs::{Domain, GroundAtom, Object, Predicate, Task};
use internment::Intern;
use std::collections::BTreeSet;

#[derive(Debug, PartialEq, Eq, Hash)]
struct ScopeData {
    objects: Vec<Object>,
    static_predicates: BTreeSet<Predicate>,
    static_init: BTreeSet<GroundAtom>,
}

/// Everything about a task that grounding depends on: the sorted objects,
/// the static predicates and the initial atoms over those predicates.
///
/// Scopes are interned, so two tasks with the same objects and static facts
/// share a scope and hence share cached groundings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroundingScope(Intern<ScopeData>);

impl GroundingScope {
    pub fn new(
        objects: impl IntoIterator<Item = Object>,
        static_predicates: BTreeSet<Predicate>,
        init: &BTreeSet<GroundAtom>,
    ) -> Self {
        let objects: BTreeSet<Object> = objects.into_iter().collect();
        let static_init = init
            .iter()
            .filter(|atom| static_predicates.contains(&atom.predicate()))
            .cloned()
            .collect();
        Self(Intern::new(ScopeData {
            objects: objects.into_iter().collect(),
            static_predicates,
            static_init,
        }))
    }

    pub fn for_task(domain: &Domain, task: &Task) -> Self {
        Self::new(
            task.objects().iter().copied(),
            domain.static_predicates().clone(),
            task.init(),
        )
    }

    /// A scope without static filtering.
    pub fn unfiltered(objects: impl IntoIterator<Item = Object>) -> Self {
        Self::new(objects, BTreeSet::new(), &BTreeSet::new())
    }

    /// Sorted, without duplicates.
    pub fn objects(&self) -> &[Object] {
        &self.0.objects
    }

    pub fn static_predicates(&self) -> &BTreeSet<Predicate> {
        &self.0.static_predicates
    }

    pub fn static_init(&self) -> &BTreeSet<GroundAtom> {
        &self.0.static_init
    }

    pub fn is_static(&self, predicate: Predicate) -> bool {
        self.0.static_predicates.contains(&predicate)
    }
}
