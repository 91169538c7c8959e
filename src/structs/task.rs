use crate::error::DomainError;
use crate::parsed_types::{Atom as ParsedAtom, Name, NameLiteral, Problem};
use crate::parsers::{parse_document, parse_plan, Parser};
use crate::structs::{Domain, GroundAtom, GroundOperator, Object};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// A planning problem over a [`Domain`]: the objects (including the domain
/// constants), the initial atoms and the goal atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    name: Name,
    objects: Vec<Object>,
    init: BTreeSet<GroundAtom>,
    goal: BTreeSet<GroundAtom>,
}

impl Task {
    pub fn new<N: Into<Name>>(
        name: N,
        objects: impl IntoIterator<Item = Object>,
        init: BTreeSet<GroundAtom>,
        goal: BTreeSet<GroundAtom>,
    ) -> Self {
        let objects: BTreeSet<Object> = objects.into_iter().collect();
        Self {
            name: name.into(),
            objects: objects.into_iter().collect(),
            init,
            goal,
        }
    }

    pub fn from_path(path: &Path, domain: &Domain) -> crate::error::Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| crate::error::Error::io(path, e))?;
        Ok(Self::from_text(&text, domain)?)
    }

    pub fn from_text(text: &str, domain: &Domain) -> Result<Self, DomainError> {
        let problem = Problem::from_document(text)?;
        Self::from_parsed(&problem, domain)
    }

    pub fn from_parsed(problem: &Problem, domain: &Domain) -> Result<Self, DomainError> {
        if problem.domain() != domain.name() {
            return Err(DomainError::DomainMismatch {
                problem: problem.name().to_string(),
                expected: domain.name().to_string(),
                found: problem.domain().to_string(),
            });
        }

        let mut objects: BTreeMap<Name, Object> = domain
            .constants()
            .iter()
            .map(|constant| (constant.name().clone(), *constant))
            .collect();
        for object in problem.objects().iter() {
            let type_ = domain
                .type_by_name(object.type_name())
                .ok_or_else(|| DomainError::UnknownType(object.type_name().to_string()))?;
            objects.insert(object.value().clone(), Object::new(object.value().clone(), type_));
        }

        let resolve_literals = |literals: &[NameLiteral]| {
            literals
                .iter()
                .map(|literal| {
                    if literal.is_negated() {
                        return Err(DomainError::NegativeLiteral(problem.name().to_string()));
                    }
                    ground_atom(domain, &objects, literal.atom())
                })
                .collect::<Result<BTreeSet<_>, _>>()
        };
        let init = resolve_literals(problem.init())?;
        let goal = resolve_literals(problem.goal())?;

        Ok(Self::new(
            problem.name().clone(),
            objects.into_values(),
            init,
            goal,
        ))
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    /// All objects, sorted.
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn init(&self) -> &BTreeSet<GroundAtom> {
        &self.init
    }

    pub fn goal(&self) -> &BTreeSet<GroundAtom> {
        &self.goal
    }

    pub fn object_by_name(&self, name: &str) -> Option<Object> {
        self.objects
            .iter()
            .find(|object| object.name().as_str() == name)
            .copied()
    }

    /// Resolves plan text, one `(operator object ...)` step per line, into
    /// ground operators of this task.
    pub fn parse_plan(&self, domain: &Domain, text: &str) -> Result<Vec<GroundOperator>, DomainError> {
        parse_document(text, parse_plan)?
            .iter()
            .map(|step| self.ground_operator(domain, step))
            .collect()
    }

    pub fn ground_operator(
        &self,
        domain: &Domain,
        step: &ParsedAtom<Name>,
    ) -> Result<GroundOperator, DomainError> {
        let operator = domain
            .operator_by_name(step.predicate_name())
            .ok_or_else(|| DomainError::UnknownOperator(step.predicate_name().to_string()))?;
        let objects = step
            .iter()
            .map(|name| {
                self.object_by_name(name)
                    .ok_or_else(|| DomainError::UnknownObject(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if objects.len() != operator.parameters().len() {
            return Err(DomainError::ArityMismatch {
                context: step.predicate_name().to_string(),
                predicate: operator.name().to_string(),
                expected: operator.parameters().len(),
                found: objects.len(),
            });
        }
        operator.ground(&objects).ok_or_else(|| {
            let (object, parameter) = objects
                .iter()
                .zip(operator.parameters())
                .find(|(object, parameter)| !object.is_instance(parameter.type_()))
                .map(|(object, parameter)| (*object, *parameter))
                .unzip();
            DomainError::TypeMismatch {
                object: object.map(|o| o.to_string()).unwrap_or_default(),
                expected: parameter.map(|p| p.type_().to_string()).unwrap_or_default(),
                found: object.map(|o| o.type_().to_string()).unwrap_or_default(),
            }
        })
    }
}

fn ground_atom(
    domain: &Domain,
    objects: &BTreeMap<Name, Object>,
    atom: &ParsedAtom<Name>,
) -> Result<GroundAtom, DomainError> {
    let predicate = domain
        .predicate_by_name(atom.predicate_name())
        .ok_or_else(|| DomainError::UnknownPredicate(atom.predicate_name().to_string()))?;
    if predicate.arity() != atom.len() {
        return Err(DomainError::ArityMismatch {
            context: atom.predicate_name().to_string(),
            predicate: predicate.name().to_string(),
            expected: predicate.arity(),
            found: atom.len(),
        });
    }
    let arguments = atom
        .iter()
        .zip(predicate.types())
        .map(|(name, expected)| {
            let object = objects
                .get(name)
                .copied()
                .ok_or_else(|| DomainError::UnknownObject(name.to_string()))?;
            if object.is_instance(*expected) {
                Ok(object)
            } else {
                Err(DomainError::TypeMismatch {
                    object: object.to_string(),
                    expected: expected.to_string(),
                    found: object.type_().to_string(),
                })
            }
        })
        .collect::<Result<_, _>>()?;
    Ok(GroundAtom::new(predicate, arguments))
}
