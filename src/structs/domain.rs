use crate::error::DomainError;
use crate::parsed_types::{
    Atom as ParsedAtom, Domain as ParsedDomain, Name, Term, TypedNames,
    TypedVariables, TYPE_OBJECT,
};
use crate::parsers::Parser;
use crate::structs::{LiftedAtom, Object, Predicate, StripsOperator, Type, Variable};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use tracing::debug;

/// The semantic view of a PDDL domain: a type forest rooted at `object`,
/// predicates, constants and lifted operators.
#[derive(Debug, Clone)]
pub struct Domain {
    name: Name,
    types: BTreeMap<Name, Type>,
    predicates: BTreeMap<Name, Predicate>,
    constants: Vec<Object>,
    operators: Vec<StripsOperator>,
    static_predicates: BTreeSet<Predicate>,
}

impl Domain {
    pub fn from_path(path: &Path) -> crate::error::Result<Self> {
        let text =
            std::fs::read_to_string(path).map_err(|e| crate::error::Error::io(path, e))?;
        Ok(Self::from_text(&text)?)
    }

    pub fn from_text(text: &str) -> Result<Self, DomainError> {
        let parsed = ParsedDomain::from_document(text)?;
        Self::from_parsed(&parsed)
    }

    pub fn from_parsed(domain: &ParsedDomain) -> Result<Self, DomainError> {
        let types = resolve_types(domain.types())?;

        let constants = domain
            .constants()
            .iter()
            .map(|constant| {
                lookup_type(&types, constant.type_name())
                    .map(|type_| Object::new(constant.value().clone(), type_))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut predicates = BTreeMap::new();
        for definition in domain.predicates() {
            let argument_types = definition
                .parameters()
                .iter()
                .map(|variable| lookup_type(&types, variable.type_name()))
                .collect::<Result<Vec<_>, _>>()?;
            predicates.insert(
                definition.name().clone(),
                Predicate::new(definition.name().clone(), argument_types),
            );
        }

        let mut operators = Vec::with_capacity(domain.actions().len());
        for action in domain.actions() {
            let context = action.name().to_string();
            let parameters = resolve_variables(&types, action.parameters())?;
            let scope: HashMap<&Name, Variable> = action
                .parameters()
                .iter()
                .zip(&parameters)
                .map(|(parsed, variable)| (parsed.value().name(), *variable))
                .collect();

            let literals = match action.precondition() {
                Some(condition) => condition
                    .to_literals()
                    .ok_or_else(|| DomainError::UnsupportedCondition(context.clone()))?,
                None => vec![],
            };
            let mut preconditions = BTreeSet::new();
            let mut negative_preconditions = BTreeSet::new();
            for literal in &literals {
                let atom = lift_atom(&predicates, &scope, literal.atom(), &context)?;
                if literal.is_negated() {
                    negative_preconditions.insert(atom);
                } else {
                    preconditions.insert(atom);
                }
            }

            let mut add_effects = BTreeSet::new();
            let mut delete_effects = BTreeSet::new();
            for effect in action.effects() {
                let atom = lift_atom(&predicates, &scope, effect.atom(), &context)?;
                if effect.is_negated() {
                    delete_effects.insert(atom);
                } else {
                    add_effects.insert(atom);
                }
            }

            operators.push(StripsOperator::new(
                action.name().clone(),
                parameters,
                preconditions,
                negative_preconditions,
                add_effects,
                delete_effects,
            ));
        }

        let static_predicates: BTreeSet<Predicate> = predicates
            .values()
            .copied()
            .filter(|predicate| {
                !operators.iter().any(|operator| {
                    operator
                        .add_effects()
                        .iter()
                        .chain(operator.delete_effects())
                        .any(|atom| atom.predicate() == *predicate)
                })
            })
            .collect();
        debug!(
            domain = %domain.name(),
            types = types.len(),
            predicates = predicates.len(),
            static_predicates = static_predicates.len(),
            operators = operators.len(),
        );

        Ok(Self {
            name: domain.name().clone(),
            types,
            predicates,
            constants,
            operators,
            static_predicates,
        })
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn types(&self) -> impl Iterator<Item = Type> + '_ {
        self.types.values().copied()
    }

    pub fn predicates(&self) -> impl Iterator<Item = Predicate> + '_ {
        self.predicates.values().copied()
    }

    pub fn constants(&self) -> &[Object] {
        &self.constants
    }

    /// Operators in declaration order.
    pub fn operators(&self) -> &[StripsOperator] {
        &self.operators
    }

    /// Predicates that no operator adds or deletes.
    pub fn static_predicates(&self) -> &BTreeSet<Predicate> {
        &self.static_predicates
    }

    pub fn type_by_name(&self, name: &str) -> Option<Type> {
        self.types.get(&Name::from(name)).copied()
    }

    pub fn predicate_by_name(&self, name: &str) -> Option<Predicate> {
        self.predicates.get(&Name::from(name)).copied()
    }

    pub fn operator_by_name(&self, name: &str) -> Option<StripsOperator> {
        self.operators
            .iter()
            .find(|operator| operator.name().as_str() == name)
            .copied()
    }
}

fn lookup_type(types: &BTreeMap<Name, Type>, name: &Name) -> Result<Type, DomainError> {
    types
        .get(name)
        .copied()
        .ok_or_else(|| DomainError::UnknownType(name.to_string()))
}

fn resolve_variables(
    types: &BTreeMap<Name, Type>,
    variables: &TypedVariables,
) -> Result<Vec<Variable>, DomainError> {
    variables
        .iter()
        .map(|typed| {
            lookup_type(types, typed.type_name())
                .map(|type_| Variable::new(typed.value().name().clone(), type_))
        })
        .collect()
}

/// Builds the type forest. Parents may be declared after their children;
/// anything without a declared parent hangs off `object`.
fn resolve_types(declared: &TypedNames) -> Result<BTreeMap<Name, Type>, DomainError> {
    let parents: HashMap<&Name, &Name> = declared
        .iter()
        .map(|typed| (typed.value(), typed.type_name()))
        .collect();
    let mut types = BTreeMap::from([(Name::from(TYPE_OBJECT), Type::object())]);

    fn resolve(
        name: &Name,
        parents: &HashMap<&Name, &Name>,
        types: &mut BTreeMap<Name, Type>,
        visiting: &mut Vec<Name>,
    ) -> Result<Type, DomainError> {
        if let Some(type_) = types.get(name) {
            return Ok(*type_);
        }
        if visiting.contains(name) {
            return Err(DomainError::CyclicType(name.to_string()));
        }
        let parent_name = parents
            .get(name)
            .ok_or_else(|| DomainError::UnknownType(name.to_string()))?;
        visiting.push(name.clone());
        let parent = resolve(parent_name, parents, types, visiting)?;
        visiting.pop();
        let type_ = Type::new(name.clone(), Some(parent));
        types.insert(name.clone(), type_);
        Ok(type_)
    }

    for typed in declared.iter() {
        if typed.value().as_str() != TYPE_OBJECT {
            resolve(typed.value(), &parents, &mut types, &mut vec![])?;
        }
    }
    Ok(types)
}

fn lift_atom(
    predicates: &BTreeMap<Name, Predicate>,
    scope: &HashMap<&Name, Variable>,
    atom: &ParsedAtom<Term>,
    context: &str,
) -> Result<LiftedAtom, DomainError> {
    let predicate = predicates
        .get(atom.predicate_name())
        .copied()
        .ok_or_else(|| DomainError::UnknownPredicate(atom.predicate_name().to_string()))?;
    if predicate.arity() != atom.len() {
        return Err(DomainError::ArityMismatch {
            context: context.to_string(),
            predicate: predicate.name().to_string(),
            expected: predicate.arity(),
            found: atom.len(),
        });
    }

    let variables = atom
        .iter()
        .zip(predicate.types())
        .map(|(term, expected)| {
            let variable = match term {
                Term::Variable(variable) => scope.get(variable.name()).copied().ok_or_else(|| {
                    DomainError::UndeclaredVariable {
                        context: context.to_string(),
                        variable: variable.to_string(),
                    }
                })?,
                Term::Name(name) => {
                    return Err(DomainError::ConstantInSchema {
                        context: context.to_string(),
                        name: name.to_string(),
                    })
                }
            };
            if variable.is_instance(*expected) {
                Ok(variable)
            } else {
                Err(DomainError::TypeMismatch {
                    object: variable.to_string(),
                    expected: expected.to_string(),
                    found: variable.type_().to_string(),
                })
            }
        })
        .collect::<Result<_, _>>()?;
    Ok(LiftedAtom::new(predicate, variables))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn blocks_domain_resolves() {
        let domain = blocks_domain();
        assert_eq!(domain.name().as_str(), "blocks");
        assert_eq!(domain.predicates().count(), 5);
        assert_eq!(domain.operators().len(), 4);
        assert_eq!(domain.operators()[0].name().as_str(), "pick-up");

        let block = domain.type_by_name("block").unwrap();
        assert_eq!(block.parent(), Some(Type::object()));

        let stack = domain.operator_by_name("stack").unwrap();
        assert_eq!(stack.parameters().len(), 2);
        assert_eq!(stack.preconditions().len(), 2);
        assert_eq!(stack.add_effects().len(), 3);
        assert_eq!(stack.delete_effects().len(), 2);
    }

    #[test]
    fn no_static_predicates_in_blocks() {
        assert!(blocks_domain().static_predicates().is_empty());
    }

    #[test]
    fn static_predicates_are_never_changed() {
        let domain = Domain::from_text(LOGISTICS_DOMAIN_TEXT).unwrap();
        let static_names: Vec<&str> = domain
            .static_predicates()
            .iter()
            .map(|predicate| predicate.name().as_str())
            .collect();
        assert_eq!(static_names, vec!["connected", "is-truck"]);
    }

    #[test]
    fn type_hierarchy_with_forward_references() {
        let domain = Domain::from_text(LOGISTICS_DOMAIN_TEXT).unwrap();
        let truck = domain.type_by_name("truck").unwrap();
        let vehicle = domain.type_by_name("vehicle").unwrap();
        assert!(truck.is_subtype_of(vehicle));
        assert!(truck.is_subtype_of(Type::object()));
    }

    #[test]
    fn unknown_predicate_in_operator() {
        let text = r#"(define (domain broken)
            (:predicates (p ?x))
            (:action a :parameters (?x) :precondition (q ?x) :effect (p ?x)))"#;
        assert_eq!(
            Domain::from_text(text).unwrap_err(),
            DomainError::UnknownPredicate("q".to_string())
        );
    }

    #[test]
    fn cyclic_types_are_rejected() {
        let text = r#"(define (domain cyclic)
            (:types a - b b - a)
            (:predicates))"#;
        assert!(matches!(
            Domain::from_text(text),
            Err(DomainError::CyclicType(_))
        ));
    }
}
