use crate::error::PolicyParseError;
use crate::parsed_types::Name;
use crate::structs::{GroundAtom, GroundOperator, LiftedAtom, Object, StripsOperator, Variable};
use internment::ArcIntern;
use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::fmt::{self, Display, Formatter};

#[derive(Debug, PartialEq, Eq, Hash)]
struct RuleData {
    name: Name,
    parameters: Vec<Variable>,
    pos_state_preconditions: BTreeSet<LiftedAtom>,
    neg_state_preconditions: BTreeSet<LiftedAtom>,
    goal_preconditions: BTreeSet<LiftedAtom>,
    operator: StripsOperator,
    action_arguments: Vec<Variable>,
}

/// A lifted rule of a decision list: if the positive state preconditions
/// hold, the negative ones do not, and the goal preconditions are wanted,
/// apply `operator` to `action_arguments`.
///
/// Every variable the rule mentions is one of its parameters, and the
/// action arguments line up with the operator parameters by type.
///
/// Equal rules share one reference counted allocation, freed once the last
/// policy holding the rule is dropped.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LdlRule(ArcIntern<RuleData>);

impl LdlRule {
    pub fn new<N: Into<Name>>(
        name: N,
        parameters: Vec<Variable>,
        pos_state_preconditions: BTreeSet<LiftedAtom>,
        neg_state_preconditions: BTreeSet<LiftedAtom>,
        goal_preconditions: BTreeSet<LiftedAtom>,
        operator: StripsOperator,
        action_arguments: Vec<Variable>,
    ) -> Result<Self, PolicyParseError> {
        let name = name.into();
        let declared: BTreeSet<Variable> = parameters.iter().copied().collect();
        if declared.len() != parameters.len() {
            let duplicate = parameters
                .iter()
                .duplicates()
                .next()
                .map(|variable| variable.to_string())
                .unwrap_or_default();
            return Err(PolicyParseError::DuplicateParameter {
                rule: name.to_string(),
                variable: duplicate,
            });
        }

        for atom in pos_state_preconditions
            .iter()
            .chain(&neg_state_preconditions)
            .chain(&goal_preconditions)
        {
            if let Some(variable) = atom
                .variables()
                .iter()
                .find(|variable| !declared.contains(variable))
            {
                return Err(PolicyParseError::UndeclaredParameter {
                    rule: name.to_string(),
                    variable: variable.to_string(),
                });
            }
        }

        if action_arguments.len() != operator.parameters().len() {
            return Err(PolicyParseError::ArityMismatch {
                rule: name.to_string(),
                name: operator.name().to_string(),
                expected: operator.parameters().len(),
                found: action_arguments.len(),
            });
        }
        for (argument, parameter) in action_arguments.iter().zip(operator.parameters()) {
            if !declared.contains(argument) {
                return Err(PolicyParseError::ActionParameterNotInRule {
                    rule: name.to_string(),
                    variable: argument.to_string(),
                });
            }
            if !argument.is_instance(parameter.type_()) {
                return Err(PolicyParseError::TypeMismatch {
                    rule: name.to_string(),
                    variable: argument.to_string(),
                    expected: parameter.type_().to_string(),
                    found: argument.type_().to_string(),
                });
            }
        }

        Ok(Self(ArcIntern::new(RuleData {
            name,
            parameters,
            pos_state_preconditions,
            neg_state_preconditions,
            goal_preconditions,
            operator,
            action_arguments,
        })))
    }

    pub fn name(&self) -> &Name {
        &self.0.name
    }

    pub fn parameters(&self) -> &[Variable] {
        &self.0.parameters
    }

    pub fn pos_state_preconditions(&self) -> &BTreeSet<LiftedAtom> {
        &self.0.pos_state_preconditions
    }

    pub fn neg_state_preconditions(&self) -> &BTreeSet<LiftedAtom> {
        &self.0.neg_state_preconditions
    }

    pub fn goal_preconditions(&self) -> &BTreeSet<LiftedAtom> {
        &self.0.goal_preconditions
    }

    pub fn operator(&self) -> StripsOperator {
        self.0.operator
    }

    pub fn action_arguments(&self) -> &[Variable] {
        &self.0.action_arguments
    }

    /// Rebuilds the rule with different conditions, keeping the action.
    /// Parameters that are no longer mentioned anywhere are dropped.
    pub fn with_conditions(
        &self,
        pos_state_preconditions: BTreeSet<LiftedAtom>,
        neg_state_preconditions: BTreeSet<LiftedAtom>,
        goal_preconditions: BTreeSet<LiftedAtom>,
        extra_parameters: &[Variable],
    ) -> Result<Self, PolicyParseError> {
        let mentioned: BTreeSet<Variable> = pos_state_preconditions
            .iter()
            .chain(&neg_state_preconditions)
            .chain(&goal_preconditions)
            .flat_map(|atom| atom.variables().iter().copied())
            .chain(self.action_arguments().iter().copied())
            .collect();
        let parameters = self
            .parameters()
            .iter()
            .chain(extra_parameters)
            .copied()
            .filter(|parameter| mentioned.contains(parameter))
            .unique()
            .collect();

        Self::new(
            self.name().clone(),
            parameters,
            pos_state_preconditions,
            neg_state_preconditions,
            goal_preconditions,
            self.operator(),
            self.action_arguments().to_vec(),
        )
    }

    /// Binds the parameters positionally to `objects`. Returns `None` when
    /// the number of objects is wrong or some object has the wrong type.
    pub fn ground(&self, objects: &[Object]) -> Option<GroundLdlRule> {
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
        let action_objects = self
            .action_arguments()
            .iter()
            .map(|argument| binding.get(argument).copied())
            .collect::<Option<Vec<Object>>>()?;

        Some(GroundLdlRule {
            rule: self.clone(),
            objects: objects.to_vec(),
            pos_state_preconditions: ground_all(self.pos_state_preconditions())?,
            neg_state_preconditions: ground_all(self.neg_state_preconditions())?,
            goal_preconditions: ground_all(self.goal_preconditions())?,
            ground_operator: self.operator().ground(&action_objects)?,
        })
    }
}

impl PartialOrd for LdlRule {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LdlRule {
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        self.name()
            .cmp(other.name())
            .then_with(|| self.parameters().cmp(other.parameters()))
            .then_with(|| {
                self.pos_state_preconditions()
                    .cmp(other.pos_state_preconditions())
            })
            .then_with(|| {
                self.neg_state_preconditions()
                    .cmp(other.neg_state_preconditions())
            })
            .then_with(|| self.goal_preconditions().cmp(other.goal_preconditions()))
            .then_with(|| self.operator().cmp(&other.operator()))
            .then_with(|| self.action_arguments().cmp(other.action_arguments()))
    }
}

impl fmt::Debug for LdlRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "LdlRule({})", self.name())
    }
}

fn write_conjunction<I>(f: &mut Formatter<'_>, literals: I) -> fmt::Result
where
    I: IntoIterator<Item = String>,
{
    let literals: Vec<String> = literals.into_iter().collect();
    if literals.is_empty() {
        write!(f, "()")
    } else {
        write!(f, "(and {})", literals.join(" "))
    }
}

impl Display for LdlRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "(:rule {}", self.name())?;
        writeln!(
            f,
            "    :parameters ({})",
            self.parameters()
                .iter()
                .map(|parameter| format!("{} - {}", parameter, parameter.type_()))
                .join(" ")
        )?;
        write!(f, "    :preconditions ")?;
        write_conjunction(
            f,
            self.pos_state_preconditions()
                .iter()
                .map(|atom| atom.to_string())
                .chain(
                    self.neg_state_preconditions()
                        .iter()
                        .map(|atom| format!("(not {})", atom)),
                ),
        )?;
        write!(f, "\n    :goals ")?;
        write_conjunction(
            f,
            self.goal_preconditions().iter().map(|atom| atom.to_string()),
        )?;
        write!(f, "\n    :action ({}", self.operator().name())?;
        for argument in self.action_arguments() {
            write!(f, " {}", argument)?;
        }
        write!(f, "))")
    }
}

/// A rule with every parameter bound to an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroundLdlRule {
    rule: LdlRule,
    objects: Vec<Object>,
    pos_state_preconditions: BTreeSet<GroundAtom>,
    neg_state_preconditions: BTreeSet<GroundAtom>,
    goal_preconditions: BTreeSet<GroundAtom>,
    ground_operator: GroundOperator,
}

impl GroundLdlRule {
    pub fn rule(&self) -> &LdlRule {
        &self.rule
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn pos_state_preconditions(&self) -> &BTreeSet<GroundAtom> {
        &self.pos_state_preconditions
    }

    pub fn neg_state_preconditions(&self) -> &BTreeSet<GroundAtom> {
        &self.neg_state_preconditions
    }

    pub fn goal_preconditions(&self) -> &BTreeSet<GroundAtom> {
        &self.goal_preconditions
    }

    pub fn ground_operator(&self) -> GroundOperator {
        self.ground_operator
    }

    /// Whether the rule fires in `atoms` when pursuing `goal`.
    pub fn is_satisfied(&self, atoms: &BTreeSet<GroundAtom>, goal: &BTreeSet<GroundAtom>) -> bool {
        self.pos_state_preconditions.is_subset(atoms)
            && self.neg_state_preconditions.is_disjoint(atoms)
            && self.goal_preconditions.is_subset(goal)
    }
}
