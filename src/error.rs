//! Error types. Malformed input produces one of these; ordinary outcomes such
//! as a policy abstaining or a search running out of budget do not.

use std::path::PathBuf;
use thiserror::Error;

/// A low level syntax error located in the source text. Lines and columns
/// are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {line}, column {column}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new<S: Into<String>>(line: usize, column: usize, message: S) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }

    /// Builds an error for the byte `offset` into `input`, counting columns
    /// in characters.
    pub fn at_offset<S: Into<String>>(input: &str, offset: usize, message: S) -> Self {
        let offset = offset.min(input.len());
        let prefix = input.get(..offset).unwrap_or(input);
        let line = prefix.matches('\n').count() + 1;
        let line_start = prefix.rfind('\n').map_or(0, |index| index + 1);
        let column = prefix[line_start..].chars().count() + 1;
        Self::new(line, column, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyParseError {
    #[error("malformed policy text: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("rule `{rule}` refers to unknown predicate `{predicate}`")]
    UnknownPredicate { rule: String, predicate: String },
    #[error("rule `{rule}` refers to unknown type `{type_name}`")]
    UnknownType { rule: String, type_name: String },
    #[error("rule `{rule}` refers to unknown operator `{operator}`")]
    UnknownOperator { rule: String, operator: String },
    #[error("rule `{rule}` uses undeclared parameter `{variable}`")]
    UndeclaredParameter { rule: String, variable: String },
    #[error("rule `{rule}` declares parameter `{variable}` more than once")]
    DuplicateParameter { rule: String, variable: String },
    #[error("action of rule `{rule}` uses `{variable}` which is not a rule parameter")]
    ActionParameterNotInRule { rule: String, variable: String },
    #[error("rule `{rule}` uses constant `{name}`, rules may only refer to parameters")]
    ConstantArgument { rule: String, name: String },
    #[error("rule `{rule}` has a negative goal condition on `{predicate}`")]
    NegativeGoal { rule: String, predicate: String },
    #[error("rule `{rule}` has a condition that is not a conjunction of literals")]
    Disjunction { rule: String },
    #[error("rule `{rule}` applies `{name}` to {found} arguments, expected {expected}")]
    ArityMismatch {
        rule: String,
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("rule `{rule}` uses `{variable}` of type `{found}` where `{expected}` is required")]
    TypeMismatch {
        rule: String,
        variable: String,
        expected: String,
        found: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("malformed PDDL: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("unknown type `{0}`")]
    UnknownType(String),
    #[error("type `{0}` is its own ancestor")]
    CyclicType(String),
    #[error("unknown predicate `{0}`")]
    UnknownPredicate(String),
    #[error("unknown object `{0}`")]
    UnknownObject(String),
    #[error("unknown operator `{0}`")]
    UnknownOperator(String),
    #[error("`{context}` refers to undeclared variable `{variable}`")]
    UndeclaredVariable { context: String, variable: String },
    #[error("`{predicate}` takes {expected} arguments, found {found} in `{context}`")]
    ArityMismatch {
        context: String,
        predicate: String,
        expected: usize,
        found: usize,
    },
    #[error("object `{object}` of type `{found}` cannot be used as `{expected}`")]
    TypeMismatch {
        object: String,
        expected: String,
        found: String,
    },
    #[error("`{context}` uses constant `{name}`, operators may only refer to parameters")]
    ConstantInSchema { context: String, name: String },
    #[error("`{0}` uses a condition that is not a conjunction of literals")]
    UnsupportedCondition(String),
    #[error("problem `{problem}` is for domain `{found}`, expected `{expected}`")]
    DomainMismatch {
        problem: String,
        expected: String,
        found: String,
    },
    #[error("problem `{0}` has negative literals in its initial state or goal")]
    NegativeLiteral(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("unknown {kind} `{name}`")]
    UnknownName { kind: &'static str, name: String },
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{demos} demonstrations supplied for {problems} problems, supply one per problem")]
    DemoCountMismatch { demos: usize, problems: usize },
    #[error("demonstrations are only used by the `demo-plan-comparison` heuristic, not `{0}`")]
    DemosRequirePlanComparison(String),
    #[error("demonstration {task} is invalid at step {step}: {reason}")]
    InvalidDemo {
        task: usize,
        step: usize,
        reason: String,
    },
    #[error("at least one training problem is required")]
    NoProblems,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("search requires at least one initial state")]
    NoInitialStates,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    PolicyParse(#[from] PolicyParseError),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error("failed to read `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Error {
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_map_to_lines_and_columns() {
        let text = "(a\n  (b c)\n)";
        let error = SyntaxError::at_offset(text, 5, "here");
        assert_eq!((error.line, error.column), (2, 3));
        assert_eq!(error.to_string(), "here at line 2, column 3");

        let error = SyntaxError::at_offset(text, 0, "start");
        assert_eq!((error.line, error.column), (1, 1));
    }

    #[test]
    fn offset_past_end_is_clamped() {
        let error = SyntaxError::at_offset("ab", 10, "eof");
        assert_eq!((error.line, error.column), (1, 3));
    }

    #[test]
    fn errors_convert_into_umbrella() {
        let error: Error = ConfigError::NoProblems.into();
        assert!(matches!(error, Error::Config(ConfigError::NoProblems)));
    }
}
