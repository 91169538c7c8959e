//! `nom` parsers for PDDL domains and problems, plan files and policy text.

mod domain;
mod name;
mod plan;
mod policy;
mod problem;
mod prop_condition;
mod terms;
mod typed_list;
mod utilities;

use crate::error::SyntaxError;

pub trait Parser {
    type Item;

    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item>;

    fn parse_span(input: Span) -> ParseResult<Self::Item> {
        Self::parse(input)
    }

    /// Parse a string slice into the desired type. Discards any remaining
    /// input.
    fn from_str(input: &str) -> Result<Self::Item, nom::Err<ParseError>> {
        let (_, value) = Self::parse(input)?;
        Ok(value)
    }

    /// Parse a whole document into the desired type. Anything other than
    /// whitespace and comments after the parsed item is an error.
    fn from_document(input: &str) -> Result<Self::Item, SyntaxError> {
        parse_document(input, Self::parse_span)
    }
}

pub type Span<'a> = nom_locate::LocatedSpan<&'a str>;

pub type ParseError<'a> = nom_greedyerror::GreedyError<Span<'a>, nom::error::ErrorKind>;

pub type ParseResult<'a, T, E = ParseError<'a>> = nom::IResult<Span<'a>, T, E>;

/// Runs `parser` over the entire `input`, translating failures into a
/// [`SyntaxError`] pointing at the furthest position any branch reached.
pub fn parse_document<'a, O, F>(input: &'a str, mut parser: F) -> Result<O, SyntaxError>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    match parser(Span::new(input)) {
        Ok((remaining, value)) => {
            let (remaining, ()) = skip_trivia(remaining).unwrap_or((remaining, ()));
            if remaining.fragment().is_empty() {
                Ok(value)
            } else {
                Err(SyntaxError::at_offset(
                    input,
                    remaining.location_offset(),
                    "unexpected trailing input",
                ))
            }
        }
        Err(nom::Err::Incomplete(_)) => Err(SyntaxError::at_offset(
            input,
            input.len(),
            "unexpected end of input",
        )),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            let offset = nom_greedyerror::error_position(&e).unwrap_or(0);
            Err(SyntaxError::at_offset(input, offset, "invalid syntax"))
        }
    }
}

// Parsers
pub use domain::{
    parse_action_schema, parse_domain, parse_predicate_definition, parse_requirements,
    parse_type_definitions,
};
pub use name::{parse_name, parse_variable};
pub use plan::parse_plan;
pub use policy::{check_balanced_parentheses, parse_policy, parse_rule_definition};
pub use problem::parse_problem;
pub use prop_condition::{parse_conjunction, parse_prop_condition};
pub use terms::{atom, literal, parse_term};

// Parser combinators
pub use typed_list::typed_list;

pub use utilities::skip_trivia;
pub(crate) use utilities::{
    leading_whitespace, parens, prefix_expr, space_separated_list0, space_separated_list1,
    surrounding_whitespace,
};
