//! Provides parsers for names and variables.

use crate::parsed_types::{Name, Variable};
use crate::parsers::{ParseResult, Span};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1, char};
use nom::combinator::{map, recognize};
use nom::multi::many0;
use nom::sequence::{pair, preceded};

/// Parses a name, i.e. a letter followed by letters, digits, `-` or `_`.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::parse_name;
/// # use ldl_search::parsed_types::Name;
/// let (_, name) = parse_name("on-table rest").unwrap();
/// assert_eq!(name, Name::from("on-table"));
///
/// assert!(parse_name("-abc").is_err());
/// assert!(parse_name("0124").is_err());
/// ```
pub fn parse_name<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, Name> {
    map(
        recognize(pair(
            alpha1,
            many0(alt((alphanumeric1, tag("-"), tag("_")))),
        )),
        |span: Span| Name::from(*span.fragment()),
    )(input.into())
}

/// Parses a variable, i.e. `?<name>`.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::parse_variable;
/// # use ldl_search::parsed_types::Variable;
/// let (_, var) = parse_variable("?x1").unwrap();
/// assert_eq!(var, Variable::from("x1"));
/// assert!(parse_variable("x1").is_err());
/// ```
pub fn parse_variable<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, Variable> {
    map(preceded(char('?'), parse_name), Variable::new)(input.into())
}

impl crate::parsers::Parser for Name {
    type Item = Name;

    /// See [`parse_name`].
    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_name(input)
    }
}

impl crate::parsers::Parser for Variable {
    type Item = Variable;

    /// See [`parse_variable`].
    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_variable(input)
    }
}
