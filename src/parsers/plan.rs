//! Provides a parser for plans, i.e. one `(<operator> <object>*)` step per
//! line with optional `;` comments.

use crate::parsed_types::{Atom, Name};
use crate::parsers::{atom, parse_name, space_separated_list0, surrounding_whitespace};
use crate::parsers::{ParseResult, Span};

/// Parses a sequence of plan steps.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::parse_plan;
/// let (_, steps) = parse_plan("(pick-up a)\n(stack a b)\n; cost = 2 (unit cost)").unwrap();
/// assert_eq!(steps.len(), 2);
/// assert_eq!(steps[1].predicate_name().as_str(), "stack");
/// ```
pub fn parse_plan<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, Vec<Atom<Name>>> {
    surrounding_whitespace(space_separated_list0(atom(parse_name)))(input.into())
}
