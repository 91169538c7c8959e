//! Provides parsers for conditions.

use crate::parsed_types::PropCondition;
use crate::parsers::{atom, leading_whitespace, parse_term, ParseResult, Span};
use crate::parsers::{prefix_expr, space_separated_list0};
use nom::branch::alt;
use nom::character::complete::char;
use nom::combinator::{map, value};
use nom::sequence::pair;

/// Parser for conditions built from atoms, `and`, `or` and `not`.
///
/// ## Examples
/// ```
/// # use ldl_search::parsers::parse_prop_condition;
/// # use ldl_search::parsed_types::*;
/// let (_, condition) = parse_prop_condition("(and (not (on ?x b1)) (clear ?x))").unwrap();
/// assert_eq!(condition, PropCondition::new_and([
///     PropCondition::new_not(PropCondition::new_atom(Atom::new(
///         "on",
///         vec![Term::new_variable("x"), Term::new_name("b1")],
///     ))),
///     PropCondition::new_atom(Atom::new("clear", vec![Term::new_variable("x")])),
/// ]));
/// ```
pub fn parse_prop_condition<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, PropCondition> {
    let and = map(
        prefix_expr("and", space_separated_list0(parse_prop_condition)),
        PropCondition::new_and,
    );
    let or = map(
        prefix_expr("or", space_separated_list0(parse_prop_condition)),
        PropCondition::new_or,
    );
    let not = map(
        prefix_expr("not", parse_prop_condition),
        PropCondition::new_not,
    );
    let atom = map(atom(parse_term), PropCondition::new_atom);

    alt((and, or, not, atom))(input.into())
}

/// Parses the body of a `:precondition`, `:preconditions`, `:goals` or
/// `:goal` section into a list of top-level conditions. `()` is the empty
/// conjunction and a bare condition is a conjunction of one.
pub fn parse_conjunction<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, Vec<PropCondition>> {
    let empty = value(vec![], pair(char('('), leading_whitespace(char(')'))));
    let and = prefix_expr("and", space_separated_list0(parse_prop_condition));
    let single = map(parse_prop_condition, |condition| vec![condition]);

    leading_whitespace(alt((empty, and, single)))(input.into())
}

impl crate::parsers::Parser for PropCondition {
    type Item = PropCondition;

    /// See [`parse_prop_condition`].
    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_prop_condition(input)
    }
}
