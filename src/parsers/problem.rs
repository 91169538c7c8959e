//! Provides parsers for problem definitions.

use crate::parsed_types::{NameLiteral, Problem};
use crate::parsers::{
    leading_whitespace, literal, parse_name, parse_requirements, prefix_expr,
    space_separated_list0, surrounding_whitespace, typed_list, ParseResult, Span,
};
use nom::branch::alt;
use nom::combinator::{map, opt};
use nom::sequence::tuple;

fn parse_goal<'a>(input: Span<'a>) -> ParseResult<'a, Vec<NameLiteral>> {
    prefix_expr(
        ":goal",
        alt((
            prefix_expr("and", space_separated_list0(literal(parse_name))),
            map(literal(parse_name), |goal| vec![goal]),
        )),
    )(input)
}

/// Parses a problem definition.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::parse_problem;
/// let input = r#"(define (problem two-blocks)
///         (:domain blocks)
///         (:objects a b - block)
///         (:init (on-table a) (on-table b) (handempty))
///         (:goal (and (holding a))))"#;
///
/// let (_, problem) = parse_problem(input).unwrap();
/// assert_eq!(problem.name().as_str(), "two-blocks");
/// assert_eq!(problem.objects().len(), 2);
/// assert_eq!(problem.init().len(), 3);
/// assert_eq!(problem.goal().len(), 1);
/// ```
pub fn parse_problem<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, Problem> {
    map(
        surrounding_whitespace(prefix_expr(
            "define",
            tuple((
                prefix_expr("problem", parse_name),
                leading_whitespace(prefix_expr(":domain", parse_name)),
                opt(leading_whitespace(parse_requirements)),
                opt(leading_whitespace(prefix_expr(
                    ":objects",
                    typed_list(parse_name),
                ))),
                leading_whitespace(prefix_expr(
                    ":init",
                    space_separated_list0(literal(parse_name)),
                )),
                leading_whitespace(parse_goal),
            )),
        )),
        |(name, domain, requirements, objects, init, goal)| Problem {
            name,
            domain,
            requirements: requirements.unwrap_or_default(),
            objects: objects.unwrap_or_default(),
            init,
            goal,
        },
    )(input.into())
}

impl crate::parsers::Parser for Problem {
    type Item = Problem;

    /// See [`parse_problem`].
    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_problem(input)
    }
}
