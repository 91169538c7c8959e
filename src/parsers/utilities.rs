//! Whitespace handling and bracketing combinators shared by the PDDL, plan
//! and policy grammars.

use crate::parsers::{ParseResult, Span};
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag};
use nom::character::complete::{char, multispace1};
use nom::combinator::{opt, recognize, value};
use nom::multi::{many0_count, separated_list0, separated_list1};
use nom::sequence::{delimited, pair, preceded};

/// Skips any mix of whitespace and `;` line comments. Always succeeds.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::skip_trivia;
/// let (rest, ()) = skip_trivia("  ; a comment\n ;another\n(on a b)").unwrap();
/// assert_eq!(rest.fragment(), &"(on a b)");
/// ```
pub fn skip_trivia<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, ()> {
    let comment = recognize(pair(char(';'), opt(is_not("\r\n"))));
    value((), many0_count(alt((multispace1, comment))))(input.into())
}

/// Skips whitespace and line comments before running `inner`.
pub fn leading_whitespace<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, O>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    preceded(skip_trivia, inner)
}

/// Skips whitespace and line comments on both sides of `inner`.
pub fn surrounding_whitespace<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, O>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    delimited(skip_trivia, inner, skip_trivia)
}

/// `( <inner> )`, with trivia allowed anywhere between the tokens.
pub fn parens<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, O>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    delimited(
        leading_whitespace(char('(')),
        leading_whitespace(inner),
        leading_whitespace(char(')')),
    )
}

/// `( <keyword> <inner> )`, e.g. `(and ...)` or `(:init ...)`.
pub fn prefix_expr<'a, F, O>(keyword: &'a str, inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, O>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    parens(preceded(tag(keyword), leading_whitespace(inner)))
}

/// Zero or more `inner`, separated by whitespace.
pub fn space_separated_list0<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, Vec<O>>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    leading_whitespace(separated_list0(multispace1, leading_whitespace(inner)))
}

/// One or more `inner`, separated by whitespace.
pub fn space_separated_list1<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, Vec<O>>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    leading_whitespace(separated_list1(multispace1, leading_whitespace(inner)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed_types::Name;
    use crate::parsers::parse_name;

    #[test]
    fn trivia_without_comments_keeps_text() {
        let (rest, ()) = skip_trivia("(on a b)").unwrap();
        assert_eq!(rest.fragment(), &"(on a b)");

        let (rest, ()) = skip_trivia("; only a comment").unwrap();
        assert!(rest.is_empty());
    }

    #[test]
    fn parens_allow_inner_whitespace() {
        let (rest, name) = parens(parse_name)(Span::new("( content ;note\n )")).unwrap();
        assert!(rest.is_empty());
        assert_eq!(name, Name::from("content"));
    }

    #[test]
    fn prefix_expr_matches_keyword() {
        let mut parser = prefix_expr("either", space_separated_list1(parse_name));
        let (_, names) = parser(Span::new("( either x y)")).unwrap();
        assert_eq!(names, vec![Name::from("x"), Name::from("y")]);
        assert!(parser(Span::new("(or x y)")).is_err());
    }

    #[test]
    fn lists_tolerate_comments_between_items() {
        let (_, names) = space_separated_list0(parse_name)(Span::new("x ; first\n y")).unwrap();
        assert_eq!(names.len(), 2);
        let (_, names) = space_separated_list0(parse_name)(Span::new("")).unwrap();
        assert!(names.is_empty());
        assert!(space_separated_list1(parse_name)(Span::new("")).is_err());
    }
}
