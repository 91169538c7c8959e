//! Terms and the atoms and literals built over them. [`atom`] and
//! [`literal`] are generic over the argument parser so the same grammar
//! serves `:init` facts (names only) and schemas (names or variables).

use crate::parsed_types::{Atom, Literal, Term};
use crate::parsers::{parens, parse_name, parse_variable, prefix_expr};
use crate::parsers::{space_separated_list0, ParseResult, Span};
use nom::branch::alt;
use nom::combinator::map;
use nom::sequence::pair;

/// Parses a term, i.e. `<name> | <variable>`.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::parse_term;
/// # use ldl_search::parsed_types::Term;
/// assert_eq!(parse_term("b1").unwrap().1, Term::new_name("b1"));
/// assert_eq!(parse_term("?top").unwrap().1, Term::new_variable("top"));
/// ```
pub fn parse_term<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, Term> {
    let variable = map(parse_variable, Term::Variable);
    let name = map(parse_name, Term::Name);
    alt((variable, name))(input.into())
}

/// `(<predicate> <arg>*)`, each argument parsed by `argument`.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::{atom, parse_name, Span};
/// # use ldl_search::parsed_types::{Atom, Name};
/// let (_, parsed) = atom(parse_name)(Span::new("(on a b)")).unwrap();
/// assert_eq!(parsed, Atom::new("on", vec![Name::from("a"), Name::from("b")]));
/// ```
pub fn atom<'a, F, O>(argument: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, Atom<O>>
where
    F: FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    map(
        parens(pair(parse_name, space_separated_list0(argument))),
        |(predicate, arguments)| Atom::new(predicate, arguments),
    )
}

/// An atom, or an atom wrapped in `(not ...)`.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::{literal, parse_name, Span};
/// # use ldl_search::parsed_types::{Atom, Literal, Name};
/// let (_, parsed) = literal(parse_name)(Span::new("(not (on b1 b2))")).unwrap();
/// assert_eq!(
///     parsed,
///     Literal::new_not(Atom::new("on", vec![Name::from("b1"), Name::from("b2")]))
/// );
/// ```
pub fn literal<'a, F, O>(argument: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, Literal<O>>
where
    F: Clone + FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    alt((
        map(prefix_expr("not", atom(argument.clone())), Literal::new_not),
        map(atom(argument), Literal::new),
    ))
}

impl crate::parsers::Parser for Term {
    type Item = Term;

    /// See [`parse_term`].
    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_term(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_terms() {
        let (rest, parsed) = atom(parse_term)(Span::new("(can-move ?from b2)")).unwrap();
        assert!(rest.is_empty());
        assert_eq!(parsed.predicate_name().as_str(), "can-move");
        assert_eq!(
            parsed.values(),
            &[Term::new_variable("from"), Term::new_name("b2")]
        );
    }

    #[test]
    fn nullary_atom() {
        let (_, parsed) = atom(parse_term)(Span::new("(handempty)")).unwrap();
        assert!(parsed.values().is_empty());
    }

    #[test]
    fn negation_keyword_is_not_a_name_prefix() {
        let (_, parsed) = literal(parse_term)(Span::new("(not (clear ?x))")).unwrap();
        assert!(parsed.is_negated());
        assert_eq!(parsed.atom().predicate_name().as_str(), "clear");

        let (_, parsed) = literal(parse_term)(Span::new("(nothing ?x)")).unwrap();
        assert!(!parsed.is_negated());
        assert_eq!(parsed.atom().predicate_name().as_str(), "nothing");
    }
}
