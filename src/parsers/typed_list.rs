//! Provides the [`typed_list`] combinator.

use crate::parsed_types::{Typed, TypedList};
use crate::parsers::{leading_whitespace, parse_name, space_separated_list1, ParseResult, Span};
use nom::character::complete::char;
use nom::combinator::{map, opt};
use nom::multi::many0;
use nom::sequence::{pair, preceded};

/// Parses a typed list, i.e. groups of `x1 x2 ... - type`. Elements without a
/// trailing `- type` are of type `object`.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::{typed_list, parse_variable, Span};
/// # use ldl_search::parsed_types::{Typed, Variable};
/// let (_, list) = typed_list(parse_variable)(Span::new("?x ?y - block ?z")).unwrap();
/// assert_eq!(list.values(), &[
///     Typed::new(Variable::from("x"), "block"),
///     Typed::new(Variable::from("y"), "block"),
///     Typed::new_object(Variable::from("z")),
/// ]);
/// ```
pub fn typed_list<'a, F, O>(inner: F) -> impl FnMut(Span<'a>) -> ParseResult<'a, TypedList<O>>
where
    F: Clone + FnMut(Span<'a>) -> ParseResult<'a, O>,
{
    let group = pair(
        space_separated_list1(inner),
        opt(preceded(
            leading_whitespace(char('-')),
            leading_whitespace(parse_name),
        )),
    );

    map(many0(group), |groups| {
        groups
            .into_iter()
            .flat_map(|(values, type_name)| {
                values.into_iter().map(move |value| match &type_name {
                    Some(type_name) => Typed::new(value, type_name.clone()),
                    None => Typed::new_object(value),
                })
            })
            .collect()
    })
}
