//! Provides parsers for domain definitions and the schemas inside them.

use crate::parsed_types::{
    ActionSchema, Domain, Literal, Name, PredicateDefinition, PropCondition, Term, TypedNames,
};
use crate::parsers::{
    leading_whitespace, literal, parens, parse_conjunction, parse_name, parse_term,
    parse_variable, prefix_expr, space_separated_list0, space_separated_list1,
    surrounding_whitespace, typed_list, ParseResult, Span,
};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{map, opt, recognize};
use nom::sequence::{pair, preceded, tuple};

/// Parses `(:requirements :strips :typing ...)`. Requirement keys are kept
/// verbatim including the leading colon.
pub fn parse_requirements<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, Vec<Name>> {
    prefix_expr(
        ":requirements",
        space_separated_list1(map(
            recognize(preceded(char(':'), parse_name)),
            |span: Span| Name::from(*span.fragment()),
        )),
    )(input.into())
}

/// Parses type definitions, i.e. `(:types <typed list (name)>)`.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::parse_type_definitions;
/// let (_, types) = parse_type_definitions("(:types block table - physob)").unwrap();
/// assert_eq!(types.len(), 2);
/// assert_eq!(types[1].type_name().as_str(), "physob");
/// ```
pub fn parse_type_definitions<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, TypedNames> {
    prefix_expr(":types", typed_list(parse_name))(input.into())
}

/// Parses `(<name> <typed list (variable)>)` from a `:predicates` section.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::parse_predicate_definition;
/// let (_, predicate) = parse_predicate_definition("(at ?x - physob ?y - location)").unwrap();
/// assert_eq!(predicate.name().as_str(), "at");
/// assert_eq!(predicate.arity(), 2);
/// ```
pub fn parse_predicate_definition<'a, T: Into<Span<'a>>>(
    input: T,
) -> ParseResult<'a, PredicateDefinition> {
    map(
        parens(pair(parse_name, typed_list(parse_variable))),
        |(name, parameters)| PredicateDefinition { name, parameters },
    )(input.into())
}

/// Effects are a conjunction of literals, or a single literal.
fn parse_effects<'a>(input: Span<'a>) -> ParseResult<'a, Vec<Literal<Term>>> {
    leading_whitespace(alt((
        prefix_expr("and", space_separated_list0(literal(parse_term))),
        map(literal(parse_term), |effect| vec![effect]),
    )))(input)
}

/// Parses `(:action <name> :parameters (...) :precondition ... :effect ...)`.
/// Both `:precondition` and `:effect` may be omitted.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::parse_action_schema;
/// let input = r#"(:action putdown
///                    :parameters  (?ob - block)
///                    :precondition (holding ?ob)
///                    :effect (and (clear ?ob) (handempty) (ontable ?ob)
///                        (not (holding ?ob))))"#;
///
/// let (_, action) = parse_action_schema(input).unwrap();
/// assert_eq!(action.name().as_str(), "putdown");
/// assert_eq!(action.parameters().len(), 1);
/// assert_eq!(action.add_effects().count(), 3);
/// assert_eq!(action.delete_effects().count(), 1);
/// ```
pub fn parse_action_schema<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, ActionSchema> {
    let parameters = preceded(
        tag(":parameters"),
        leading_whitespace(parens(typed_list(parse_variable))),
    );
    let precondition = map(
        preceded(tag(":precondition"), parse_conjunction),
        PropCondition::new_and,
    );
    let effects = preceded(tag(":effect"), parse_effects);

    map(
        prefix_expr(
            ":action",
            tuple((
                parse_name,
                leading_whitespace(parameters),
                opt(leading_whitespace(precondition)),
                opt(leading_whitespace(effects)),
            )),
        ),
        |(name, parameters, precondition, effects)| ActionSchema {
            name,
            parameters,
            precondition,
            effects: effects.unwrap_or_default(),
        },
    )(input.into())
}

/// Parses a STRIPS domain definition with optional typing, constants and
/// negative preconditions.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::parse_domain;
/// let input = r#"
/// (define
///     (domain blocks)
///     (:requirements :strips :typing)
///     (:types block)
///     (:predicates
///          (on-table ?b - block)
///          (holding ?b - block)
///          (handempty)
///     )
///
///     (:action pick-up
///         :parameters (?b - block)
///         :precondition (and (on-table ?b) (handempty))
///         :effect (and (holding ?b) (not (on-table ?b)) (not (handempty)))
///     )
///)"#;
///
/// let (remainder, domain) = parse_domain(input).unwrap();
///
/// assert!(remainder.is_empty());
/// assert_eq!(domain.name().as_str(), "blocks");
/// assert_eq!(domain.requirements().len(), 2);
/// assert_eq!(domain.types().len(), 1);
/// assert_eq!(domain.predicates().len(), 3);
/// assert_eq!(domain.actions().len(), 1);
/// ```
pub fn parse_domain<'a, T: Into<Span<'a>>>(input: T) -> ParseResult<'a, Domain> {
    map(
        surrounding_whitespace(prefix_expr(
            "define",
            tuple((
                prefix_expr("domain", parse_name),
                opt(leading_whitespace(parse_requirements)),
                opt(leading_whitespace(parse_type_definitions)),
                opt(leading_whitespace(prefix_expr(
                    ":constants",
                    typed_list(parse_name),
                ))),
                opt(leading_whitespace(prefix_expr(
                    ":predicates",
                    space_separated_list0(parse_predicate_definition),
                ))),
                space_separated_list0(parse_action_schema),
            )),
        )),
        |(name, requirements, types, constants, predicates, actions)| Domain {
            name,
            requirements: requirements.unwrap_or_default(),
            types: types.unwrap_or_default(),
            constants: constants.unwrap_or_default(),
            predicates: predicates.unwrap_or_default(),
            actions,
        },
    )(input.into())
}

impl crate::parsers::Parser for Domain {
    type Item = Domain;

    /// See [`parse_domain`].
    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_domain(input)
    }
}

impl crate::parsers::Parser for ActionSchema {
    type Item = ActionSchema;

    /// See [`parse_action_schema`].
    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_action_schema(input)
    }
}
