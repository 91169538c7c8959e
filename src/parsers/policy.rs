//! Provides parsers for policy text, i.e. lifted decision lists written as a
//! sequence of `(:rule ...)` blocks.

use crate::error::SyntaxError;
use crate::parsed_types::{PolicyDefinition, RuleDefinition};
use crate::parsers::{
    atom, leading_whitespace, parens, parse_conjunction, parse_name, parse_term, parse_variable,
    prefix_expr, space_separated_list0, space_separated_list1, surrounding_whitespace,
    typed_list, ParseResult, Span,
};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::char;
use nom::combinator::{cut, eof, map, opt};
use nom::sequence::{pair, preceded, terminated, tuple};

/// Parses a single rule block. Once `(:rule` has been read the block is
/// committed: any later mismatch is a failure located where it occurred.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::{parse_rule_definition, Span};
/// let input = r#"(:rule pick-up-any
///     :parameters (?x - block)
///     :preconditions (and (on-table ?x) (not (holding ?x)))
///     :goals ()
///     :action (pick-up ?x))"#;
/// let (_, rule) = parse_rule_definition(Span::new(input)).unwrap();
/// assert_eq!(rule.name().as_str(), "pick-up-any");
/// assert_eq!(rule.preconditions().len(), 2);
/// assert!(rule.goals().is_empty());
/// ```
pub fn parse_rule_definition(input: Span) -> ParseResult<RuleDefinition> {
    let parameters = preceded(
        tag(":parameters"),
        leading_whitespace(parens(typed_list(parse_variable))),
    );
    let preconditions = preceded(
        alt((tag(":preconditions"), tag(":precondition"))),
        parse_conjunction,
    );
    let goals = preceded(alt((tag(":goals"), tag(":goal"))), parse_conjunction);
    let action = preceded(tag(":action"), leading_whitespace(atom(parse_term)));

    let body = tuple((
        leading_whitespace(parse_name),
        leading_whitespace(parameters),
        map(opt(leading_whitespace(preconditions)), Option::unwrap_or_default),
        map(opt(leading_whitespace(goals)), Option::unwrap_or_default),
        leading_whitespace(action),
    ));

    map(
        preceded(
            pair(
                leading_whitespace(char('(')),
                leading_whitespace(tag(":rule")),
            ),
            cut(terminated(body, leading_whitespace(char(')')))),
        ),
        |(name, parameters, preconditions, goals, action)| {
            RuleDefinition::new(name, parameters, preconditions, goals, action)
        },
    )(input)
}

fn parse_policy_body(input: Span) -> ParseResult<PolicyDefinition> {
    let wrapped = map(
        prefix_expr(
            "define",
            tuple((
                prefix_expr("policy", opt(parse_name)),
                space_separated_list0(parse_rule_definition),
            )),
        ),
        |(name, rules)| PolicyDefinition::new(name, rules),
    );
    let bare = map(space_separated_list1(parse_rule_definition), |rules| {
        PolicyDefinition::new(None, rules)
    });
    let empty = map(eof, |_| PolicyDefinition::new(None, vec![]));

    surrounding_whitespace(alt((wrapped, bare, empty)))(input)
}

/// Parses a complete policy document. The parentheses are checked for
/// balance before any grammar is applied so that the common failure of a
/// truncated or over-closed rule gets a precise location.
///
/// ## Example
/// ```
/// # use ldl_search::parsers::parse_policy;
/// let policy = parse_policy("(define (policy)\n  (:rule r :parameters () :action (noop)))").unwrap();
/// assert_eq!(policy.rules().len(), 1);
///
/// assert!(parse_policy("(:rule r :parameters () :action (noop)").is_err());
/// ```
pub fn parse_policy(input: &str) -> Result<PolicyDefinition, SyntaxError> {
    check_balanced_parentheses(input)?;
    crate::parsers::parse_document(input, parse_policy_body)
}

/// Scans `input` and reports the first unmatched `)` or the last unclosed
/// `(`. Parentheses inside `;` comments are ignored.
pub fn check_balanced_parentheses(input: &str) -> Result<(), SyntaxError> {
    let mut open = vec![];
    let mut in_comment = false;
    for (offset, c) in input.char_indices() {
        match c {
            '\n' => in_comment = false,
            _ if in_comment => {}
            ';' => in_comment = true,
            '(' => open.push(offset),
            ')' => {
                if open.pop().is_none() {
                    return Err(SyntaxError::at_offset(input, offset, "unmatched ')'"));
                }
            }
            _ => {}
        }
    }
    match open.pop() {
        Some(offset) => Err(SyntaxError::at_offset(input, offset, "unclosed '('")),
        None => Ok(()),
    }
}

impl crate::parsers::Parser for RuleDefinition {
    type Item = RuleDefinition;

    /// See [`parse_rule_definition`].
    fn parse<'a, S: Into<Span<'a>>>(input: S) -> ParseResult<'a, Self::Item> {
        parse_rule_definition(input.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsed_types::PropCondition;

    const TWO_RULES: &str = r#"
    ; stack whatever we hold onto its goal target
    (:rule stack-goal
        :parameters (?x - block ?y - block)
        :preconditions (and (holding ?x) (clear ?y))
        :goals (on ?x ?y)
        :action (stack ?x ?y))
    (:rule put-down
        :parameters (?x - block)
        :preconditions (holding ?x)
        :goals ()
        :action (put-down ?x))
    "#;

    #[test]
    fn bare_rule_sequence() {
        let policy = parse_policy(TWO_RULES).unwrap();
        assert_eq!(policy.name(), None);
        assert_eq!(policy.rules().len(), 2);
        assert_eq!(policy.rules()[0].parameters().len(), 2);
        assert_eq!(policy.rules()[0].goals().len(), 1);
        assert_eq!(policy.rules()[1].action().predicate_name().as_str(), "put-down");
    }

    #[test]
    fn named_policy() {
        let text = format!("(define (policy blocks-policy) {})", TWO_RULES);
        let policy = parse_policy(&text).unwrap();
        assert_eq!(policy.name().map(|name| name.as_str()), Some("blocks-policy"));
        assert_eq!(policy.rules().len(), 2);
    }

    #[test]
    fn negative_literals_survive_parsing() {
        let text = "(:rule r :parameters (?x) :preconditions (and (not (holding ?x))) :goals () :action (pick-up ?x))";
        let policy = parse_policy(text).unwrap();
        assert!(matches!(
            policy.rules()[0].preconditions()[0],
            PropCondition::Not(_)
        ));
    }

    #[test]
    fn unbalanced_parentheses_are_located() {
        let err = check_balanced_parentheses("(a (b)\n)) ; (").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 2);

        let err = check_balanced_parentheses("\n  (a (b)").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 3);
    }

    #[test]
    fn rule_errors_point_into_the_rule() {
        let text = "(define (policy p)\n  (:rule r :parameters (?x)\n    :precondtions (holding ?x)\n    :action (put-down ?x)))";
        let err = parse_policy(text).unwrap_err();
        assert_eq!((err.line, err.column), (3, 5));
        assert_eq!(err.message, "invalid syntax");

        let text = "(:rule r :parameters (?x) :preconditions (holding ?x))";
        let err = parse_policy(text).unwrap_err();
        assert_eq!((err.line, err.column), (1, 54));
        assert_eq!(err.message, "invalid syntax");
    }

    #[test]
    fn empty_document_is_the_empty_policy() {
        let policy = parse_policy("  ; nothing learned yet\n").unwrap();
        assert!(policy.rules().is_empty());
        assert_eq!(policy.name(), None);
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let text = format!("{} junk", TWO_RULES);
        assert!(parse_policy(&text).is_err());
    }
}
