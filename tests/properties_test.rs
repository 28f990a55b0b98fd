//! Property-based tests for quoting, normalization and evaluation.

use std::collections::HashSet;

use accessexpr::{
    AccessEvaluator, AccessExpression, Authorizations, ParsedAccessExpression, escape, normalize,
    parse, quote, unescape, unquote, validate,
};
use proptest::prelude::*;

/// Strategy to generate authorization tokens, bare or quoted
fn token_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-e]{1,2}",
        "[a-c&|() \"\\\\]{1,3}".prop_map(|v| quote(&v).unwrap().into_owned()),
    ]
}

/// Strategy to generate valid expressions, every term parenthesized
fn expression_strategy() -> impl Strategy<Value = String> {
    token_strategy().prop_recursive(4, 32, 4, |inner| {
        (any::<bool>(), prop::collection::vec(inner, 2..4)).prop_map(|(and, terms)| {
            let op = if and { "&" } else { "|" };
            terms
                .iter()
                .map(|t| format!("({t})"))
                .collect::<Vec<_>>()
                .join(op)
        })
    })
}

fn authorizations_strategy() -> impl Strategy<Value = Authorizations> {
    prop::collection::hash_set("[a-e]{1,2}", 0..8)
        .prop_map(|set: HashSet<String>| Authorizations::of(set).unwrap())
}

proptest! {
    #[test]
    fn test_unquote_inverts_quote(value in ".{1,24}") {
        let quoted = quote(&value).unwrap();
        prop_assert_eq!(unquote(&quoted).unwrap(), value.as_str());
    }

    #[test]
    fn test_bare_values_quote_to_themselves(value in "[A-Za-z0-9_:./-]{1,16}") {
        prop_assert_eq!(quote(&value).unwrap(), value.as_str());
    }

    #[test]
    fn test_unescape_inverts_escape(value in ".{0,24}") {
        let escaped = escape(&value, false);
        prop_assert_eq!(unescape(&escaped).unwrap(), value.as_str());
    }

    #[test]
    fn test_generated_expressions_validate(expr in expression_strategy()) {
        prop_assert!(validate(&expr).is_ok(), "rejected: {}", expr);
    }

    #[test]
    fn test_normalization_is_idempotent(expr in expression_strategy()) {
        let once = normalize(&expr).unwrap();
        let twice = normalize(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_normalization_preserves_meaning(
        expr in expression_strategy(),
        auths in authorizations_strategy(),
    ) {
        let evaluator = AccessEvaluator::new(&auths);
        let normalized = normalize(&expr).unwrap();
        prop_assert_eq!(
            evaluator.can_access(&expr).unwrap(),
            evaluator.can_access(&normalized).unwrap(),
            "{} vs {}", expr, normalized
        );
    }

    #[test]
    fn test_tree_and_text_evaluation_agree(
        expr in expression_strategy(),
        auths in authorizations_strategy(),
    ) {
        let evaluator = AccessEvaluator::new(&auths);
        let expression = AccessExpression::of(&expr).unwrap();
        let from_text = evaluator.can_access_expression(&expression).unwrap();
        expression.parse().unwrap();
        prop_assert_eq!(evaluator.can_access_expression(&expression).unwrap(), from_text);
    }

    #[test]
    fn test_tree_nodes_cover_their_source(expr in expression_strategy()) {
        let tree = parse(&expr).unwrap();
        assert_spans_match_source(&tree, &expr)?;

        // Generated roots are a token or a run of parenthesized terms, never
        // wrapped themselves, so the root covers the whole input.
        prop_assert_eq!(tree.expression(), expr.as_str());
    }
}

/// Every node's text is exactly the source slice its span names.
fn assert_spans_match_source(
    node: &ParsedAccessExpression,
    source: &str,
) -> Result<(), TestCaseError> {
    let span = node.span();
    prop_assert_eq!(node.expression(), &source[span.start..span.end]);
    for child in node.children() {
        assert_spans_match_source(child, source)?;
    }
    Ok(())
}
