//! Traits and shared types for reading access expressions.
//!
//! This module defines:
//!
//! - [`ExpressionWriter`]: what the reader does at each leaf and group
//! - [`Operator`]: the two boolean operators
//! - [`AuthorizationValidator`]: the content policy applied to every token

use std::fmt;

use unicode_general_category::{GeneralCategory, get_general_category};

use crate::{
    Span,
    constants::{AND_OPERATOR, OR_OPERATOR},
    error::Result,
    lex::{AuthorizationToken, CharacterSet},
};

// ============================================================================
// Operator Types
// ============================================================================

/// Boolean operators joining a run of sibling terms.
///
/// There is no precedence between them: a run uses one operator only and
/// mixing requires parentheses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `&`: every term must hold.
    And,
    /// `|`: at least one term must hold.
    Or,
}

impl Operator {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            AND_OPERATOR => Some(Operator::And),
            OR_OPERATOR => Some(Operator::Or),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Operator::And => '&',
            Operator::Or => '|',
        }
    }

    pub fn other(self) -> Self {
        match self {
            Operator::And => Operator::Or,
            Operator::Or => Operator::And,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ============================================================================
// Content Policy
// ============================================================================

/// Decides whether the logical value of an authorization is acceptable.
///
/// Runs on every token the reader meets, including tokens whose value can
/// no longer change the outcome of an evaluation.
pub trait AuthorizationValidator: Send + Sync {
    /// `charset` is [`CharacterSet::Basic`] when the token was bare, in which
    /// case `authorization` is known to be plain ASCII from the bare set.
    fn is_valid(&self, authorization: &str, charset: CharacterSet) -> bool;
}

impl<F> AuthorizationValidator for F
where
    F: Fn(&str, CharacterSet) -> bool + Send + Sync,
{
    fn is_valid(&self, authorization: &str, charset: CharacterSet) -> bool {
        self(authorization, charset)
    }
}

/// Accepts any value whose characters are all assigned, non-control and
/// not U+FFFD.
///
/// Rust `char`s are always Unicode scalar values, so surrogates never reach
/// this check.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultValidator;

impl AuthorizationValidator for DefaultValidator {
    fn is_valid(&self, authorization: &str, charset: CharacterSet) -> bool {
        match charset {
            CharacterSet::Basic => true,
            CharacterSet::Any => authorization.chars().all(|c| {
                c != char::REPLACEMENT_CHARACTER
                    && !matches!(
                        get_general_category(c),
                        GeneralCategory::Unassigned | GeneralCategory::Control
                    )
            }),
        }
    }
}

// ============================================================================
// ExpressionWriter Trait
// ============================================================================

/// Trait driven by the reader while it walks an access expression.
///
/// The reader owns the grammar; a writer decides what a leaf and a run of
/// siblings mean. This lets one recursive-descent algorithm serve:
///
/// - **Validation**: `Node = ()`, nothing is built
/// - **Evaluation**: `Node = bool`, fused with parsing, no allocation
/// - **Tree building**: `Node` is an immutable parse tree
///
/// # Liveness
///
/// Evaluation stops consulting authorizations once a run's outcome is
/// decided (`false` under `&`, `true` under `|`). The reader asks
/// [`is_live`](Self::is_live) before each sibling and passes the answer,
/// combined with the liveness of every enclosing run, to
/// [`authorization`](Self::authorization). A non-live leaf must still be
/// validated and its result is discarded by the enclosing group.
pub trait ExpressionWriter<'e> {
    /// The value produced for a leaf, a group, or the whole expression.
    type Node;

    /// Accumulator for a run of siblings joined by one operator.
    type Group;

    /// The whole expression was empty.
    fn empty(&mut self) -> Result<Self::Node>;

    /// An authorization token was read.
    fn authorization(&mut self, token: &AuthorizationToken<'e>, live: bool) -> Result<Self::Node>;

    /// A second sibling follows `first`, joined by `op`.
    fn start_group(&mut self, op: Operator, first: Self::Node, span: Span) -> Self::Group;

    /// Whether the next sibling can still change the outcome of `group`.
    fn is_live(&self, group: &Self::Group) -> bool;

    fn push(&mut self, group: &mut Self::Group, node: Self::Node, span: Span);

    /// The run ended; `span` covers all of its siblings.
    fn finish_group(&mut self, group: Self::Group, span: Span) -> Result<Self::Node>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_round_trips_through_bytes() {
        assert_eq!(Operator::from_byte(b'&'), Some(Operator::And));
        assert_eq!(Operator::from_byte(b'|'), Some(Operator::Or));
        assert_eq!(Operator::from_byte(b'a'), None);
        assert_eq!(Operator::And.other(), Operator::Or);
        assert_eq!(Operator::Or.to_string(), "|");
    }

    #[test]
    fn default_validator_policy() {
        let v = DefaultValidator;
        assert!(v.is_valid("A", CharacterSet::Basic));
        assert!(v.is_valid("café ☕", CharacterSet::Any));
        assert!(!v.is_valid("a\u{0}b", CharacterSet::Any));
        assert!(!v.is_valid("a\nb", CharacterSet::Any));
        assert!(!v.is_valid("\u{FFFD}", CharacterSet::Any));
        assert!(!v.is_valid("\u{FFFF}", CharacterSet::Any));
        assert!(!v.is_valid("\u{FDD0}", CharacterSet::Any));
        assert!(v.is_valid("\u{E000}", CharacterSet::Any));
    }

    #[test]
    fn default_validator_rejects_unassigned() {
        // U+0378 sits in the Greek block but has never been assigned.
        assert!(!DefaultValidator.is_valid("a\u{378}b", CharacterSet::Any));
        assert!(DefaultValidator.is_valid("a\u{37B}b", CharacterSet::Any));
    }

    #[test]
    fn closures_are_validators() {
        let v = |auth: &str, _: CharacterSet| auth != "BAD";
        assert!(v.is_valid("good", CharacterSet::Basic));
        assert!(!AuthorizationValidator::is_valid(&v, "BAD", CharacterSet::Basic));
    }
}
