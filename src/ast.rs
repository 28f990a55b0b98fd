// Immutable parse tree for access expressions.
//
// The tree mirrors the source exactly: one interior node per run of
// siblings, no flattening, leaves keep their quoting. Every node shares the
// source text through an `Arc<str>`, so subtrees can be handed out and read
// from any thread without copying.

use std::{fmt, sync::Arc};

use crate::{
    Span,
    error::Result,
    lex::{AuthorizationToken, CharacterSet},
    normalize,
    traits::{AuthorizationValidator, ExpressionWriter, Operator},
    visit::checked_value,
};

/// The four kinds of node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionType {
    /// The whole expression was empty.
    Empty,
    Authorization,
    And,
    Or,
}

/// A node of a parsed access expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAccessExpression {
    Empty,
    Authorization(AuthorizationNode),
    And(GroupNode),
    Or(GroupNode),
}

/// A leaf: one authorization token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationNode {
    source: Arc<str>,
    span: Span,
    quoted: bool,
    value: Box<str>,
}

/// An interior node: two or more siblings joined by one operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode {
    source: Arc<str>,
    span: Span,
    children: Box<[ParsedAccessExpression]>,
}

impl ParsedAccessExpression {
    pub fn kind(&self) -> ExpressionType {
        match self {
            ParsedAccessExpression::Empty => ExpressionType::Empty,
            ParsedAccessExpression::Authorization(_) => ExpressionType::Authorization,
            ParsedAccessExpression::And(_) => ExpressionType::And,
            ParsedAccessExpression::Or(_) => ExpressionType::Or,
        }
    }

    /// Direct children; empty for leaves and for the empty expression.
    pub fn children(&self) -> &[ParsedAccessExpression] {
        match self {
            ParsedAccessExpression::And(group) | ParsedAccessExpression::Or(group) => group.children(),
            _ => &[],
        }
    }

    /// The operator joining this node's children, if it has any.
    pub fn operator(&self) -> Option<Operator> {
        match self {
            ParsedAccessExpression::And(_) => Some(Operator::And),
            ParsedAccessExpression::Or(_) => Some(Operator::Or),
            _ => None,
        }
    }

    /// The source text this node was read from.
    ///
    /// Leaves keep their quotes. A parenthesized run does not include its
    /// own outer parentheses.
    pub fn expression(&self) -> &str {
        match self {
            ParsedAccessExpression::Empty => "",
            ParsedAccessExpression::Authorization(leaf) => leaf.expression(),
            ParsedAccessExpression::And(group) | ParsedAccessExpression::Or(group) => {
                group.expression()
            }
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParsedAccessExpression::Empty => Span::default(),
            ParsedAccessExpression::Authorization(leaf) => leaf.span,
            ParsedAccessExpression::And(group) | ParsedAccessExpression::Or(group) => group.span,
        }
    }

    /// The logical value of a leaf.
    pub fn authorization(&self) -> Option<&str> {
        match self {
            ParsedAccessExpression::Authorization(leaf) => Some(leaf.value()),
            _ => None,
        }
    }

    /// Canonical text for this node's equivalence class.
    ///
    /// See [`normalize::normalize`].
    pub fn normalize(&self) -> String {
        normalize::normalize(self)
    }
}

impl fmt::Display for ParsedAccessExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.expression())
    }
}

impl AuthorizationNode {
    /// The token as written, quotes included.
    pub fn expression(&self) -> &str {
        self.source.get(self.span.start..self.span.end).unwrap_or_default()
    }

    /// The unquoted, unescaped authorization.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    pub fn character_set(&self) -> CharacterSet {
        if self.quoted {
            CharacterSet::Any
        } else {
            CharacterSet::Basic
        }
    }

    /// The token without its quotes, still escaped.
    pub(crate) fn body(&self) -> &[u8] {
        let text = self.expression().as_bytes();
        if self.quoted && text.len() >= 2 {
            &text[1..text.len() - 1]
        } else {
            text
        }
    }
}

impl GroupNode {
    pub fn expression(&self) -> &str {
        self.source.get(self.span.start..self.span.end).unwrap_or_default()
    }

    pub fn children(&self) -> &[ParsedAccessExpression] {
        &self.children
    }
}

// ============================================================================
// Tree Writer
// ============================================================================

/// Materializes a [`ParsedAccessExpression`] from the reader's callbacks.
pub(crate) struct TreeWriter<'v> {
    pub source: Arc<str>,
    pub validator: &'v dyn AuthorizationValidator,
}

impl<'e> ExpressionWriter<'e> for TreeWriter<'_> {
    type Node = ParsedAccessExpression;
    type Group = (Operator, Vec<ParsedAccessExpression>);

    fn empty(&mut self) -> Result<Self::Node> {
        Ok(ParsedAccessExpression::Empty)
    }

    fn authorization(&mut self, token: &AuthorizationToken<'e>, _live: bool) -> Result<Self::Node> {
        let value = checked_value(self.validator, token)?;
        Ok(ParsedAccessExpression::Authorization(AuthorizationNode {
            source: Arc::clone(&self.source),
            span: token.span,
            quoted: token.quoted,
            value: value.into_owned().into_boxed_str(),
        }))
    }

    fn start_group(&mut self, op: Operator, first: Self::Node, _span: Span) -> Self::Group {
        (op, vec![first])
    }

    fn is_live(&self, _group: &Self::Group) -> bool {
        true
    }

    fn push(&mut self, group: &mut Self::Group, node: Self::Node, _span: Span) {
        group.1.push(node);
    }

    fn finish_group(&mut self, (op, children): Self::Group, span: Span) -> Result<Self::Node> {
        let group = GroupNode {
            source: Arc::clone(&self.source),
            span,
            children: children.into_boxed_slice(),
        };
        Ok(match op {
            Operator::And => ParsedAccessExpression::And(group),
            Operator::Or => ParsedAccessExpression::Or(group),
        })
    }
}
