//! Canonical form of an access expression.
//!
//! Two expressions that differ only by the order of siblings, by
//! associative regrouping of one operator, by repeated siblings, or by
//! unnecessary quoting normalize to the same text:
//!
//! ```text
//! b|a          -> a|b
//! a&(b&c)      -> a&b&c
//! a|a|a|a      -> a
//! "ABC"|(B&A)  -> ABC|(A&B)
//! ```
//!
//! Siblings are ordered leaves first, then `|` groups, then `&` groups.
//! Leaves compare by logical value, groups by size and then child by
//! child. Normalizing a normalized expression reproduces it.

use std::{borrow::Cow, cmp::Ordering};

use bumpalo::{Bump, collections::Vec as BumpVec};

use crate::{ast::ParsedAccessExpression, escape, lex::chars, traits::Operator};

/// Flattened, deduplicated, sorted view of a tree.
///
/// Child lists live in an arena scoped to one [`normalize`] call.
#[derive(Clone, Copy, Debug)]
enum Canonical<'t, 'b> {
    Leaf(&'t str),
    Group(Operator, &'b [Canonical<'t, 'b>]),
}

impl Canonical<'_, '_> {
    fn rank(&self) -> u8 {
        match self {
            Canonical::Leaf(_) => 0,
            Canonical::Group(Operator::Or, _) => 1,
            Canonical::Group(Operator::And, _) => 2,
        }
    }
}

fn compare(a: &Canonical<'_, '_>, b: &Canonical<'_, '_>) -> Ordering {
    match (a, b) {
        (Canonical::Leaf(x), Canonical::Leaf(y)) => x.as_bytes().cmp(y.as_bytes()),
        (Canonical::Group(op_a, xs), Canonical::Group(op_b, ys)) if op_a == op_b => xs
            .len()
            .cmp(&ys.len())
            .then_with(|| {
                xs.iter()
                    .zip(ys.iter())
                    .map(|(x, y)| compare(x, y))
                    .find(|o| o.is_ne())
                    .unwrap_or(Ordering::Equal)
            }),
        _ => a.rank().cmp(&b.rank()),
    }
}

fn canonicalize<'t, 'b>(
    node: &'t ParsedAccessExpression,
    arena: &'b Bump,
) -> Option<Canonical<'t, 'b>> {
    let op = match node {
        ParsedAccessExpression::Empty => return None,
        ParsedAccessExpression::Authorization(leaf) => return Some(Canonical::Leaf(leaf.value())),
        ParsedAccessExpression::And(_) => Operator::And,
        ParsedAccessExpression::Or(_) => Operator::Or,
    };

    let mut children = BumpVec::with_capacity_in(node.children().len(), arena);
    for child in node.children() {
        match canonicalize(child, arena) {
            // Canonical children never hold their own operator, so one
            // level of splicing flattens the whole run.
            Some(Canonical::Group(child_op, grandchildren)) if child_op == op => {
                children.extend(grandchildren.iter().copied());
            }
            Some(canonical) => children.push(canonical),
            None => {}
        }
    }

    children.sort_by(compare);
    children.dedup_by(|a, b| compare(a, b).is_eq());

    match children.as_slice() {
        [only] => Some(*only),
        _ => Some(Canonical::Group(op, children.into_bump_slice())),
    }
}

/// Minimal token form of a logical value.
fn token(value: &str) -> Cow<'_, str> {
    if chars::is_bare(value.as_bytes()) {
        Cow::Borrowed(value)
    } else {
        escape::escape(value, true)
    }
}

fn write(node: &Canonical<'_, '_>, out: &mut String, parenthesize: bool) {
    match node {
        Canonical::Leaf(value) => out.push_str(&token(value)),
        Canonical::Group(op, children) => {
            if parenthesize {
                out.push('(');
            }
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.push(op.as_char());
                }
                write(child, out, true);
            }
            if parenthesize {
                out.push(')');
            }
        }
    }
}

/// Render the canonical text of `tree`.
///
/// The empty expression normalizes to the empty string.
pub fn normalize(tree: &ParsedAccessExpression) -> String {
    let arena = Bump::new();
    let mut out = String::with_capacity(tree.expression().len());
    if let Some(canonical) = canonicalize(tree, &arena) {
        write(&canonical, &mut out, false);
    }
    tracing::trace!(
        input = tree.expression(),
        output = out.as_str(),
        arena_bytes = arena.allocated_bytes(),
        "normalized access expression"
    );
    out
}
