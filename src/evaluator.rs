//! Deciding whether held authorizations satisfy an access expression.
//!
//! Evaluation is fused with reading: the expression is walked once, every
//! token is validated, and membership is only consulted while the enclosing
//! runs are still undecided.

use std::{collections::HashSet, fmt, sync::Arc};

use crate::{
    AccessExpression, AccessParser, Authorizations, Span,
    ast::ParsedAccessExpression,
    error::{Error, Result},
    escape,
    lex::AuthorizationToken,
    traits::{AuthorizationValidator, ExpressionWriter, Operator},
    visit::checked_value,
};

/// Decides whether a single logical authorization is held.
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, authorization: &str) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_authorized(&self, authorization: &str) -> bool {
        self(authorization)
    }
}

/// Where leaf lookups go.
#[derive(Clone)]
enum Membership {
    /// One set per entity, members stored escaped so token bodies can be
    /// looked up without unescaping.
    Sets(Arc<[HashSet<Box<[u8]>>]>),
    Authorizer(Arc<dyn Authorizer>),
}

#[derive(Clone, Copy)]
enum Lookup<'a> {
    Set(&'a HashSet<Box<[u8]>>),
    Authorizer(&'a dyn Authorizer),
}

/// Evaluates access expressions against fixed authorizations.
///
/// Immutable and cheap to clone; one evaluator may serve any number of
/// threads.
///
/// # Examples
/// ```
/// use accessexpr::{AccessEvaluator, Authorizations};
///
/// let auths = Authorizations::of(["A", "B"])?;
/// let evaluator = AccessEvaluator::new(&auths);
/// assert!(evaluator.can_access("A&(B|C)")?);
/// assert!(!evaluator.can_access("A&C")?);
/// assert!(evaluator.can_access("")?);
/// # Ok::<(), accessexpr::Error>(())
/// ```
#[derive(Clone)]
pub struct AccessEvaluator {
    parser: AccessParser,
    membership: Membership,
}

impl AccessEvaluator {
    /// Evaluate against `authorizations` with the default configuration.
    pub fn new(authorizations: &Authorizations) -> Self {
        AccessParser::default().evaluator(authorizations)
    }

    /// Grant access only when every one of `sets` satisfies the expression.
    ///
    /// # Examples
    /// ```
    /// use accessexpr::{AccessEvaluator, Authorizations};
    ///
    /// let user = Authorizations::of(["A", "B"])?;
    /// let server = Authorizations::of(["C", "D"])?;
    /// let evaluator = AccessEvaluator::for_all([&user, &server]);
    /// assert!(!evaluator.can_access("A")?);
    /// assert!(evaluator.can_access("A|D")?);
    /// assert!(!evaluator.can_access("A&D")?);
    /// # Ok::<(), accessexpr::Error>(())
    /// ```
    pub fn for_all<'a>(sets: impl IntoIterator<Item = &'a Authorizations>) -> Self {
        AccessParser::default().evaluator_for_all(sets)
    }

    /// Ask `authorizer` about each authorization.
    pub fn with_authorizer(authorizer: impl Authorizer + 'static) -> Self {
        AccessParser::default().evaluator_with(authorizer)
    }

    pub(crate) fn from_sets<'a>(
        parser: AccessParser,
        sets: impl IntoIterator<Item = &'a Authorizations>,
    ) -> Self {
        let mut escaped: Vec<HashSet<Box<[u8]>>> = sets
            .into_iter()
            .map(|set| {
                set.iter()
                    .map(|auth| {
                        escape::escape_bytes(auth.as_bytes(), false)
                            .into_owned()
                            .into_boxed_slice()
                    })
                    .collect()
            })
            .collect();
        if escaped.is_empty() {
            escaped.push(HashSet::new());
        }
        tracing::debug!(
            sets = escaped.len(),
            authorizations = escaped.iter().map(HashSet::len).sum::<usize>(),
            "built set access evaluator"
        );
        Self {
            parser,
            membership: Membership::Sets(escaped.into()),
        }
    }

    pub(crate) fn from_authorizer(
        parser: AccessParser,
        authorizer: impl Authorizer + 'static,
    ) -> Self {
        tracing::debug!("built authorizer access evaluator");
        Self {
            parser,
            membership: Membership::Authorizer(Arc::new(authorizer)),
        }
    }

    /// Whether the held authorizations satisfy `expression`.
    ///
    /// Fails if the expression is malformed or any authorization in it is
    /// rejected by the content policy, including authorizations that could
    /// not have changed the outcome.
    pub fn can_access(&self, expression: &str) -> Result<bool> {
        self.can_access_bytes(expression.as_bytes())
    }

    pub fn can_access_bytes(&self, expression: &[u8]) -> Result<bool> {
        self.all_lookups(|lookup| {
            self.parser.read(
                expression,
                &mut EvalWriter {
                    validator: self.parser.validator(),
                    lookup,
                },
            )
        })
    }

    /// Evaluate an already validated expression.
    ///
    /// Walks the cached tree when the expression has one instead of reading
    /// the text again.
    pub fn can_access_expression(&self, expression: &AccessExpression) -> Result<bool> {
        match expression.cached_tree() {
            Some(tree) => self.all_lookups(|lookup| self.evaluate_tree(tree, lookup, true)),
            None => self.can_access(expression.as_str()),
        }
    }

    /// AND of `evaluate` over every lookup target, stopping at the first
    /// `false`.
    ///
    /// Each pass validates the whole expression with the same policy, so a
    /// later pass cannot surface an error the first one missed.
    fn all_lookups(&self, mut evaluate: impl FnMut(Lookup<'_>) -> Result<bool>) -> Result<bool> {
        match &self.membership {
            Membership::Sets(sets) => {
                for set in sets.iter() {
                    if !evaluate(Lookup::Set(set))? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Membership::Authorizer(authorizer) => evaluate(Lookup::Authorizer(authorizer.as_ref())),
        }
    }

    fn evaluate_tree(
        &self,
        node: &ParsedAccessExpression,
        lookup: Lookup<'_>,
        live: bool,
    ) -> Result<bool> {
        match node {
            ParsedAccessExpression::Empty => Ok(true),
            ParsedAccessExpression::Authorization(leaf) => {
                if !self.parser.validator().is_valid(leaf.value(), leaf.character_set()) {
                    return Err(Error::invalid_authorization(leaf.value()));
                }
                Ok(live
                    && match lookup {
                        Lookup::Set(set) => set.contains(leaf.body()),
                        Lookup::Authorizer(authorizer) => authorizer.is_authorized(leaf.value()),
                    })
            }
            ParsedAccessExpression::And(group) => {
                let mut acc = true;
                for child in group.children() {
                    acc &= self.evaluate_tree(child, lookup, live && acc)?;
                }
                Ok(acc)
            }
            ParsedAccessExpression::Or(group) => {
                let mut acc = false;
                for child in group.children() {
                    acc |= self.evaluate_tree(child, lookup, live && !acc)?;
                }
                Ok(acc)
            }
        }
    }
}

impl fmt::Debug for AccessEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("AccessEvaluator");
        match &self.membership {
            Membership::Sets(sets) => s.field("sets", &sets.len()),
            Membership::Authorizer(_) => s.field("authorizer", &".."),
        };
        s.finish()
    }
}

// ============================================================================
// Evaluation Writer
// ============================================================================

/// Computes the boolean value of an expression while it is read.
///
/// A group carries its operator and the value accumulated so far.
struct EvalWriter<'a> {
    validator: &'a dyn AuthorizationValidator,
    lookup: Lookup<'a>,
}

impl<'e> ExpressionWriter<'e> for EvalWriter<'_> {
    type Node = bool;
    type Group = (Operator, bool);

    fn empty(&mut self) -> Result<bool> {
        Ok(true)
    }

    fn authorization(&mut self, token: &AuthorizationToken<'e>, live: bool) -> Result<bool> {
        let value = checked_value(self.validator, token)?;
        if !live {
            return Ok(false);
        }
        Ok(match self.lookup {
            Lookup::Set(set) => set.contains(token.body),
            Lookup::Authorizer(authorizer) => authorizer.is_authorized(&value),
        })
    }

    fn start_group(&mut self, op: Operator, first: bool, _span: Span) -> Self::Group {
        (op, first)
    }

    fn is_live(&self, &(op, acc): &Self::Group) -> bool {
        match op {
            Operator::And => acc,
            Operator::Or => !acc,
        }
    }

    fn push(&mut self, group: &mut Self::Group, node: bool, _span: Span) {
        match group.0 {
            Operator::And => group.1 &= node,
            Operator::Or => group.1 |= node,
        }
    }

    fn finish_group(&mut self, (_, acc): Self::Group, _span: Span) -> Result<bool> {
        Ok(acc)
    }
}
