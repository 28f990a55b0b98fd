// accessexpr: boolean access expressions over authorization tokens
//
// An access expression such as `admin|(audit&"eu/west")` names the
// authorizations a caller must hold. This crate validates, evaluates,
// parses and canonicalizes such expressions in one linear scan each.

mod ast;
mod authorizations;
mod common;
mod constants;
mod context;
mod error;
mod escape;
mod evaluator;
mod expression;
pub mod lex;
mod normalize;
mod reader;
pub mod traits;
mod visit;

// Re-export key types for convenient access (single canonical path)
pub use ast::{AuthorizationNode, ExpressionType, GroupNode, ParsedAccessExpression};
pub use authorizations::Authorizations;
pub use common::Span;
pub use constants::DEFAULT_MAX_NESTING_DEPTH;
pub use context::{AccessParser, Builder, find_authorizations, normalize, parse, validate};
pub use error::{Error, Result};
pub use escape::{escape, quote, unescape, unquote};
pub use evaluator::{AccessEvaluator, Authorizer};
pub use expression::AccessExpression;
pub use lex::{AuthorizationToken, CharacterSet};
pub use traits::{AuthorizationValidator, DefaultValidator, ExpressionWriter, Operator};
