// Error types for access expression parsing and evaluation.

use std::fmt;

// ============================================================================
// Error Types
// ============================================================================

/// Top-level error type.
///
/// Every variant is surfaced synchronously to the caller of the operation
/// that detected it. Nothing is retried, logged or recovered internally.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The expression violates the grammar.
    ///
    /// Examples: `a|b&c`, `(a`, `"unclosed`, `a""`, `""`
    #[error("{}", SyntaxReport::new(.message, .expression, *.offset))]
    InvalidExpression {
        /// Fixed human-readable description of the violation.
        message: String,
        /// The full expression being read, decoded lossily if it was bytes.
        expression: String,
        /// Byte offset at which the violation was detected.
        offset: usize,
    },

    /// The expression is well formed but one of its authorizations was
    /// rejected by the content policy.
    #[error("invalid authorization: {authorization:?}")]
    InvalidAuthorization {
        /// The logical (unquoted, unescaped) authorization value.
        authorization: String,
    },

    /// An illegal value was handed to a constructor or codec function.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Parentheses nest deeper than the configured maximum.
    #[error(
        "{}",
        SyntaxReport::new(
            &depth_message(*.max_depth),
            .expression,
            *.offset,
        )
    )]
    LimitExceeded {
        expression: String,
        /// Byte offset of the `(` that crossed the limit.
        offset: usize,
        max_depth: u32,
    },
}

impl Error {
    /// Construct a syntax error against the expression being read.
    #[must_use]
    pub fn invalid_expression(message: impl Into<String>, expression: &[u8], offset: usize) -> Self {
        Error::InvalidExpression {
            message: message.into(),
            expression: String::from_utf8_lossy(expression).into_owned(),
            offset,
        }
    }

    #[must_use]
    pub fn invalid_authorization(authorization: impl Into<String>) -> Self {
        Error::InvalidAuthorization {
            authorization: authorization.into(),
        }
    }

    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument {
            message: message.into(),
        }
    }

    /// Construct a nesting depth exceeded error.
    #[must_use]
    pub fn nesting_depth(expression: &[u8], offset: usize, max_depth: u32) -> Self {
        Error::LimitExceeded {
            expression: String::from_utf8_lossy(expression).into_owned(),
            offset,
            max_depth,
        }
    }

    /// The bare description of the problem, without position decoration.
    pub fn message(&self) -> String {
        match self {
            Error::InvalidExpression { message, .. } => message.clone(),
            Error::LimitExceeded { max_depth, .. } => depth_message(*max_depth),
            other => other.to_string(),
        }
    }

    /// The expression text the error was raised against, when there is one.
    pub fn expression(&self) -> Option<&str> {
        match self {
            Error::InvalidExpression { expression, .. } | Error::LimitExceeded { expression, .. } => {
                Some(expression)
            }
            _ => None,
        }
    }

    /// Byte offset into [`Error::expression`] where the problem was detected.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Error::InvalidExpression { offset, .. } | Error::LimitExceeded { offset, .. } => {
                Some(*offset)
            }
            _ => None,
        }
    }
}

fn depth_message(max_depth: u32) -> String {
    format!("Nesting depth exceeds maximum of {max_depth}")
}

/// Result type alias for access expression operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Renders `message near index N`, the expression, and a caret under the
/// offending position.
struct SyntaxReport<'a> {
    message: &'a str,
    expression: &'a str,
    offset: usize,
}

impl<'a> SyntaxReport<'a> {
    fn new(message: &'a str, expression: &'a str, offset: usize) -> Self {
        Self {
            message,
            expression,
            offset,
        }
    }
}

impl fmt::Display for SyntaxReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} near index {}\n{}", self.message, self.offset, self.expression)?;
        if self.offset < self.expression.len() {
            // Caret column counts chars, offset counts bytes.
            let column = self
                .expression
                .char_indices()
                .take_while(|(i, _)| *i < self.offset)
                .count();
            write!(f, "\n{:>width$}", "^", width = column + 1)?;
        }
        Ok(())
    }
}
