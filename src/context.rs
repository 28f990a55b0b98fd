// Access Expression Configuration and Parser Driver
//
// This module provides a builder for configuring how access expressions are
// read, and a driver `AccessParser` that runs the reader with a concrete
// `ExpressionWriter`. Every public operation of the crate goes through one.

use std::{fmt, sync::Arc};

use crate::{
    AccessEvaluator, AccessExpression, Authorizations, Authorizer,
    ast::{ParsedAccessExpression, TreeWriter},
    constants,
    error::Result,
    reader::Reader,
    traits::{AuthorizationValidator, DefaultValidator, ExpressionWriter},
    visit::{FindWriter, ValidationWriter},
};

/// Content policy held by a parser.
///
/// The default policy is a unit value, so default parsers allocate nothing.
#[derive(Clone, Default)]
enum Validator {
    #[default]
    Default,
    Custom(Arc<dyn AuthorizationValidator>),
}

impl Validator {
    fn get(&self) -> &dyn AuthorizationValidator {
        match self {
            Validator::Default => &DefaultValidator,
            Validator::Custom(validator) => validator.as_ref(),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Validator::Default => f.write_str("DefaultValidator"),
            Validator::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// ============================================================================
// Configuration Builder
// ============================================================================

/// Configuration builder for access expression parsing
///
/// # Examples
///
/// Simple usage with defaults:
/// ```
/// use accessexpr::Builder;
///
/// let parser = Builder::default().build();
/// parser.validate("A&(B|C)")?;
/// # Ok::<(), accessexpr::Error>(())
/// ```
///
/// With custom configuration:
/// ```
/// use accessexpr::{Builder, CharacterSet};
///
/// let parser = Builder::default()
///     .max_nesting_depth(16)
///     .validator(|auth: &str, _: CharacterSet| !auth.starts_with("tmp"))
///     .build();
/// assert!(parser.validate("tmp1|A").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Builder {
    /// Maximum parenthesis nesting depth (default: 512)
    ///
    /// The reader recurses once per `(`, so this bounds its stack use.
    max_nesting_depth: u32,

    /// Content policy applied to every authorization (default: [`DefaultValidator`])
    validator: Validator,
}

impl Default for Builder {
    /// Create a new builder with default configuration
    ///
    /// Defaults:
    /// - `max_nesting_depth`: 512
    /// - `validator`: [`DefaultValidator`]
    fn default() -> Self {
        Self {
            max_nesting_depth: constants::DEFAULT_MAX_NESTING_DEPTH,
            validator: Validator::Default,
        }
    }
}

impl Builder {
    /// Set maximum parenthesis nesting depth
    ///
    /// Expressions nesting deeper fail with [`Error::LimitExceeded`](crate::Error::LimitExceeded).
    ///
    /// # Examples
    /// ```
    /// use accessexpr::Builder;
    ///
    /// let parser = Builder::default().max_nesting_depth(2).build();
    /// assert!(parser.validate("((A))").is_ok());
    /// assert!(parser.validate("(((A)))").is_err());
    /// ```
    #[must_use]
    pub fn max_nesting_depth(mut self, depth: u32) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Set the content policy applied to every authorization token
    #[must_use]
    pub fn validator(mut self, validator: impl AuthorizationValidator + 'static) -> Self {
        self.validator = Validator::Custom(Arc::new(validator));
        self
    }

    /// Build a parser driver with this configuration
    ///
    /// The driver is cheap to clone and can be shared across threads.
    #[must_use]
    pub fn build(self) -> AccessParser {
        AccessParser {
            max_nesting_depth: self.max_nesting_depth,
            validator: self.validator,
        }
    }
}

// ============================================================================
// Access Expression Parser Driver
// ============================================================================

/// Access expression parser driver
///
/// Holds the configuration for reading expressions and runs the reader with
/// the writer each operation needs:
/// - **validate**: structure and content, nothing built
/// - **parse**: an immutable [`ParsedAccessExpression`]
/// - **find_authorizations**: every authorization, in source order
/// - **evaluator**: fused parse and evaluation against authorizations
#[derive(Debug, Clone)]
pub struct AccessParser {
    max_nesting_depth: u32,
    validator: Validator,
}

impl Default for AccessParser {
    fn default() -> Self {
        Builder::default().build()
    }
}

impl AccessParser {
    pub fn max_nesting_depth(&self) -> u32 {
        self.max_nesting_depth
    }

    pub(crate) fn validator(&self) -> &dyn AuthorizationValidator {
        self.validator.get()
    }

    /// Read `expression` with a caller-supplied writer.
    ///
    /// The writer is responsible for validating authorization content; the
    /// reader only enforces structure.
    pub fn read<'e, W: ExpressionWriter<'e>>(
        &self,
        expression: &'e [u8],
        writer: &mut W,
    ) -> Result<W::Node> {
        Reader::new(expression, self.max_nesting_depth).read(writer)
    }

    /// Check structure and authorization content without building anything.
    ///
    /// # Examples
    /// ```
    /// use accessexpr::AccessParser;
    ///
    /// let parser = AccessParser::default();
    /// assert!(parser.validate("").is_ok());
    /// assert!(parser.validate("A|B&C").is_err());
    /// ```
    pub fn validate(&self, expression: &str) -> Result<()> {
        self.validate_bytes(expression.as_bytes())
    }

    pub fn validate_bytes(&self, expression: &[u8]) -> Result<()> {
        self.read(
            expression,
            &mut ValidationWriter {
                validator: self.validator(),
            },
        )
    }

    /// Build the immutable parse tree of `expression`.
    pub fn parse(&self, expression: &str) -> Result<ParsedAccessExpression> {
        self.parse_shared(Arc::from(expression))
    }

    /// Build a tree whose nodes share `source`.
    pub(crate) fn parse_shared(&self, source: Arc<str>) -> Result<ParsedAccessExpression> {
        let _span = tracing::trace_span!("parse", len = source.len()).entered();
        let text = Arc::clone(&source);
        self.read(
            text.as_bytes(),
            &mut TreeWriter {
                source,
                validator: self.validator(),
            },
        )
    }

    /// Call `visit` with every authorization occurrence, unescaped, in
    /// source order. Repeated authorizations are visited each time.
    ///
    /// # Examples
    /// ```
    /// use accessexpr::AccessParser;
    ///
    /// let mut found = Vec::new();
    /// AccessParser::default()
    ///     .find_authorizations(r#"A&("B\"C"|A)"#, |auth| found.push(auth.to_string()))?;
    /// assert_eq!(found, ["A", "B\"C", "A"]);
    /// # Ok::<(), accessexpr::Error>(())
    /// ```
    pub fn find_authorizations(&self, expression: &str, visit: impl FnMut(&str)) -> Result<()> {
        self.find_authorizations_bytes(expression.as_bytes(), visit)
    }

    pub fn find_authorizations_bytes(
        &self,
        expression: &[u8],
        visit: impl FnMut(&str),
    ) -> Result<()> {
        self.read(
            expression,
            &mut FindWriter {
                validator: self.validator(),
                visit,
            },
        )
    }

    /// Validate `expression` once and keep it for later use.
    pub fn expression(&self, expression: &str) -> Result<AccessExpression> {
        AccessExpression::with_parser(expression, self.clone())
    }

    pub fn expression_bytes(&self, expression: &[u8]) -> Result<AccessExpression> {
        AccessExpression::bytes_with_parser(expression, self.clone())
    }

    /// An evaluator granting access to what `authorizations` satisfies.
    pub fn evaluator(&self, authorizations: &Authorizations) -> AccessEvaluator {
        AccessEvaluator::from_sets(self.clone(), std::iter::once(authorizations))
    }

    /// An evaluator granting access only to what every one of `sets`
    /// satisfies.
    ///
    /// No sets at all behaves as a single empty set.
    pub fn evaluator_for_all<'a>(
        &self,
        sets: impl IntoIterator<Item = &'a Authorizations>,
    ) -> AccessEvaluator {
        AccessEvaluator::from_sets(self.clone(), sets)
    }

    /// An evaluator asking `authorizer` about each authorization.
    pub fn evaluator_with(&self, authorizer: impl Authorizer + 'static) -> AccessEvaluator {
        AccessEvaluator::from_authorizer(self.clone(), authorizer)
    }
}

// ============================================================================
// Default-Configured Entry Points
// ============================================================================

/// Validate with the default configuration. See [`AccessParser::validate`].
pub fn validate(expression: &str) -> Result<()> {
    AccessParser::default().validate(expression)
}

/// Parse with the default configuration. See [`AccessParser::parse`].
///
/// # Examples
/// ```
/// use accessexpr::{ExpressionType, parse};
///
/// let tree = parse("A&(B|C)")?;
/// assert_eq!(tree.kind(), ExpressionType::And);
/// assert_eq!(tree.children()[1].expression(), "B|C");
/// # Ok::<(), accessexpr::Error>(())
/// ```
pub fn parse(expression: &str) -> Result<ParsedAccessExpression> {
    AccessParser::default().parse(expression)
}

/// See [`AccessParser::find_authorizations`].
pub fn find_authorizations(expression: &str, visit: impl FnMut(&str)) -> Result<()> {
    AccessParser::default().find_authorizations(expression, visit)
}

/// Parse with the default configuration and render the canonical form.
///
/// # Examples
/// ```
/// assert_eq!(accessexpr::normalize("(b|a)&(a|b)")?, "a|b");
/// # Ok::<(), accessexpr::Error>(())
/// ```
pub fn normalize(expression: &str) -> Result<String> {
    Ok(parse(expression)?.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, lex::CharacterSet};

    #[test]
    fn default_parser_validates() {
        let parser = AccessParser::default();
        assert_eq!(parser.max_nesting_depth(), constants::DEFAULT_MAX_NESTING_DEPTH);
        assert!(parser.validate("A&B").is_ok());
        assert!(parser.validate_bytes(b"(A|B)&C").is_ok());
        assert!(parser.validate("A&").is_err());
    }

    #[test]
    fn custom_validator_sees_logical_values() {
        let parser = Builder::default()
            .validator(|auth: &str, charset: CharacterSet| {
                charset == CharacterSet::Basic || auth != "x y"
            })
            .build();
        assert!(parser.validate(r#"A|"x z""#).is_ok());
        assert_eq!(
            parser.validate(r#"A|"x y""#),
            Err(Error::invalid_authorization("x y"))
        );
    }

    #[test]
    fn depth_limit_is_configurable() {
        let deep = format!("{}A{}", "(".repeat(10), ")".repeat(10));
        assert!(Builder::default().max_nesting_depth(10).build().validate(&deep).is_ok());
        let err = Builder::default()
            .max_nesting_depth(9)
            .build()
            .validate(&deep)
            .unwrap_err();
        assert!(matches!(err, Error::LimitExceeded { offset: 9, max_depth: 9, .. }));
    }

    #[test]
    fn find_visits_every_occurrence() {
        let mut found = Vec::new();
        find_authorizations("A|(B&A)|\"C&D\"", |auth| found.push(auth.to_owned())).unwrap();
        assert_eq!(found, ["A", "B", "A", "C&D"]);
    }

    #[test]
    fn find_stops_at_invalid_authorization() {
        let mut found = Vec::new();
        let err = find_authorizations("A|\"\u{1}\"|B", |auth| found.push(auth.to_owned()))
            .unwrap_err();
        assert_eq!(err, Error::invalid_authorization("\u{1}"));
        assert_eq!(found, ["A"]);
    }

    #[test]
    fn normalize_entry_point() {
        assert_eq!(normalize("").unwrap(), "");
        assert_eq!(normalize("c&(b&a)").unwrap(), "a&b&c");
        assert!(normalize("a|b&c").is_err());
    }
}
