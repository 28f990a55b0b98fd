//! Validated access expressions with a lazily built parse tree.

use std::{
    collections::HashSet,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
    sync::{Arc, OnceLock},
};

use crate::{
    AccessParser, Authorizations,
    ast::ParsedAccessExpression,
    error::{Error, Result},
};

/// An access expression that is known to be valid.
///
/// The parse tree is built on the first call to [`parse`](Self::parse) and
/// shared afterwards. Concurrent first calls may each build a tree, but only
/// one is kept and every caller receives that one.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use accessexpr::AccessExpression;
///
/// let expr = AccessExpression::of("B|A")?;
/// let tree = expr.parse()?;
/// assert!(Arc::ptr_eq(&tree, &expr.parse()?));
/// assert_eq!(expr.normalize()?, "A|B");
/// # Ok::<(), accessexpr::Error>(())
/// ```
#[derive(Clone)]
pub struct AccessExpression {
    text: Arc<str>,
    parser: AccessParser,
    tree: OnceLock<Arc<ParsedAccessExpression>>,
}

impl AccessExpression {
    /// Validate `expression` with the default configuration.
    pub fn of(expression: &str) -> Result<Self> {
        Self::with_parser(expression, AccessParser::default())
    }

    pub fn of_bytes(expression: &[u8]) -> Result<Self> {
        Self::bytes_with_parser(expression, AccessParser::default())
    }

    pub(crate) fn with_parser(expression: &str, parser: AccessParser) -> Result<Self> {
        parser.validate(expression)?;
        Ok(Self {
            text: Arc::from(expression),
            parser,
            tree: OnceLock::new(),
        })
    }

    pub(crate) fn bytes_with_parser(expression: &[u8], parser: AccessParser) -> Result<Self> {
        parser.validate_bytes(expression)?;
        // Structure is ASCII and every token value decoded, so a valid
        // expression is valid UTF-8.
        let text = std::str::from_utf8(expression)
            .map_err(|e| Error::invalid_argument(format!("expression is not UTF-8: {e}")))?;
        Ok(Self {
            text: Arc::from(text),
            parser,
            tree: OnceLock::new(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.text.as_bytes()
    }

    /// The parse tree, built on first use.
    ///
    /// Every call returns the same tree.
    pub fn parse(&self) -> Result<Arc<ParsedAccessExpression>> {
        if let Some(tree) = self.tree.get() {
            return Ok(Arc::clone(tree));
        }
        let built = Arc::new(self.parser.parse_shared(Arc::clone(&self.text))?);
        Ok(Arc::clone(self.tree.get_or_init(|| built)))
    }

    /// The parse tree if some earlier call already built it.
    pub fn cached_tree(&self) -> Option<&Arc<ParsedAccessExpression>> {
        self.tree.get()
    }

    /// The distinct authorizations the expression mentions.
    pub fn authorizations(&self) -> Result<Authorizations> {
        let mut found = HashSet::new();
        match self.cached_tree() {
            Some(tree) => collect_leaves(tree, &mut found),
            None => self
                .parser
                .find_authorizations(&self.text, |auth| {
                    found.insert(auth.to_owned());
                })?,
        }
        Ok(Authorizations::from_set(found))
    }

    /// Canonical text of the expression. See [`crate::normalize()`].
    pub fn normalize(&self) -> Result<String> {
        Ok(self.parse()?.normalize())
    }
}

fn collect_leaves(node: &ParsedAccessExpression, found: &mut HashSet<String>) {
    match node.authorization() {
        Some(value) => {
            found.insert(value.to_owned());
        }
        None => {
            for child in node.children() {
                collect_leaves(child, found);
            }
        }
    }
}

impl FromStr for AccessExpression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::of(s)
    }
}

impl PartialEq for AccessExpression {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for AccessExpression {}

impl Hash for AccessExpression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Debug for AccessExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessExpression").field(&self.text).finish()
    }
}

impl fmt::Display for AccessExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
