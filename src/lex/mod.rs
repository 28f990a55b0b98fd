//! Cursor over the raw bytes of an access expression.
//!
//! The tokenizer never skips anything: whitespace is not part of the
//! grammar, so every byte is either structural (`(`, `)`, `&`, `|`) or part
//! of an authorization token.
//!
//! Grammar reference:
//!
//! ```text
//! access_token := 1*bare_char | '"' 1*(escaped_char) '"'
//! escaped_char := any char except '"' unless preceded by '\';
//!                 '\' must be followed by '\' or '"'
//! ```

use std::borrow::Cow;

use crate::{
    Span,
    constants::{BACKSLASH, QUOTE},
    error::{Error, Result},
    escape,
};

pub mod chars;

/// Which characters an authorization token may contain, as far as the
/// tokenizer knows.
///
/// Content policies can skip per-character work for [`CharacterSet::Basic`]
/// tokens, which are plain ASCII by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharacterSet {
    /// The token was bare, so only [bare characters](chars::is_bare_byte) occur.
    Basic,
    /// The token was quoted and may contain anything.
    Any,
}

/// An authorization token exactly as it appeared in the expression.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthorizationToken<'e> {
    /// The full token, including quotes when present.
    pub text: &'e [u8],
    /// The token without its quotes, still escaped.
    pub body: &'e [u8],
    /// Location of [`text`](Self::text) in the expression.
    pub span: Span,
    pub quoted: bool,
    /// Whether [`body`](Self::body) contains escape pairs.
    ///
    /// Lets callers borrow the body as the logical value instead of
    /// unescaping into a fresh buffer.
    pub has_escapes: bool,
}

impl<'e> AuthorizationToken<'e> {
    pub fn character_set(&self) -> CharacterSet {
        if self.quoted {
            CharacterSet::Any
        } else {
            CharacterSet::Basic
        }
    }

    /// The logical value of this token: unquoted, unescaped and decoded.
    ///
    /// A body that is not valid UTF-8 cannot name an authorization, which is
    /// reported as [`Error::InvalidAuthorization`].
    pub fn value(&self) -> Result<Cow<'e, str>> {
        if self.has_escapes {
            let bytes = escape::unescape_checked(self.body);
            String::from_utf8(bytes).map(Cow::Owned).map_err(|e| {
                Error::invalid_authorization(String::from_utf8_lossy(e.as_bytes()).into_owned())
            })
        } else {
            std::str::from_utf8(self.body).map(Cow::Borrowed).map_err(|_| {
                Error::invalid_authorization(String::from_utf8_lossy(self.body).into_owned())
            })
        }
    }
}

/// Stateful cursor over an immutable expression buffer.
///
/// Every error carries the byte offset at which the violation was seen.
#[derive(Debug, Clone)]
pub struct Tokenizer<'e> {
    expression: &'e [u8],
    index: usize,
}

impl<'e> Tokenizer<'e> {
    #[inline]
    pub fn new(expression: &'e [u8]) -> Self {
        Self {
            expression,
            index: 0,
        }
    }

    /// The whole buffer being read.
    #[inline]
    pub fn expression(&self) -> &'e [u8] {
        self.expression
    }

    /// Current byte offset of the cursor.
    #[inline]
    pub fn offset(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn has_next(&self) -> bool {
        self.index < self.expression.len()
    }

    /// The byte under the cursor, without consuming it.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.expression.get(self.index).copied()
    }

    /// Consume one byte.
    #[inline]
    pub fn advance(&mut self) {
        self.index += 1;
    }

    /// Consume `expected` or fail at the cursor.
    pub fn expect(&mut self, expected: u8) -> Result<()> {
        match self.peek() {
            None => Err(self.error(format!(
                "Expected '{}' instead saw end of input",
                char::from(expected)
            ))),
            Some(b) if b == expected => {
                self.advance();
                Ok(())
            }
            Some(_) => Err(self.error(format!(
                "Expected '{}' instead saw '{}'",
                char::from(expected),
                self.current_char()
            ))),
        }
    }

    /// Consume the bare or quoted authorization token under the cursor.
    ///
    /// Callers invoke this only after ruling out `(` and end of input.
    pub fn next_authorization(&mut self) -> Result<AuthorizationToken<'e>> {
        let start = self.index;
        match self.peek() {
            Some(QUOTE) => self.quoted_authorization(start),
            Some(b) if chars::is_bare_byte(b) => {
                let len = self.expression[start..]
                    .iter()
                    .take_while(|&&b| chars::is_bare_byte(b))
                    .count();
                self.index += len;
                let text = &self.expression[start..self.index];
                Ok(AuthorizationToken {
                    text,
                    body: text,
                    span: Span::new(start, self.index),
                    quoted: false,
                    has_escapes: false,
                })
            }
            Some(_) => Err(self.error(format!(
                "Expected a '(' character or an authorization token instead saw '{}'",
                self.current_char()
            ))),
            None => Err(self.error(
                "Expected a '(' character or an authorization token instead saw end of input",
            )),
        }
    }

    fn quoted_authorization(&mut self, open: usize) -> Result<AuthorizationToken<'e>> {
        self.advance();
        let body_start = self.index;
        let mut has_escapes = false;

        loop {
            match self.peek() {
                None => return Err(self.error_at("Unclosed quote", open)),
                Some(QUOTE) => break,
                Some(BACKSLASH) => {
                    match self.expression.get(self.index + 1) {
                        Some(&next) if chars::needs_escape(next) => {}
                        _ => return Err(self.error("Invalid escaping within quotes")),
                    }
                    has_escapes = true;
                    self.index += 2;
                }
                Some(_) => self.advance(),
            }
        }

        if self.index == body_start {
            return Err(self.error_at("Empty authorization token in quotes", open));
        }

        let body = &self.expression[body_start..self.index];
        self.advance();
        Ok(AuthorizationToken {
            text: &self.expression[open..self.index],
            body,
            span: Span::new(open, self.index),
            quoted: true,
            has_escapes,
        })
    }

    /// An [`Error::InvalidExpression`] at the cursor.
    pub fn error(&self, message: impl Into<String>) -> Error {
        self.error_at(message, self.index)
    }

    pub fn error_at(&self, message: impl Into<String>, offset: usize) -> Error {
        Error::invalid_expression(message, self.expression, offset)
    }

    /// The character starting at the cursor, for error messages.
    ///
    /// Bytes that do not begin a UTF-8 sequence show as U+FFFD.
    pub fn current_char(&self) -> char {
        let rest = self.expression.get(self.index..).unwrap_or_default();
        let prefix = &rest[..rest.len().min(4)];
        let valid = match std::str::from_utf8(prefix) {
            Ok(s) => s,
            Err(e) => std::str::from_utf8(&prefix[..e.valid_up_to()]).unwrap_or_default(),
        };
        valid.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER)
    }
}
