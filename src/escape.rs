//! Conversions between an authorization's logical value and its token form.
//!
//! Inside quotes only `"` and `\` are special and each is written with a
//! leading `\`. Outside quotes only [bare characters](crate::lex::chars) may
//! appear. For every non-empty value `v`:
//!
//! ```text
//! unquote(quote(v)) == v
//! unescape(escape(v, false)) == v
//! ```

use std::borrow::Cow;

use crate::{
    constants::{BACKSLASH, QUOTE},
    error::{Error, Result},
    lex::chars,
};

pub(crate) const EMPTY_AUTHORIZATION: &str = "Empty strings are not legal authorizations";

/// Escape `"` and `\` in `value`, wrapping the result in quotes when
/// `quote` is set.
///
/// Borrows `value` when nothing needs to change.
pub fn escape(value: &str, quote: bool) -> Cow<'_, str> {
    let escapes = value.bytes().filter(|&b| chars::needs_escape(b)).count();
    if escapes == 0 && !quote {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len() + escapes + if quote { 2 } else { 0 });
    if quote {
        out.push('"');
    }
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    if quote {
        out.push('"');
    }
    Cow::Owned(out)
}

/// Remove one level of escaping from the body of a quoted token.
///
/// Every `\` must be followed by `"` or `\`, and a `"` may only appear
/// escaped.
pub fn unescape(token: &str) -> Result<Cow<'_, str>> {
    let escapes = token.bytes().filter(|&b| chars::needs_escape(b)).count();
    if escapes == 0 {
        return Ok(Cow::Borrowed(token));
    }
    if escapes % 2 == 1 {
        return Err(Error::invalid_argument(format!(
            "Illegal escape sequence in authorization: {token}"
        )));
    }

    let mut out = String::with_capacity(token.len() - escapes / 2);
    let mut it = token.chars();
    while let Some(c) = it.next() {
        match c {
            '\\' => match it.next() {
                Some(escaped @ ('"' | '\\')) => out.push(escaped),
                _ => {
                    return Err(Error::invalid_argument(format!(
                        "Illegal escape sequence in authorization: {token}"
                    )));
                }
            },
            '"' => {
                return Err(Error::invalid_argument(format!(
                    "Illegal character after slash in authorization: {token}"
                )));
            }
            c => out.push(c),
        }
    }
    Ok(Cow::Owned(out))
}

/// Produce the token form of `value`, quoting only when a character falls
/// outside the bare set.
pub fn quote(value: &str) -> Result<Cow<'_, str>> {
    if value.is_empty() {
        return Err(Error::invalid_argument(EMPTY_AUTHORIZATION));
    }
    if chars::is_bare(value.as_bytes()) {
        Ok(Cow::Borrowed(value))
    } else {
        Ok(escape(value, true))
    }
}

/// Recover the logical value of a token written by [`quote`].
///
/// A token that is not wrapped in quotes is returned as is.
pub fn unquote(token: &str) -> Result<Cow<'_, str>> {
    if token.is_empty() || token == "\"\"" {
        return Err(Error::invalid_argument(EMPTY_AUTHORIZATION));
    }
    match token
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(body) => unescape(body),
        None => Ok(Cow::Borrowed(token)),
    }
}

/// Byte-level [`escape`], used to key authorization sets by token form.
pub(crate) fn escape_bytes(value: &[u8], quote: bool) -> Cow<'_, [u8]> {
    let escapes = value.iter().filter(|&&b| chars::needs_escape(b)).count();
    if escapes == 0 && !quote {
        return Cow::Borrowed(value);
    }

    let mut out = Vec::with_capacity(value.len() + escapes + if quote { 2 } else { 0 });
    if quote {
        out.push(QUOTE);
    }
    for &b in value {
        if chars::needs_escape(b) {
            out.push(BACKSLASH);
        }
        out.push(b);
    }
    if quote {
        out.push(QUOTE);
    }
    Cow::Owned(out)
}

/// Drop the `\` of every escape pair in a quoted body the tokenizer has
/// already checked.
pub(crate) fn unescape_checked(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut escaped = false;
    for &b in body {
        if b == BACKSLASH && !escaped {
            escaped = true;
            continue;
        }
        escaped = false;
        out.push(b);
    }
    out
}
