//! Byte classification for the access expression grammar.
//!
//! ```text
//! bare_char := ALPHA | DIGIT | "_" | "-" | ":" | "." | "/"
//! ```
//!
//! Only ASCII is ever legal in a bare token; anything else must be quoted.

use crate::constants::{BACKSLASH, QUOTE};

const fn bare_table() -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0;
    while i < table.len() {
        let b = i as u8;
        table[i] = b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b':' | b'.' | b'/');
        i += 1;
    }
    table
}

static BARE: [bool; 256] = bare_table();

/// Whether `b` may appear in an unquoted authorization token.
#[inline]
pub fn is_bare_byte(b: u8) -> bool {
    BARE[usize::from(b)]
}

/// Whether every byte of `value` may appear in an unquoted token.
///
/// Returns `true` for the empty string; callers reject that separately.
#[inline]
pub fn is_bare(value: &[u8]) -> bool {
    value.iter().all(|&b| is_bare_byte(b))
}

/// `"` or `\`, the two bytes that need escaping inside quotes.
#[inline]
pub fn needs_escape(b: u8) -> bool {
    b == QUOTE || b == BACKSLASH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_set_is_exactly_ascii_alnum_and_punctuation() {
        let legal: Vec<u8> = (0..=255u8).filter(|&b| is_bare_byte(b)).collect();
        let mut expected: Vec<u8> = (b'0'..=b'9')
            .chain(b'A'..=b'Z')
            .chain(b'a'..=b'z')
            .chain(*b"_-:./")
            .collect();
        expected.sort_unstable();
        assert_eq!(legal, expected);
    }

    #[test]
    fn structural_bytes_are_not_bare() {
        for b in *b"&|()\"\\ \t" {
            assert!(!is_bare_byte(b), "{:?} should not be bare", b as char);
        }
        assert!(needs_escape(b'"') && needs_escape(b'\\'));
    }

    #[test]
    fn non_ascii_requires_quoting() {
        assert!(!is_bare("café".as_bytes()));
        assert!(is_bare(b"a.b/c:d-e_f"));
    }
}
