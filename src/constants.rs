// Access Expression Constants
//
// Structural characters of the grammar and the default safety limits.

/// `&`: joins a run of terms that must all hold.
pub const AND_OPERATOR: u8 = b'&';

/// `|`: joins a run of terms where one must hold.
pub const OR_OPERATOR: u8 = b'|';

pub const OPEN_PAREN: u8 = b'(';

pub const CLOSE_PAREN: u8 = b')';

/// Delimits a quoted authorization token.
pub const QUOTE: u8 = b'"';

/// Escapes `"` or `\` inside a quoted authorization token.
pub const BACKSLASH: u8 = b'\\';

/// Default maximum parenthesis nesting depth.
///
/// Each nesting level costs one frame of the recursive-descent reader.
pub const DEFAULT_MAX_NESTING_DEPTH: u32 = 512;
