//! Seed corpus definitions for fuzz targets.
//!
//! These seeds are the source of truth for fuzzing starting points.
//! The `generate-seeds` binary writes these to `corpus/` directories
//! where libFuzzer picks them up.

/// Access expression seeds covering grammar constructs and error paths.
#[rustfmt::skip]
pub const ACCESS_SEEDS: &[(&str, &str)] = &[
    // Tokens
    ("empty", ""),
    ("bare", "A"),
    ("bare_punctuation", "a.b/c:d-e_f"),
    ("quoted", r#""A B""#),
    ("quoted_escapes", r#""a\"b\\c""#),
    ("quoted_unicode", r#""日本""#),

    // Runs and grouping
    ("and_run", "A&B&C"),
    ("or_run", "A|B|C"),
    ("nested", "A&(B|C)&D"),
    ("redundant_parens", "((A))"),
    ("deep_mix", "(a|(b&(c|d)))&e"),

    // Error paths
    ("mixed_ops", "a|b&c"),
    ("unclosed_paren", "(a|b"),
    ("unclosed_quote", r#""abc"#),
    ("empty_quotes", r#""""#),
    ("bad_escape", r#""a\b""#),
    ("trailing", "a)"),
    ("dangling_op", "a&"),
    ("space", "a b"),
];
