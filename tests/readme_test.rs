//! Keeps README.md honest: the dependency snippet and MSRV follow
//! Cargo.toml, the imports name public items, and the grammar claims hold.

use std::collections::HashSet;

use accessexpr::validate;

struct Fence {
    lang: String,
    body: String,
}

fn read(path: &str) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("could not read {path}: {e}"))
}

/// Fenced code blocks of README.md, in order.
fn fences() -> Vec<Fence> {
    let readme = read("README.md");
    let mut fences = Vec::new();
    let mut open: Option<Fence> = None;
    for line in readme.lines() {
        match (line.strip_prefix("```"), open.as_mut()) {
            (Some(_), Some(_)) => fences.extend(open.take()),
            (Some(lang), None) => {
                open = Some(Fence {
                    lang: lang.trim().to_owned(),
                    body: String::new(),
                })
            }
            (None, Some(fence)) => {
                fence.body.push_str(line);
                fence.body.push('\n');
            }
            (None, None) => {}
        }
    }
    assert!(open.is_none(), "README.md has an unclosed code fence");
    fences
}

/// A `key = "value"` entry of the `[package]` table.
fn package_value(key: &str) -> String {
    let cargo_toml = read("Cargo.toml");
    cargo_toml
        .lines()
        .skip_while(|line| line.trim() != "[package]")
        .skip(1)
        .take_while(|line| !line.starts_with('['))
        .find_map(|line| {
            let (k, v) = line.split_once('=')?;
            (k.trim() == key).then(|| v.trim().trim_matches('"').to_owned())
        })
        .unwrap_or_else(|| panic!("no {key} in [package]"))
}

/// Names re-exported at the crate root by `pub use` lines in src/lib.rs.
fn root_exports() -> HashSet<String> {
    read("src/lib.rs")
        .lines()
        .filter_map(|line| line.strip_prefix("pub use "))
        .flat_map(|path| {
            let items = path.trim_end_matches(';');
            let items = items.split_once("::{").map_or_else(
                || items.rsplit("::").next().unwrap_or(items),
                |(_, list)| list.trim_end_matches('}'),
            );
            items.split(',').map(|item| item.trim().to_owned()).collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn dependency_snippet_matches_package_version() {
    let version = package_value("version");
    let (major_minor, _) = version.rsplit_once('.').expect("version has three parts");

    let snippet = fences()
        .into_iter()
        .filter(|fence| fence.lang == "toml")
        .find_map(|fence| {
            fence
                .body
                .lines()
                .find(|line| line.starts_with("accessexpr ="))
                .map(str::to_owned)
        })
        .expect("README.md has an accessexpr dependency line");
    assert_eq!(snippet, format!("accessexpr = {{ version = \"{major_minor}\" }}"));
}

#[test]
fn msrv_sentence_matches_package() {
    let msrv = package_value("rust-version");
    assert!(
        read("README.md").contains(&format!("Requires Rust {msrv} or later.")),
        "README.md should state MSRV {msrv}"
    );
}

#[test]
fn rust_snippets_import_public_items() {
    let exports = root_exports();
    let mut imported = 0;
    for fence in fences().iter().filter(|fence| fence.lang == "rust") {
        for line in fence.body.lines() {
            let Some(list) = line.strip_prefix("use accessexpr::{") else {
                continue;
            };
            for name in list.trim_end_matches("};").split(',') {
                let name = name.trim();
                assert!(exports.contains(name), "README imports unknown accessexpr::{name}");
                imported += 1;
            }
        }
    }
    assert!(imported > 0);
}

#[test]
fn text_snippets_are_valid_expressions() {
    let examples: Vec<String> = fences()
        .into_iter()
        .filter(|fence| fence.lang == "text")
        .flat_map(|fence| fence.body.lines().map(str::to_owned).collect::<Vec<_>>())
        .collect();
    assert!(!examples.is_empty());
    for example in examples {
        assert!(validate(&example).is_ok(), "README example {example:?} is invalid");
    }
}

/// Lines such as "(`a|b&c` is an error, `a|(b&c)` is fine)".
#[test]
fn grammar_claims_hold() {
    let readme = read("README.md");
    let mut checked = 0;
    for clause in readme.split(',') {
        let mut parts = clause.split('`');
        let (Some(_), Some(code), Some(verdict)) = (parts.next(), parts.next(), parts.next()) else {
            continue;
        };
        if verdict.starts_with(" is an error") {
            assert!(validate(code).is_err(), "README says {code:?} is an error");
            checked += 1;
        } else if verdict.starts_with(" is fine") {
            assert!(validate(code).is_ok(), "README says {code:?} is fine");
            checked += 1;
        }
    }
    assert_eq!(checked, 2);
}
