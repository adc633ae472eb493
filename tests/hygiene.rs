//! Hygiene: scans production sources of both workspace crates for patterns
//! that crash the process or silently drop errors. Every budget is zero; test
//! files (`*_test.rs`) are exempt.

use std::fs;
use std::path::Path;

/// Source roots, relative to the workspace root.
const ROOTS: &[&str] = &["src", "canvas/src"];

struct Rule {
    pattern: &'static str,
    budget: usize,
    why: &'static str,
}

const PANICS: &[Rule] = &[
    Rule { pattern: ".unwrap()", budget: 0, why: "propagate with `?` or handle the None/Err arm" },
    Rule { pattern: ".expect(", budget: 0, why: "propagate with `?` or handle the None/Err arm" },
    Rule { pattern: "panic!(", budget: 0, why: "return a DrawError instead" },
    Rule { pattern: "unreachable!(", budget: 0, why: "restructure the match so the arm cannot exist" },
    Rule { pattern: "todo!(", budget: 0, why: "finish the stub" },
    Rule { pattern: "unimplemented!(", budget: 0, why: "finish the stub" },
];

const SILENT_LOSS: &[Rule] = &[
    Rule { pattern: "let _ =", budget: 0, why: "inspect the value or log why it is dropped" },
    Rule { pattern: ".ok()", budget: 0, why: "map the error or log it before discarding" },
];

const STYLE: &[Rule] = &[Rule { pattern: "#[allow(dead_code)]", budget: 0, why: "delete the dead code" }];

struct SourceFile {
    path: String,
    content: String,
}

fn source_files() -> Vec<SourceFile> {
    let mut files = Vec::new();
    for root in ROOTS {
        collect_rs_files(Path::new(root), &mut files);
    }
    files
}

fn collect_rs_files(dir: &Path, out: &mut Vec<SourceFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_rs_files(&path, out);
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        if path.extension().is_none_or(|e| e != "rs") || path_str.ends_with("_test.rs") {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            out.push(SourceFile { path: path_str, content });
        }
    }
}

/// Every rule whose line count exceeds its budget, formatted for the failure message.
fn violations(files: &[SourceFile], rules: &[Rule]) -> Vec<String> {
    let mut out = Vec::new();
    for rule in rules {
        let hits: Vec<(&str, usize)> = files
            .iter()
            .map(|f| (f.path.as_str(), f.content.lines().filter(|l| l.contains(rule.pattern)).count()))
            .filter(|(_, n)| *n > 0)
            .collect();
        let found: usize = hits.iter().map(|(_, n)| n).sum();
        if found > rule.budget {
            let listing = hits
                .iter()
                .map(|(path, n)| format!("    {path}: {n}"))
                .collect::<Vec<_>>()
                .join("\n");
            out.push(format!(
                "`{}`: found {found}, budget {} ({})\n{listing}",
                rule.pattern, rule.budget, rule.why
            ));
        }
    }
    out
}

fn assert_within_budget(rules: &[Rule]) {
    let files = source_files();
    assert!(!files.is_empty(), "no sources found under {ROOTS:?}");
    let found = violations(&files, rules);
    assert!(found.is_empty(), "hygiene budget exceeded:\n{}", found.join("\n"));
}

#[test]
fn no_panicking_calls() {
    assert_within_budget(PANICS);
}

#[test]
fn no_silently_dropped_results() {
    assert_within_budget(SILENT_LOSS);
}

#[test]
fn no_dead_code_allowances() {
    assert_within_budget(STYLE);
}

#[test]
fn scanner_counts_lines_not_occurrences() {
    let files = vec![SourceFile { path: "x.rs".into(), content: "a.unwrap(); b.unwrap();\nc.unwrap();".into() }];
    let rules = [Rule { pattern: ".unwrap()", budget: 1, why: "" }];
    let found = violations(&files, &rules);
    assert_eq!(found.len(), 1);
    assert!(found[0].contains("found 2"));
}
