//! Integration tests for the `gosearch` CLI, grounded on the teacher's
//! `tests/tests.rs` (one test binary, `mod testenv;`, shelling out to the
//! built binary against a temp directory tree).

mod testenv;

use testenv::TestEnv;

#[cfg(unix)]
use std::os::unix::fs::symlink;

#[test]
fn finds_literal_matches_in_a_small_tree() {
    let te = TestEnv::new(
        &["one", "one/two"],
        &[
            ("a.txt", "hello needle world\n"),
            ("one/b.txt", "nothing here\n"),
            ("one/two/c.txt", "another needle line\n"),
        ],
    );

    let (lines, code) = te.run_sorted(&["needle"]);
    assert_eq!(code, 0);
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().any(|l| l.contains("a.txt") && l.contains("needle")));
    assert!(lines.iter().any(|l| l.contains("c.txt") && l.contains("needle")));
}

#[test]
fn exits_with_no_matches_code_when_nothing_found() {
    let te = TestEnv::new(&[], &[("a.txt", "hello world\n")]);

    let (lines, code) = te.run_sorted(&["needle"]);
    assert_eq!(code, 1);
    assert!(lines.is_empty());
}

#[test]
fn skips_binary_files() {
    let te = TestEnv::new(&[], &[]);
    te.write_file("binary.dat", "needle\0in\0a\0binary\0file");
    te.write_file("text.txt", "needle in a text file\n");

    let (lines, code) = te.run_sorted(&["needle"]);
    assert_eq!(code, 0);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("text.txt"));
}

#[test]
fn honors_gitignore_with_a_negated_nested_pattern() {
    let te = TestEnv::new(
        &["nested"],
        &[
            (".gitignore", "*.txt\n"),
            ("a.txt", "needle at the root, ignored\n"),
            ("nested/keep.txt", "needle in a kept file\n"),
            ("nested/drop.txt", "needle in a discarded file\n"),
            ("nested/.gosearchignore", "!keep.txt\n"),
        ],
    );

    let (lines, code) = te.run_sorted(&["needle"]);
    assert_eq!(code, 0);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("keep.txt"));
}

#[test]
fn limits_recursion_with_max_depth() {
    let te = TestEnv::new(
        &["one/two/three"],
        &[
            ("a.txt", "needle at the root\n"),
            ("one/b.txt", "needle one level down\n"),
            ("one/two/three/c.txt", "needle three levels down\n"),
        ],
    );

    let (lines, code) = te.run_sorted(&["--max-depth", "1", "needle"]);
    assert_eq!(code, 0);
    assert_eq!(lines.len(), 2);
    assert!(!lines.iter().any(|l| l.contains("c.txt")));
}

#[test]
fn case_insensitive_search_matches_any_case() {
    let te = TestEnv::new(&[], &[("a.txt", "this has a NeEdLe in it\n")]);

    let (lines, code) = te.run_sorted(&["-i", "needle"]);
    assert_eq!(code, 0);
    assert_eq!(lines.len(), 1);
}

#[test]
fn quiet_mode_prints_nothing_but_still_reports_a_match() {
    let te = TestEnv::new(&[], &[("a.txt", "needle\n")]);

    let (stdout, _stderr, code) = te.run(&["-q", "needle"]);
    assert_eq!(code, 0);
    assert!(stdout.is_empty());
}

#[test]
fn count_only_reports_the_total_match_count() {
    let te = TestEnv::new(
        &[],
        &[
            ("a.txt", "needle\nneedle again\n"),
            ("b.txt", "no match here\n"),
        ],
    );

    let (stdout, _stderr, code) = te.run(&["--count", "needle"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "2");
}

#[cfg(unix)]
#[test]
fn follows_symlinks_without_looping_forever() {
    let te = TestEnv::new(
        &["a", "b"],
        &[("a/needle.txt", "needle in a\n"), ("b/other.txt", "nothing here\n")],
    );

    symlink(te.root().join("a"), te.root().join("b/to_a")).expect("create symlink");
    symlink(te.root().join("b"), te.root().join("a/to_b")).expect("create symlink");

    let (lines, code) = te.run_sorted(&["-L", "needle"]);
    assert_eq!(code, 0);
    assert!(lines.iter().any(|l| l.contains("needle.txt")));
}

#[test]
fn extension_filter_restricts_which_files_are_scanned() {
    let te = TestEnv::new(
        &[],
        &[("a.rs", "needle in rust\n"), ("a.md", "needle in markdown\n")],
    );

    let (lines, code) = te.run_sorted(&["-e", "rs", "needle"]);
    assert_eq!(code, 0);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("a.rs"));
}
