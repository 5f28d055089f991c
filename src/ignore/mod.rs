//! Ignore Engine (spec.md §4.2): parses `.gitignore`-style files per
//! directory, composes inherited and local rules, and decides whether a path
//! should be pruned before it is enqueued.

mod rule;
mod ruleset;

pub use rule::IgnoreRule;
pub use ruleset::RuleSet;

use std::fs;
use std::io;
use std::path::Path;

/// Ignore-file names consulted in order, per directory (spec.md §4.2,
/// §6 "Ignore files").
const IGNORE_FILE_NAMES: [&str; 2] = [".gitignore", ".gosearchignore"];

/// Reads and parses `dir`'s own ignore rules. Missing files are not an
/// error; read/parse failures are logged and the offending line (or file)
/// is skipped (spec.md §4.6 "Ignore file read/parse error -> log, continue").
pub fn parse_dir_rules(dir: &Path) -> Vec<IgnoreRule> {
    let mut rules = Vec::new();

    for name in IGNORE_FILE_NAMES {
        let path = dir.join(name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => {
                print_error!("could not read {}: {}", path.display(), e);
                continue;
            }
        };

        for line in contents.lines() {
            match IgnoreRule::parse(dir, line) {
                None => {}
                Some(Ok(rule)) => rules.push(rule),
                Some(Err(msg)) => print_error!("{}: {}", path.display(), msg),
            }
        }
    }

    rules
}

/// Built-in default-ignored directory names (spec.md §4.2 step 1), before
/// the user's `-exclude-dir` set is unioned in by `Config`.
pub fn builtin_default_ignored_dirs() -> [&'static str; 3] {
    [".git", "node_modules", "vendor"]
}
