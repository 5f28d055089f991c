use std::path::{Component, Path};

use super::IgnoreRule;

/// A directory's effective rule list: the parent's effective set followed by
/// the rules parsed locally (spec.md §4.2 "Inheritance"). Cheap to clone —
/// recursion frames carry their own copy by value rather than sharing a
/// reference, so no cross-thread mutation is possible (spec.md §5).
#[derive(Clone, Default)]
pub struct RuleSet {
    rules: Vec<IgnoreRule>,
}

impl RuleSet {
    pub fn empty() -> RuleSet {
        RuleSet { rules: Vec::new() }
    }

    pub fn extended_with(&self, local: Vec<IgnoreRule>) -> RuleSet {
        let mut rules = self.rules.clone();
        rules.extend(local);
        RuleSet { rules }
    }

    /// spec.md §4.2 step 2: evaluate every applicable rule in order,
    /// last-match-wins. The built-in default-ignored-directory check (step 1)
    /// is applied by the caller, which alone knows whether `path` is the
    /// traversal root.
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let mut ignored = false;
        for rule in &self.rules {
            if rule.dir_only && !is_dir {
                continue;
            }
            let Some(rel) = relative_slash_path(path, &rule.base_dir) else {
                continue;
            };
            if rel == "." || rel.starts_with("../") {
                continue;
            }
            if rule.matches_rel(&rel) {
                ignored = !rule.negate;
            }
        }
        ignored
    }
}

fn relative_slash_path(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    if rel.as_os_str().is_empty() {
        return Some(".".to_string());
    }

    let mut parts = Vec::new();
    for component in rel.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::ParentDir => parts.push("..".to_string()),
            _ => {}
        }
    }
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ignore::IgnoreRule;
    use std::path::Path;

    fn rule(base: &str, text: &str) -> IgnoreRule {
        IgnoreRule::parse(Path::new(base), text).unwrap().unwrap()
    }

    #[test]
    fn last_match_wins_with_negation() {
        let set = RuleSet::empty().extended_with(vec![
            rule("/root", "*.txt"),
            rule("/root", "!keep.txt"),
        ]);
        assert!(set.is_ignored(Path::new("/root/drop.txt"), false));
        assert!(!set.is_ignored(Path::new("/root/keep.txt"), false));
    }

    #[test]
    fn inheritance_appends_child_rules_after_parent() {
        let parent = RuleSet::empty().extended_with(vec![rule("/root", "*.txt")]);
        let child = parent.extended_with(vec![rule("/root/nested", "!keep.txt")]);
        assert!(child.is_ignored(Path::new("/root/nested/drop.txt"), false));
        assert!(!child.is_ignored(Path::new("/root/nested/keep.txt"), false));
    }

    #[test]
    fn rule_does_not_apply_outside_its_base_dir() {
        let set = RuleSet::empty().extended_with(vec![rule("/root/nested", "*.txt")]);
        assert!(!set.is_ignored(Path::new("/root/other/drop.txt"), false));
    }
}
