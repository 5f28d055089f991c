use anyhow::{anyhow, Result};
use regex::bytes::Regex;

use super::MatchRange;

/// Regex match strategy. Uses `regex::bytes::Regex` so byte offsets are
/// reported directly against the line's raw bytes, with no UTF-8 boundary
/// concerns, the same way the teacher reaches for `regex::bytes` whenever it
/// needs offsets into arbitrary (not necessarily UTF-8) path bytes.
pub struct RegexMatcher {
    re: Regex,
}

impl RegexMatcher {
    pub fn compile(pattern: &str, ignore_case: bool, whole_word: bool) -> Result<RegexMatcher> {
        let mut wrapped = pattern.to_string();
        if whole_word {
            wrapped = format!(r"\b(?:{wrapped})\b");
        }
        if ignore_case {
            wrapped = format!("(?i){wrapped}");
        }

        let re = Regex::new(&wrapped)
            .map_err(|e| anyhow!("invalid regular expression '{}': {}", pattern, e))?;
        Ok(RegexMatcher { re })
    }

    pub fn find_ranges(&self, line: &[u8]) -> Vec<MatchRange> {
        self.re
            .find_iter(line)
            .map(|m| MatchRange::new(m.start(), m.end()))
            .collect()
    }
}
