use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};

use super::MatchRange;

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn whole_word_ok(line: &[u8], start: usize, end: usize) -> bool {
    let before_ok = start == 0 || !is_word_byte(line[start - 1]);
    let after_ok = end == line.len() || !is_word_byte(line[end]);
    before_ok && after_ok
}

/// Literal substring match strategy. Case-folding, when enabled, is delegated
/// to `aho-corasick`'s own ASCII case-insensitive mode rather than folding the
/// needle and haystack by hand: it matches the original bytes directly, so
/// reported offsets never need the length-preservation assumption spec.md §9
/// calls out for hand-rolled folding.
pub struct LiteralMatcher {
    automaton: Option<AhoCorasick>,
    whole_word: bool,
}

impl LiteralMatcher {
    pub fn new(needle: &str, ignore_case: bool, whole_word: bool) -> LiteralMatcher {
        if needle.is_empty() {
            return LiteralMatcher {
                automaton: None,
                whole_word,
            };
        }

        let automaton = AhoCorasickBuilder::new()
            .ascii_case_insensitive(ignore_case)
            .match_kind(MatchKind::LeftmostFirst)
            .build([needle.as_bytes()])
            .expect("single-pattern automaton always builds");

        LiteralMatcher {
            automaton: Some(automaton),
            whole_word,
        }
    }

    pub fn find_ranges(&self, line: &[u8]) -> Vec<MatchRange> {
        let Some(automaton) = &self.automaton else {
            return Vec::new();
        };

        let mut ranges = Vec::new();
        let mut cursor = 0usize;
        while cursor <= line.len() {
            let Some(m) = automaton.find(&line[cursor..]) else {
                break;
            };
            let start = cursor + m.start();
            let end = cursor + m.end();

            if self.whole_word && !whole_word_ok(line, start, end) {
                cursor = start + 1;
                continue;
            }

            ranges.push(MatchRange::new(start, end));
            cursor = end;
        }
        ranges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("needle", false, false, b"alpha needle", &[(6, 12)]; "plain substring")]
    #[test_case("needle", true, false, b"NEEDLE here", &[(0, 6)]; "ascii case-insensitive")]
    #[test_case("needle", false, true, b"a needled thing", &[]; "whole word rejects prefix match")]
    #[test_case("needle", false, true, b"a needle, a needles", &[(2, 8)]; "whole word accepts punctuation boundary")]
    #[test_case("", false, false, b"anything", &[]; "empty needle never matches")]
    fn literal_matches(needle: &str, ignore_case: bool, whole_word: bool, line: &[u8], expected: &[(usize, usize)]) {
        let matcher = LiteralMatcher::new(needle, ignore_case, whole_word);
        let ranges: Vec<(usize, usize)> = matcher
            .find_ranges(line)
            .into_iter()
            .map(|r| (r.start, r.end))
            .collect();
        assert_eq!(ranges, expected);
    }

    #[test]
    fn non_overlapping_repeated_matches() {
        let matcher = LiteralMatcher::new("aa", false, false);
        let ranges = matcher.find_ranges(b"aaaa");
        assert_eq!(ranges.len(), 2);
        assert_eq!(ranges[0], MatchRange::new(0, 2));
        assert_eq!(ranges[1], MatchRange::new(2, 4));
    }
}
