//! Line matchers compiled from rule patterns
//!
//! Each pattern string of a rule becomes one `LineMatcher`. Patterns that
//! fail to compile are dropped on their own; sibling patterns and rules are
//! unaffected.

use regex::{Regex, RegexBuilder};

use super::rules::Rule;
use super::style::DecorationRange;

/// A compiled pattern that finds every non-empty match on a line
#[derive(Debug, Clone)]
pub struct LineMatcher {
    /// Compiled regex pattern
    pattern: Regex,
}

impl LineMatcher {
    /// Compile a pattern, case-insensitive unless `match_case` is set
    pub fn new(pattern: &str, match_case: bool) -> Option<Self> {
        match RegexBuilder::new(pattern)
            .case_insensitive(!match_case)
            .build()
        {
            Ok(regex) => Some(Self { pattern: regex }),
            Err(e) => {
                tracing::debug!("Skipping pattern {:?}: {}", pattern, e);
                None
            }
        }
    }

    /// Source text of the pattern
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Append a range for every non-overlapping, non-empty match in `text`
    pub fn find_ranges(&self, line: usize, text: &str, ranges: &mut Vec<DecorationRange>) {
        // Walk char columns forward instead of recounting from the line start.
        let mut col = 0;
        let mut byte = 0;

        for m in self.pattern.find_iter(text) {
            if m.is_empty() {
                continue;
            }
            col += text[byte..m.start()].chars().count();
            let len = m.as_str().chars().count();
            ranges.push(DecorationRange::new(line, col, col + len - 1));
            col += len;
            byte = m.end();
        }
    }
}

/// Compile all patterns of a rule; invalid ones are skipped
pub fn compile_rule(rule: &Rule) -> Vec<LineMatcher> {
    rule.patterns
        .iter()
        .filter_map(|pattern| LineMatcher::new(pattern, rule.match_case))
        .collect()
}

/// Run matchers over a sequence of lines
///
/// Ranges are grouped by matcher, then by line, in the order given.
pub fn match_lines<'a>(
    matchers: &[LineMatcher],
    lines: impl Iterator<Item = &'a str> + Clone,
) -> Vec<DecorationRange> {
    let mut ranges = Vec::new();
    for matcher in matchers {
        for (idx, text) in lines.clone().enumerate() {
            matcher.find_ranges(idx, text, &mut ranges);
        }
    }
    ranges
}
