//! Thread-id discovery
//!
//! Log lines usually carry a thread or task identifier. The first
//! configuration's `lineReg` extracts it (capture group 4) from every line of
//! the visible buffers that configuration covers, and each distinct id gets a
//! rule of its own with a color from a fixed rotation.
//!
//! Discovery is a pure function of the buffers and the static configuration.
//! Its result is appended to the static rules at rebuild time and never fed
//! back into the configuration, so running it again cannot accumulate
//! duplicate rules.

use std::collections::HashSet;

use regex::Regex;

use super::rules::{Configuration, Rule};
use super::style::Color;
use crate::host::{BufferId, Host};

/// Colors assigned to discovered ids, in order.
///
/// Black, red and the yellows are left out; they read poorly or collide
/// with severity highlighting.
pub const THREAD_PALETTE: [Color; 9] = [
    Color::Magenta,
    Color::Blue,
    Color::BrightGreen,
    Color::Cyan,
    Color::BrightMagenta,
    Color::BrightBlue,
    Color::Green,
    Color::BrightCyan,
    Color::BrightRed,
];

/// Capture group of `lineReg` holding the thread id
pub const THREAD_ID_GROUP: usize = 4;

/// Suffix appended to every id; matches the literal `|` closing the id field
pub const THREAD_ID_ANCHOR: &str = r"\|";

/// Collect thread ids from `buffers`, in discovery order, without duplicates
///
/// Only buffers covered by `configuration` are scanned; each line contributes
/// at most one id (the first match). Returns nothing when the configuration
/// has no `lineReg` or it does not compile.
pub fn collect_thread_ids<H: Host + ?Sized>(
    host: &H,
    configuration: &Configuration,
    buffers: &[BufferId],
) -> Vec<String> {
    let Some(source) = configuration.line_reg.as_deref() else {
        return Vec::new();
    };

    let line_reg = match Regex::new(source) {
        Ok(regex) => regex,
        Err(e) => {
            tracing::warn!("Invalid lineReg {:?}, skipping thread discovery: {}", source, e);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for &id in buffers {
        let Some(path) = host.buffer_path(id) else {
            continue;
        };
        if !configuration.applies_to(path) {
            continue;
        }

        for line in 0..host.line_count(id) {
            let Some(text) = host.line_text(id, line) else {
                continue;
            };
            let Some(thread) = line_reg
                .captures(text)
                .and_then(|caps| caps.get(THREAD_ID_GROUP))
            else {
                continue;
            };

            let pattern = format!("{}{}", thread.as_str(), THREAD_ID_ANCHOR);
            if seen.insert(pattern.clone()) {
                ids.push(pattern);
            }
        }
    }

    ids
}

/// Turn discovered id patterns into rules, cycling through the palette
pub fn thread_rules(ids: Vec<String>) -> Vec<Rule> {
    ids.into_iter()
        .enumerate()
        .map(|(idx, id)| Rule::new([id]).with_color(THREAD_PALETTE[idx % THREAD_PALETTE.len()]))
        .collect()
}

/// Discover thread rules for the first configuration
///
/// Later configurations never take part in discovery.
pub fn discover<H: Host + ?Sized>(
    host: &H,
    configurations: &[Configuration],
    buffers: &[BufferId],
) -> Vec<Rule> {
    let Some(first) = configurations.first() else {
        return Vec::new();
    };

    let rules = thread_rules(collect_thread_ids(host, first, buffers));
    if !rules.is_empty() {
        tracing::info!("Discovered {} thread id(s)", rules.len());
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::Workspace;

    // Group 4 is the bracketed thread id: "[T1] start" -> "T1".
    const LINE_REG: &str = r"^()(\[)()(\w+)\]";

    fn log_workspace(files: &[(&str, &str)]) -> (Workspace, Vec<BufferId>) {
        let mut workspace = Workspace::new();
        let ids = files
            .iter()
            .map(|(path, text)| workspace.open_text(path, text))
            .collect();
        (workspace, ids)
    }

    #[test]
    fn test_discovers_ids_in_order() {
        let (workspace, ids) = log_workspace(&[("a.log", "[T1] start\n[T2] start\n[T1] stop")]);
        let configuration = Configuration::new(["*.log"]).with_line_reg(LINE_REG);

        let found = collect_thread_ids(&workspace, &configuration, &ids);
        assert_eq!(found, vec![r"T1\|", r"T2\|"]);

        let rules = thread_rules(found);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].patterns, vec![r"T1\|"]);
        assert_eq!(rules[1].patterns, vec![r"T2\|"]);
        assert_eq!(rules[0].color, Some(Color::Magenta));
        assert_eq!(rules[1].color, Some(Color::Blue));
    }

    #[test]
    fn test_palette_wraps() {
        let ids = (0..11).map(|n| format!("T{n}")).collect();
        let rules = thread_rules(ids);
        assert_eq!(rules[8].color, Some(Color::BrightRed));
        assert_eq!(rules[9].color, Some(Color::Magenta));
        assert_eq!(rules[10].color, Some(Color::Blue));
    }

    #[test]
    fn test_dedup_across_buffers() {
        let (workspace, ids) = log_workspace(&[
            ("a.log", "[T1] start"),
            ("b.log", "[T2] start\n[T1] again"),
        ]);
        let configuration = Configuration::new(["*.log"]).with_line_reg(LINE_REG);
        assert_eq!(
            collect_thread_ids(&workspace, &configuration, &ids),
            vec![r"T1\|", r"T2\|"]
        );
    }

    #[test]
    fn test_only_scoped_buffers_are_scanned() {
        let (workspace, ids) = log_workspace(&[("notes.txt", "[T9] start"), ("a.log", "[T1] start")]);
        let configuration = Configuration::new(["*.log"]).with_line_reg(LINE_REG);
        assert_eq!(collect_thread_ids(&workspace, &configuration, &ids), vec![r"T1\|"]);
    }

    #[test]
    fn test_missing_or_invalid_line_reg() {
        let (workspace, ids) = log_workspace(&[("a.log", "[T1] start")]);

        let configuration = Configuration::new(["*.log"]);
        assert!(collect_thread_ids(&workspace, &configuration, &ids).is_empty());

        let configuration = Configuration::new(["*.log"]).with_line_reg("([");
        assert!(collect_thread_ids(&workspace, &configuration, &ids).is_empty());
    }

    #[test]
    fn test_only_first_configuration_is_used() {
        let (workspace, ids) = log_workspace(&[("a.log", "[T1] start")]);
        let configurations = vec![
            Configuration::new(["*.txt"]).with_line_reg(LINE_REG),
            Configuration::new(["*.log"]).with_line_reg(LINE_REG),
        ];
        assert!(discover(&workspace, &configurations, &ids).is_empty());
        assert!(discover(&workspace, &[], &ids).is_empty());
    }

    #[test]
    fn test_discovery_is_repeatable() {
        let (workspace, ids) = log_workspace(&[("a.log", "[T1] start\n[T2] start")]);
        let configurations = vec![Configuration::new(["*.log"]).with_line_reg(LINE_REG)];
        let first = discover(&workspace, &configurations, &ids);
        let second = discover(&workspace, &configurations, &ids);
        assert_eq!(first, second);
    }
}
