//! Decoration reconciliation
//!
//! One tick scans every dirty buffer against the configurations covering
//! its path and pushes the resulting ranges to the host, one call per rule.
//! A tick with nothing to do returns immediately, so it is cheap to run on
//! a timer.

use super::matcher::match_lines;
use super::store::RuleStore;
use super::style::DecorationRange;
use super::tracker::ChangeTracker;
use crate::host::{BufferId, DecorationHandle, Host};

/// What a tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Buffers scanned and decorated (now clean)
    pub decorated: Vec<BufferId>,
    /// Buffers no configuration covers (now no-match)
    pub unmatched: Vec<BufferId>,
    /// Total ranges handed to the host
    pub ranges: usize,
}

impl TickReport {
    /// Check if the tick touched nothing
    pub fn is_idle(&self) -> bool {
        self.decorated.is_empty() && self.unmatched.is_empty()
    }
}

/// Decorate every dirty buffer
pub fn reconcile<H: Host + ?Sized>(
    host: &mut H,
    store: &mut RuleStore,
    tracker: &mut ChangeTracker,
) -> TickReport {
    let mut report = TickReport::default();
    if store.decoration_count() == 0 || !tracker.has_dirty() {
        return report;
    }

    for id in tracker.dirty() {
        let Some(batches) = scan_buffer(&*host, store, id) else {
            tracker.mark_no_match(id);
            report.unmatched.push(id);
            continue;
        };

        for (handle, ranges) in &batches {
            report.ranges += ranges.len();
            host.apply_decoration(id, *handle, ranges);
        }
        store.note_decorated(id);
        tracker.mark_clean(id);
        report.decorated.push(id);
    }

    tracing::debug!(
        "Tick decorated {} buffer(s) with {} range(s), {} without configuration",
        report.decorated.len(),
        report.ranges,
        report.unmatched.len()
    );
    report
}

/// Compute the ranges of every applicable rule for one buffer
///
/// Returns `None` when no configuration covers the buffer's path. Rules
/// without matches still get an entry (with no ranges) so stale ranges from
/// a previous scan are cleared.
pub fn scan_buffer<H: Host + ?Sized>(
    host: &H,
    store: &RuleStore,
    id: BufferId,
) -> Option<Vec<(DecorationHandle, Vec<DecorationRange>)>> {
    let path = host.buffer_path(id)?;
    let mut applicable = store.applicable(path).peekable();
    applicable.peek()?;

    let lines = (0..host.line_count(id)).map(|line| host.line_text(id, line).unwrap_or(""));

    Some(
        applicable
            .flat_map(|configuration| configuration.rules.iter())
            .map(|rule| (rule.decoration, match_lines(&rule.matchers, lines.clone())))
            .collect(),
    )
}
