//! Change tracking for visible buffers
//!
//! Every visible buffer is in exactly one state. Buffers that are not
//! visible are not tracked at all, which keeps the dirty and clean sets
//! disjoint and free of stale entries by construction.

use std::collections::BTreeMap;

use crate::host::BufferId;

/// Decoration state of a visible buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Needs a scan on the next tick
    Dirty,
    /// Decorations match the current text and rules
    Clean,
    /// No configuration covers the buffer path; left alone until the
    /// configurations change
    NoMatch,
}

/// Dirty/clean partition of the visible buffers
#[derive(Debug, Default)]
pub struct ChangeTracker {
    states: BTreeMap<BufferId, BufferState>,
}

impl ChangeTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// The set of visible buffers changed
    ///
    /// Newly visible buffers become dirty; settled buffers that stay visible
    /// keep their state; anything no longer visible is forgotten.
    pub fn visibility_changed(&mut self, visible: &[BufferId]) {
        let mut states = BTreeMap::new();
        for &id in visible {
            let state = self.states.get(&id).copied().unwrap_or(BufferState::Dirty);
            states.insert(id, state);
        }

        self.states = states;
        tracing::debug!(
            "Visibility changed: {} visible, {} dirty",
            self.states.len(),
            self.dirty().len()
        );
    }

    /// A buffer's text changed
    ///
    /// Returns true if the buffer is now waiting for a scan. Hidden buffers
    /// and buffers no configuration covers are ignored.
    pub fn content_changed(&mut self, id: BufferId) -> bool {
        match self.states.get_mut(&id) {
            Some(state) if *state != BufferState::NoMatch => {
                *state = BufferState::Dirty;
                true
            }
            _ => false,
        }
    }

    /// Start over with every visible buffer dirty
    pub fn mark_all_dirty(&mut self, visible: &[BufferId]) {
        self.states = visible.iter().map(|&id| (id, BufferState::Dirty)).collect();
    }

    /// A scan of a dirty buffer finished
    pub fn mark_clean(&mut self, id: BufferId) {
        self.settle(id, BufferState::Clean);
    }

    /// A dirty buffer turned out to be covered by no configuration
    pub fn mark_no_match(&mut self, id: BufferId) {
        self.settle(id, BufferState::NoMatch);
    }

    fn settle(&mut self, id: BufferId, to: BufferState) {
        if let Some(state) = self.states.get_mut(&id) {
            if *state == BufferState::Dirty {
                *state = to;
            }
        }
    }

    /// Current state of a buffer; `None` if it is not visible
    pub fn state(&self, id: BufferId) -> Option<BufferState> {
        self.states.get(&id).copied()
    }

    /// Buffers waiting for a scan, in id order
    pub fn dirty(&self) -> Vec<BufferId> {
        self.in_state(BufferState::Dirty)
    }

    /// Buffers whose decorations are up to date
    pub fn clean(&self) -> Vec<BufferId> {
        self.in_state(BufferState::Clean)
    }

    /// Buffers no configuration covers
    pub fn no_match(&self) -> Vec<BufferId> {
        self.in_state(BufferState::NoMatch)
    }

    pub fn has_dirty(&self) -> bool {
        self.states.values().any(|&state| state == BufferState::Dirty)
    }

    fn in_state(&self, wanted: BufferState) -> Vec<BufferId> {
        self.states
            .iter()
            .filter(|&(_, &state)| state == wanted)
            .map(|(&id, _)| id)
            .collect()
    }
}
