//! In-memory workspace implementing `Host`
//!
//! Holds the open buffers, which of them are visible, and the decorations
//! applied to each. The terminal viewer renders from it and tests inspect
//! it; every decoration call is also recorded in order.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::buffer::Buffer;
use crate::error::Result;
use crate::highlight::{DecorationRange, DecorationStyle};
use crate::host::{BufferId, DecorationHandle, Host};

/// A decoration call received from the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecorationCall {
    Create(DecorationHandle),
    Dispose(DecorationHandle),
    /// Ranges applied (0 = cleared)
    Apply {
        buffer: BufferId,
        handle: DecorationHandle,
        ranges: usize,
    },
}

/// Open buffers, their visibility and decorations
#[derive(Debug, Default)]
pub struct Workspace {
    /// Directory buffer paths are made relative to
    root: Option<PathBuf>,
    buffers: BTreeMap<BufferId, Buffer>,
    /// Visible buffers, in display order
    visible: Vec<BufferId>,
    next_buffer: usize,
    /// Live decoration styles
    styles: BTreeMap<DecorationHandle, DecorationStyle>,
    next_decoration: u64,
    applied: HashMap<(BufferId, DecorationHandle), Vec<DecorationRange>>,
    calls: Vec<DecorationCall>,
}

impl Workspace {
    /// Create an empty workspace
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a workspace whose buffer paths are relative to `root`
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Default::default()
        }
    }

    /// Open an in-memory buffer and show it
    pub fn open_text(&mut self, path: &str, text: &str) -> BufferId {
        self.open(Buffer::from_text(path, text))
    }

    /// Open a file and show it
    pub fn open_file(&mut self, path: &Path) -> Result<BufferId> {
        let buffer = Buffer::from_file(path, self.root.as_deref())?;
        Ok(self.open(buffer))
    }

    fn open(&mut self, buffer: Buffer) -> BufferId {
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.buffers.insert(id, buffer);
        self.visible.push(id);
        id
    }

    /// Close a buffer, dropping its decorations
    pub fn close(&mut self, id: BufferId) {
        self.buffers.remove(&id);
        self.visible.retain(|&v| v != id);
        self.applied.retain(|&(buffer, _), _| buffer != id);
    }

    /// Make a buffer visible
    pub fn show(&mut self, id: BufferId) {
        if self.buffers.contains_key(&id) && !self.visible.contains(&id) {
            self.visible.push(id);
        }
    }

    /// Hide a buffer without closing it
    pub fn hide(&mut self, id: BufferId) {
        self.visible.retain(|&v| v != id);
    }

    /// Replace a buffer's text
    pub fn set_text(&mut self, id: BufferId, text: &str) {
        if let Some(buffer) = self.buffers.get_mut(&id) {
            buffer.set_text(text);
        }
    }

    /// Re-read a buffer from disk; true if its text changed
    pub fn reload(&mut self, id: BufferId) -> Result<bool> {
        match self.buffers.get_mut(&id) {
            Some(buffer) => Ok(buffer.reload()?),
            None => Ok(false),
        }
    }

    /// Find the buffer backed by a file
    pub fn find_file(&self, path: &Path) -> Option<BufferId> {
        self.buffers
            .iter()
            .find(|(_, buffer)| buffer.filename().is_some_and(|f| same_file(f, path)))
            .map(|(&id, _)| id)
    }

    /// Ranges a decoration currently covers in a buffer
    pub fn ranges(&self, id: BufferId, handle: DecorationHandle) -> &[DecorationRange] {
        self.applied
            .get(&(id, handle))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Decorations applied to a buffer, in creation order
    pub fn decorations_on(&self, id: BufferId) -> Vec<(DecorationStyle, &[DecorationRange])> {
        self.styles
            .iter()
            .filter_map(|(&handle, style)| {
                let ranges = self.applied.get(&(id, handle))?;
                Some((*style, ranges.as_slice()))
            })
            .collect()
    }

    /// Style of a live decoration
    pub fn style(&self, handle: DecorationHandle) -> Option<&DecorationStyle> {
        self.styles.get(&handle)
    }

    /// Number of decorations created and not yet disposed
    pub fn live_decorations(&self) -> usize {
        self.styles.len()
    }

    /// Decoration calls received so far
    pub fn calls(&self) -> &[DecorationCall] {
        &self.calls
    }

    /// Drain the call log
    pub fn take_calls(&mut self) -> Vec<DecorationCall> {
        std::mem::take(&mut self.calls)
    }
}

impl Host for Workspace {
    fn visible_buffers(&self) -> Vec<BufferId> {
        self.visible.clone()
    }

    fn buffer_path(&self, id: BufferId) -> Option<&str> {
        self.buffers.get(&id).map(Buffer::path)
    }

    fn line_count(&self, id: BufferId) -> usize {
        self.buffers.get(&id).map_or(0, Buffer::line_count)
    }

    fn line_text(&self, id: BufferId, line: usize) -> Option<&str> {
        self.buffers.get(&id)?.line(line)
    }

    fn create_decoration(&mut self, style: &DecorationStyle) -> DecorationHandle {
        let handle = DecorationHandle(self.next_decoration);
        self.next_decoration += 1;
        self.styles.insert(handle, *style);
        self.calls.push(DecorationCall::Create(handle));
        handle
    }

    fn dispose_decoration(&mut self, handle: DecorationHandle) {
        self.styles.remove(&handle);
        self.applied.retain(|&(_, h), _| h != handle);
        self.calls.push(DecorationCall::Dispose(handle));
    }

    fn apply_decoration(&mut self, id: BufferId, handle: DecorationHandle, ranges: &[DecorationRange]) {
        self.calls.push(DecorationCall::Apply {
            buffer: id,
            handle,
            ranges: ranges.len(),
        });

        if !self.styles.contains_key(&handle) || !self.buffers.contains_key(&id) {
            tracing::debug!("Ignoring decoration {:?} for {:?}", handle, id);
            return;
        }

        if ranges.is_empty() {
            self.applied.remove(&(id, handle));
        } else {
            self.applied.insert((id, handle), ranges.to_vec());
        }
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
