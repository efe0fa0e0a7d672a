//! Host editor abstraction
//!
//! The highlighting engine never owns documents or draws anything itself.
//! It reads lines and paths through `Host` and hands decorated ranges back.

use crate::highlight::{DecorationRange, DecorationStyle};

/// Identifier of an open document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub usize);

/// Opaque handle for a decoration style created by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecorationHandle(pub u64);

/// Services the engine needs from the editor
pub trait Host {
    /// Buffers currently shown in some editor
    fn visible_buffers(&self) -> Vec<BufferId>;

    /// Workspace-relative path of a buffer, `/`-separated
    fn buffer_path(&self, id: BufferId) -> Option<&str>;

    /// Number of lines in a buffer (0 if unknown)
    fn line_count(&self, id: BufferId) -> usize;

    /// Text of one line, without its terminator
    fn line_text(&self, id: BufferId, line: usize) -> Option<&str>;

    /// Realize a style as a reusable decoration
    fn create_decoration(&mut self, style: &DecorationStyle) -> DecorationHandle;

    /// Release a decoration created by `create_decoration`
    fn dispose_decoration(&mut self, handle: DecorationHandle);

    /// Replace the ranges `handle` decorates in a buffer; empty clears them
    fn apply_decoration(&mut self, id: BufferId, handle: DecorationHandle, ranges: &[DecorationRange]);
}
