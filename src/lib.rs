//! traces-reader - rule-based log highlighting
//!
//! Highlights log lines from path-scoped regular expression rules, colors
//! the thread ids it discovers, and only rescans documents that changed.

pub mod buffer;
pub mod cli;
pub mod config;
pub mod error;
pub mod glob;
pub mod highlight;
pub mod host;
pub mod logging;
pub mod render;
pub mod watch;
pub mod workspace;
