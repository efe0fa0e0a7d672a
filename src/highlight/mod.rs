//! Rule-based highlighting
//!
//! This module provides the highlighting engine:
//! - Rules and path-scoped configurations (JSON)
//! - Matchers compiled from rule patterns
//! - Thread-id discovery for log lines
//! - The rule store holding one decoration per rule
//! - Change tracking and per-tick reconciliation

mod style;
mod rules;
mod matcher;
mod threads;
mod store;
mod tracker;
mod reconciler;
mod engine;

pub use style::{Color, DecorationRange, DecorationStyle, FontStyle, FontWeight, TextDecoration};
pub use rules::{load_configurations, parse_configurations, Configuration, Rule, CONFIGURATIONS_KEY};
pub use matcher::{compile_rule, match_lines, LineMatcher};
pub use threads::{collect_thread_ids, discover, thread_rules, THREAD_ID_GROUP, THREAD_PALETTE};
pub use store::{CompiledConfiguration, CompiledRule, RuleId, RuleStore};
pub use tracker::{BufferState, ChangeTracker};
pub use reconciler::{reconcile, scan_buffer, TickReport};
pub use engine::{Engine, Event, Phase};
