//! Rule store
//!
//! Holds the compiled form of every configuration: for each rule its
//! matchers, a stable `RuleId` and the decoration handle realizing its style.
//! Handles live next to their rule, so lookups cannot drift out of step with
//! the rule list.

use std::collections::{BTreeSet, HashMap};

use super::matcher::{compile_rule, LineMatcher};
use super::rules::{Configuration, Rule};
use crate::host::{BufferId, DecorationHandle, Host};

/// Stable identifier of a compiled rule
///
/// Ids are never reused, not even across rebuilds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(pub u64);

/// A rule ready for matching
#[derive(Debug)]
pub struct CompiledRule {
    pub id: RuleId,
    pub rule: Rule,
    /// One per pattern that compiled
    pub matchers: Vec<LineMatcher>,
    pub decoration: DecorationHandle,
}

/// A configuration with its compiled rules (static rules first)
#[derive(Debug)]
pub struct CompiledConfiguration {
    pub paths: Vec<String>,
    pub rules: Vec<CompiledRule>,
    /// Number of leading rules that came from the configuration itself
    pub static_rules: usize,
}

impl CompiledConfiguration {
    /// Whether this configuration covers a buffer path
    pub fn applies_to(&self, path: &str) -> bool {
        self.paths
            .iter()
            .any(|pattern| crate::glob::scope_matches(pattern, path))
    }

    /// Rules appended by thread discovery
    pub fn discovered_rules(&self) -> &[CompiledRule] {
        &self.rules[self.static_rules..]
    }
}

/// Compiled rules and decorations for the current configuration snapshot
#[derive(Debug, Default)]
pub struct RuleStore {
    configurations: Vec<CompiledConfiguration>,
    /// RuleId -> (configuration index, rule index)
    index: HashMap<RuleId, (usize, usize)>,
    next_id: u64,
    /// Buffers decorated with the current handles
    decorated: BTreeSet<BufferId>,
}

impl RuleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every compiled rule and decoration
    ///
    /// Previous handles are cleared from every buffer they decorated and
    /// disposed first. `discovered` rules are appended after the static rules
    /// of the first configuration.
    pub fn rebuild<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        configurations: &[Configuration],
        discovered: Vec<Rule>,
    ) {
        self.clear(host);

        let mut discovered = Some(discovered);
        for (config_idx, configuration) in configurations.iter().enumerate() {
            let mut rules: Vec<Rule> = configuration.rules.clone();
            if config_idx == 0 {
                rules.extend(discovered.take().unwrap_or_default());
            }

            let compiled = rules
                .into_iter()
                .enumerate()
                .map(|(rule_idx, rule)| {
                    let id = RuleId(self.next_id);
                    self.next_id += 1;
                    self.index.insert(id, (config_idx, rule_idx));
                    CompiledRule {
                        id,
                        matchers: compile_rule(&rule),
                        decoration: host.create_decoration(&rule.style()),
                        rule,
                    }
                })
                .collect();

            self.configurations.push(CompiledConfiguration {
                paths: configuration.paths.clone(),
                rules: compiled,
                static_rules: configuration.rules.len(),
            });
        }

        tracing::info!(
            "Rebuilt {} configuration(s) with {} decoration(s)",
            self.configurations.len(),
            self.decoration_count()
        );
    }

    /// Remove all decorations from every buffer and dispose them
    pub fn clear<H: Host + ?Sized>(&mut self, host: &mut H) {
        let decorated = std::mem::take(&mut self.decorated);
        for configuration in self.configurations.drain(..) {
            for rule in configuration.rules {
                for &buffer in &decorated {
                    host.apply_decoration(buffer, rule.decoration, &[]);
                }
                host.dispose_decoration(rule.decoration);
            }
        }
        self.index.clear();
    }

    /// Decoration of a rule by position
    pub fn decoration_for(&self, config_idx: usize, rule_idx: usize) -> Option<DecorationHandle> {
        self.configurations
            .get(config_idx)?
            .rules
            .get(rule_idx)
            .map(|rule| rule.decoration)
    }

    /// Decoration of a rule by id
    pub fn decoration_by_id(&self, id: RuleId) -> Option<DecorationHandle> {
        self.rule(id).map(|rule| rule.decoration)
    }

    /// Look up a compiled rule by id
    pub fn rule(&self, id: RuleId) -> Option<&CompiledRule> {
        let &(config_idx, rule_idx) = self.index.get(&id)?;
        self.configurations.get(config_idx)?.rules.get(rule_idx)
    }

    /// Compiled configurations in order
    pub fn configurations(&self) -> &[CompiledConfiguration] {
        &self.configurations
    }

    /// Configurations covering a buffer path
    pub fn applicable<'a>(
        &'a self,
        path: &'a str,
    ) -> impl Iterator<Item = &'a CompiledConfiguration> + 'a {
        self.configurations
            .iter()
            .filter(move |configuration| configuration.applies_to(path))
    }

    /// Total number of live decorations
    pub fn decoration_count(&self) -> usize {
        self.configurations.iter().map(|c| c.rules.len()).sum()
    }

    /// Remember that the current handles were applied to a buffer
    pub fn note_decorated(&mut self, id: BufferId) {
        self.decorated.insert(id);
    }

    /// Buffers decorated since the last rebuild
    pub fn decorated(&self) -> impl Iterator<Item = BufferId> + '_ {
        self.decorated.iter().copied()
    }
}
