//! Highlighting engine
//!
//! The engine owns all highlighting state: the static configurations, the
//! rule store and the change tracker. Host notifications arrive as `Event`s
//! and every handler takes `&mut self`, so each event and each tick is one
//! atomic step.
//!
//! Until a non-empty configuration list arrives the engine is `Waiting`:
//! it keeps following visibility but issues no decoration calls.

use super::reconciler::{reconcile, TickReport};
use super::rules::Configuration;
use super::store::RuleStore;
use super::threads;
use super::tracker::ChangeTracker;
use crate::host::{BufferId, Host};

/// Notifications from the host, plus the periodic tick
#[derive(Debug, Clone)]
pub enum Event {
    /// The set of visible buffers is now exactly this list
    VisibilityChanged(Vec<BufferId>),
    /// A buffer's text changed
    ContentChanged(BufferId),
    /// The configuration list was replaced
    ConfigChanged(Vec<Configuration>),
    /// Rediscover thread ids and redecorate everything with the current
    /// configurations
    Refresh,
    /// Text changed somewhere: rebuild only if the discovered thread ids
    /// are no longer the ones compiled
    Rediscover,
    /// Timer tick: decorate dirty buffers
    Tick,
}

/// Whether the engine has configurations to work with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Waiting,
    Active,
}

/// Main highlighting engine
#[derive(Debug)]
pub struct Engine {
    /// Configurations as loaded, without discovered rules
    configurations: Vec<Configuration>,
    store: RuleStore,
    tracker: ChangeTracker,
    phase: Phase,
}

impl Engine {
    /// Create an engine waiting for configurations
    pub fn new() -> Self {
        Self {
            configurations: Vec::new(),
            store: RuleStore::new(),
            tracker: ChangeTracker::new(),
            phase: Phase::Waiting,
        }
    }

    /// Dispatch one event; only `Tick` produces a non-empty report
    pub fn handle<H: Host + ?Sized>(&mut self, host: &mut H, event: Event) -> TickReport {
        match event {
            Event::VisibilityChanged(visible) => self.on_visibility_changed(&visible),
            Event::ContentChanged(id) => self.on_content_changed(id),
            Event::ConfigChanged(configurations) => self.on_config_changed(host, configurations),
            Event::Refresh => self.refresh(host),
            Event::Rediscover => {
                self.rediscover(host);
            }
            Event::Tick => return self.tick(host),
        }
        TickReport::default()
    }

    pub fn on_visibility_changed(&mut self, visible: &[BufferId]) {
        self.tracker.visibility_changed(visible);
    }

    pub fn on_content_changed(&mut self, id: BufferId) {
        if self.tracker.content_changed(id) {
            tracing::trace!("Buffer {:?} marked dirty", id);
        }
    }

    /// Replace the configurations wholesale
    ///
    /// Every old decoration is cleared and disposed. With an empty list the
    /// engine goes back to waiting; otherwise rules are recompiled and every
    /// visible buffer is scheduled for a scan.
    pub fn on_config_changed<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        configurations: Vec<Configuration>,
    ) {
        self.configurations = configurations;

        if self.configurations.is_empty() {
            self.store.clear(host);
            self.tracker.mark_all_dirty(&host.visible_buffers());
            self.phase = Phase::Waiting;
            tracing::info!("No configurations found. Waiting for configurations to be loaded...");
            return;
        }

        self.phase = Phase::Active;
        self.refresh(host);
    }

    /// Run a full decoration cycle: discover thread ids, rebuild every
    /// decoration and mark all visible buffers dirty
    pub fn refresh<H: Host + ?Sized>(&mut self, host: &mut H) {
        if self.phase == Phase::Waiting {
            return;
        }

        let visible = host.visible_buffers();
        let discovered = threads::discover(&*host, &self.configurations, &visible);
        self.store.rebuild(host, &self.configurations, discovered);
        self.tracker.mark_all_dirty(&visible);
    }

    /// Rerun thread discovery and rebuild if its result changed
    ///
    /// Returns true if the rules were rebuilt (every visible buffer is then
    /// dirty again).
    pub fn rediscover<H: Host + ?Sized>(&mut self, host: &mut H) -> bool {
        if self.phase == Phase::Waiting {
            return false;
        }

        let visible = host.visible_buffers();
        let discovered = threads::discover(&*host, &self.configurations, &visible);
        let unchanged = self.store.configurations().first().is_some_and(|compiled| {
            compiled
                .discovered_rules()
                .iter()
                .map(|rule| &rule.rule)
                .eq(discovered.iter())
        });
        if unchanged {
            return false;
        }

        tracing::info!("Thread ids changed, rebuilding decorations");
        self.store.rebuild(host, &self.configurations, discovered);
        self.tracker.mark_all_dirty(&visible);
        true
    }

    /// Decorate dirty buffers; a no-op while waiting
    pub fn tick<H: Host + ?Sized>(&mut self, host: &mut H) -> TickReport {
        if self.phase == Phase::Waiting {
            return TickReport::default();
        }
        reconcile(host, &mut self.store, &mut self.tracker)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Configurations as loaded (discovered rules are only in the store)
    pub fn configurations(&self) -> &[Configuration] {
        &self.configurations
    }

    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::rules::Rule;
    use crate::highlight::style::{Color, DecorationRange};
    use crate::highlight::tracker::BufferState;
    use crate::workspace::{DecorationCall, Workspace};

    const LINE_REG: &str = r"^()(\[)()(\w+)\]";

    fn log_configuration() -> Configuration {
        Configuration::new(["*.log"])
            .with_line_reg(LINE_REG)
            .with_rule(Rule::new(["ERROR"]).with_color(Color::BrightRed))
    }

    fn started(workspace: &mut Workspace, configurations: Vec<Configuration>) -> Engine {
        let mut engine = Engine::new();
        engine.on_visibility_changed(&workspace.visible_buffers());
        engine.handle(workspace, Event::ConfigChanged(configurations));
        engine
    }

    #[test]
    fn test_thread_rules_are_synthesized() {
        let mut workspace = Workspace::new();
        workspace.open_text("a.log", "[T1] start\n[T2] start");
        let engine = started(&mut workspace, vec![log_configuration()]);

        let first = &engine.store().configurations()[0];
        let discovered = first.discovered_rules();
        assert_eq!(discovered.len(), 2);
        assert_eq!(discovered[0].rule.patterns, vec![r"T1\|"]);
        assert_eq!(discovered[1].rule.patterns, vec![r"T2\|"]);
        assert_ne!(discovered[0].rule.color, discovered[1].rule.color);
        assert_eq!(engine.configurations()[0].rules.len(), 1);
    }

    #[test]
    fn test_refresh_does_not_accumulate_rules() {
        let mut workspace = Workspace::new();
        workspace.open_text("a.log", "[T1] start\n[T2] start");
        let mut engine = started(&mut workspace, vec![log_configuration()]);

        let before = engine.store().configurations()[0].rules.len();
        engine.handle(&mut workspace, Event::Refresh);
        engine.handle(&mut workspace, Event::Refresh);
        assert_eq!(engine.store().configurations()[0].rules.len(), before);
        assert_eq!(workspace.live_decorations(), before);
    }

    #[test]
    fn test_error_is_decorated_case_insensitively() {
        let mut workspace = Workspace::new();
        let id = workspace.open_text("a.log", "an error occurred");
        let mut engine = started(&mut workspace, vec![log_configuration()]);

        let report = engine.handle(&mut workspace, Event::Tick);
        assert_eq!(report.decorated, vec![id]);

        let handle = engine.store().decoration_for(0, 0).unwrap();
        assert_eq!(workspace.ranges(id, handle), &[DecorationRange::new(0, 3, 7)]);
        assert_eq!(engine.tracker().state(id), Some(BufferState::Clean));
    }

    #[test]
    fn test_hidden_dirty_buffer_is_never_decorated() {
        let mut workspace = Workspace::new();
        let shown = workspace.open_text("a.log", "ERROR");
        let hidden = workspace.open_text("b.log", "ERROR");
        let mut engine = started(&mut workspace, vec![log_configuration()]);
        assert_eq!(engine.tracker().dirty(), vec![shown, hidden]);

        workspace.hide(hidden);
        let visible = workspace.visible_buffers();
        engine.handle(&mut workspace, Event::VisibilityChanged(visible));
        assert!(!engine.tracker().dirty().contains(&hidden));
        assert!(!engine.tracker().clean().contains(&hidden));

        workspace.take_calls();
        engine.handle(&mut workspace, Event::Tick);
        assert!(workspace
            .calls()
            .iter()
            .all(|call| !matches!(call, DecorationCall::Apply { buffer, .. } if *buffer == hidden)));
        assert_eq!(engine.tracker().state(hidden), None);
        assert_eq!(engine.tracker().state(shown), Some(BufferState::Clean));
    }

    #[test]
    fn test_waits_for_configurations() {
        let mut workspace = Workspace::new();
        let id = workspace.open_text("a.log", "ERROR");
        let mut engine = started(&mut workspace, Vec::new());

        assert_eq!(engine.phase(), Phase::Waiting);
        for _ in 0..3 {
            assert!(engine.handle(&mut workspace, Event::Tick).is_idle());
        }
        engine.handle(&mut workspace, Event::Refresh);
        assert!(workspace.calls().is_empty());

        engine.handle(&mut workspace, Event::ConfigChanged(vec![log_configuration()]));
        assert_eq!(engine.phase(), Phase::Active);
        let report = engine.handle(&mut workspace, Event::Tick);
        assert_eq!(report.decorated, vec![id]);
    }

    #[test]
    fn test_emptied_configuration_clears_highlights() {
        let mut workspace = Workspace::new();
        let id = workspace.open_text("a.log", "ERROR");
        let mut engine = started(&mut workspace, vec![log_configuration()]);
        engine.handle(&mut workspace, Event::Tick);
        let handle = engine.store().decoration_for(0, 0).unwrap();
        assert!(!workspace.ranges(id, handle).is_empty());

        engine.handle(&mut workspace, Event::ConfigChanged(Vec::new()));
        assert_eq!(engine.phase(), Phase::Waiting);
        assert_eq!(workspace.live_decorations(), 0);
        assert!(workspace.decorations_on(id).is_empty());
    }

    #[test]
    fn test_content_change_triggers_rescan() {
        let mut workspace = Workspace::new();
        let id = workspace.open_text("a.log", "fine");
        let mut engine = started(&mut workspace, vec![log_configuration()]);
        engine.handle(&mut workspace, Event::Tick);
        assert!(engine.handle(&mut workspace, Event::Tick).is_idle());

        workspace.set_text(id, "fine\nERROR now");
        engine.handle(&mut workspace, Event::ContentChanged(id));
        assert_eq!(engine.tracker().state(id), Some(BufferState::Dirty));

        let report = engine.handle(&mut workspace, Event::Tick);
        assert_eq!(report.decorated, vec![id]);
        let handle = engine.store().decoration_for(0, 0).unwrap();
        assert_eq!(workspace.ranges(id, handle), &[DecorationRange::new(1, 0, 4)]);
    }

    #[test]
    fn test_unmatched_buffer_is_not_rescanned() {
        let mut workspace = Workspace::new();
        let id = workspace.open_text("notes.txt", "ERROR");
        let mut engine = started(&mut workspace, vec![log_configuration()]);

        let report = engine.handle(&mut workspace, Event::Tick);
        assert_eq!(report.unmatched, vec![id]);
        assert_eq!(engine.tracker().state(id), Some(BufferState::NoMatch));

        engine.handle(&mut workspace, Event::ContentChanged(id));
        assert!(engine.handle(&mut workspace, Event::Tick).is_idle());

        // New configurations give it another chance.
        let configurations = vec![Configuration::new(["*.txt"]).with_rule(Rule::new(["ERROR"]))];
        engine.handle(&mut workspace, Event::ConfigChanged(configurations));
        let report = engine.handle(&mut workspace, Event::Tick);
        assert_eq!(report.decorated, vec![id]);
    }

    #[test]
    fn test_newly_visible_buffer_is_decorated() {
        let mut workspace = Workspace::new();
        let first = workspace.open_text("a.log", "ERROR");
        let mut engine = started(&mut workspace, vec![log_configuration()]);
        engine.handle(&mut workspace, Event::Tick);

        let second = workspace.open_text("b.log", "ERROR too");
        let visible = workspace.visible_buffers();
        engine.handle(&mut workspace, Event::VisibilityChanged(visible));
        assert_eq!(engine.tracker().dirty(), vec![second]);
        assert_eq!(engine.tracker().state(first), Some(BufferState::Clean));

        let report = engine.handle(&mut workspace, Event::Tick);
        assert_eq!(report.decorated, vec![second]);
    }

    #[test]
    fn test_new_thread_id_gets_a_rule() {
        let mut workspace = Workspace::new();
        let id = workspace.open_text("a.log", "[T1] start");
        let mut engine = started(&mut workspace, vec![log_configuration()]);
        engine.handle(&mut workspace, Event::Tick);
        assert_eq!(engine.store().configurations()[0].discovered_rules().len(), 1);

        workspace.set_text(id, "[T1] start\n[T2] T2| start");
        engine.handle(&mut workspace, Event::ContentChanged(id));
        engine.handle(&mut workspace, Event::Rediscover);

        let discovered = engine.store().configurations()[0].discovered_rules();
        assert_eq!(discovered.len(), 2);
        assert_eq!(discovered[1].rule.patterns, vec![r"T2\|"]);

        let report = engine.handle(&mut workspace, Event::Tick);
        assert_eq!(report.decorated, vec![id]);
        let t2 = engine.store().decoration_for(0, 2).unwrap();
        assert_eq!(workspace.ranges(id, t2), &[DecorationRange::new(1, 5, 7)]);
    }

    #[test]
    fn test_rediscover_keeps_unchanged_rules() {
        let mut workspace = Workspace::new();
        let id = workspace.open_text("a.log", "[T1] start");
        let mut engine = started(&mut workspace, vec![log_configuration()]);
        engine.handle(&mut workspace, Event::Tick);
        let before = engine.store().decoration_for(0, 1);

        workspace.set_text(id, "[T1] start\n[T1] ERROR");
        engine.handle(&mut workspace, Event::ContentChanged(id));
        workspace.take_calls();
        assert!(!engine.rediscover(&mut workspace));
        assert!(workspace.calls().is_empty());
        assert_eq!(engine.store().decoration_for(0, 1), before);
        assert_eq!(engine.tracker().dirty(), vec![id]);
    }

    #[test]
    fn test_rediscover_while_waiting_does_nothing() {
        let mut workspace = Workspace::new();
        workspace.open_text("a.log", "[T1] start");
        let mut engine = started(&mut workspace, Vec::new());
        assert!(!engine.rediscover(&mut workspace));
        assert!(workspace.calls().is_empty());
    }

    #[test]
    fn test_config_reload_replaces_decorations() {
        let mut workspace = Workspace::new();
        let id = workspace.open_text("a.log", "ERROR");
        let mut engine = started(&mut workspace, vec![log_configuration()]);
        engine.handle(&mut workspace, Event::Tick);
        let old = engine.store().decoration_for(0, 0).unwrap();

        let reloaded = vec![Configuration::new(["*.log"]).with_rule(Rule::new(["OK"]))];
        engine.handle(&mut workspace, Event::ConfigChanged(reloaded));
        assert!(workspace.ranges(id, old).is_empty());
        assert_eq!(workspace.style(old), None);
        assert_eq!(engine.tracker().dirty(), vec![id]);
        assert_eq!(workspace.live_decorations(), 1);
    }
}
