use super::scope::{ScopeRef, ShortcutScope};
use super::store::ShortcutStore;
use shared::{Action, KeyChord, ShortcutEvent};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, warn};

/// Whether an action currently has a live trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerState {
    Absent,
    Armed(KeyChord),
}

#[derive(Debug)]
struct Trigger {
    chord: KeyChord,
    scope: ScopeRef,
}

/// Owns the action → chord table for one application instance.
///
/// Construct one at startup with [`ShortcutRegistry::open`], hand out
/// references, and call [`ShortcutRegistry::shutdown`] on exit. All methods
/// run to completion on the calling thread; only `save` and `load` touch disk.
pub struct ShortcutRegistry {
    bindings: BTreeMap<Action, KeyChord>,
    defaults: BTreeMap<Action, KeyChord>,
    triggers: HashMap<Action, Trigger>,
    subscribers: Vec<Sender<ShortcutEvent>>,
    store: ShortcutStore,
}

impl ShortcutRegistry {
    /// Registry holding the factory defaults. Nothing is read from disk.
    pub fn new(store: ShortcutStore) -> Self {
        let defaults: BTreeMap<Action, KeyChord> = Action::ALL
            .into_iter()
            .map(|action| (action, action.default_chord()))
            .collect();
        Self {
            bindings: defaults.clone(),
            defaults,
            triggers: HashMap::new(),
            subscribers: Vec::new(),
            store,
        }
    }

    /// Defaults overlaid with whatever overrides the store holds.
    pub fn open(store: ShortcutStore) -> Self {
        let mut registry = Self::new(store);
        registry.load();
        registry
    }

    /// [`ShortcutRegistry::open`] on the per-user `shortcuts.json`.
    pub fn open_default() -> Self {
        Self::open(ShortcutStore::at_default_location())
    }

    /// Receive every future [`ShortcutEvent`]. Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> Receiver<ShortcutEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: ShortcutEvent) {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
    }

    /// Current chord for `action`, empty if it was cleared.
    pub fn binding(&self, action: Action) -> KeyChord {
        self.bindings
            .get(&action)
            .or_else(|| self.defaults.get(&action))
            .copied()
            .unwrap_or_default()
    }

    /// Factory chord for `action`.
    pub fn default_binding(&self, action: Action) -> KeyChord {
        self.defaults
            .get(&action)
            .copied()
            .unwrap_or_else(|| action.default_chord())
    }

    /// Label shown next to `action` in settings.
    pub fn description(&self, action: Action) -> &'static str {
        action.description()
    }

    /// Snapshot of the current table.
    pub fn all_bindings(&self) -> BTreeMap<Action, KeyChord> {
        self.bindings.clone()
    }

    /// The factory table.
    pub fn defaults(&self) -> &BTreeMap<Action, KeyChord> {
        &self.defaults
    }

    /// Rebind `action`. Duplicate chords across actions are allowed, and the
    /// empty chord unbinds. Setting the current chord again does nothing.
    pub fn set_binding(&mut self, action: Action, chord: KeyChord) {
        if self.binding(action) == chord {
            return;
        }
        debug!(action = %action, chord = %chord, "binding updated");
        self.bindings.insert(action, chord);
        if let Some(trigger) = self.triggers.get_mut(&action) {
            trigger.chord = chord;
        }
        self.emit(ShortcutEvent::BindingsChanged);
    }

    /// Restore every binding to its default, notifying subscribers once.
    pub fn reset_to_defaults(&mut self) {
        self.bindings = self.defaults.clone();
        self.rearm_all();
        info!("shortcuts reset to defaults");
        self.emit(ShortcutEvent::BindingsChanged);
    }

    fn rearm_all(&mut self) {
        for (action, trigger) in self.triggers.iter_mut() {
            trigger.chord = self.bindings.get(action).copied().unwrap_or_default();
        }
    }

    /// Arm a trigger for `action` inside `scope`, replacing any existing one.
    pub fn register_trigger(&mut self, action: Action, scope: &ShortcutScope) {
        self.release_dead_triggers();
        if let Some(previous) = self.triggers.remove(&action) {
            debug!(action = %action, scope = previous.scope.id(), "released previous trigger");
        }
        let chord = self.binding(action);
        debug!(action = %action, chord = %chord, scope = scope.name(), "trigger armed");
        self.triggers.insert(
            action,
            Trigger {
                chord,
                scope: scope.observe(),
            },
        );
    }

    /// Release the trigger for `action`. Returns false if none was armed.
    pub fn unregister_trigger(&mut self, action: Action) -> bool {
        let released = self.triggers.remove(&action).is_some();
        if released {
            debug!(action = %action, "trigger released");
        }
        released
    }

    pub fn trigger_state(&self, action: Action) -> TriggerState {
        match self.triggers.get(&action) {
            Some(trigger) if trigger.scope.is_alive() => TriggerState::Armed(trigger.chord),
            _ => TriggerState::Absent,
        }
    }

    fn release_dead_triggers(&mut self) {
        self.triggers.retain(|action, trigger| {
            let alive = trigger.scope.is_alive();
            if !alive {
                debug!(action = %action, "released trigger of dropped scope");
            }
            alive
        });
    }

    /// Feed a key press that happened inside `scope`.
    ///
    /// Every armed trigger of that scope whose chord equals `chord` fires and
    /// emits [`ShortcutEvent::Triggered`]. Returns the actions that fired.
    pub fn dispatch(&mut self, scope: &ShortcutScope, chord: KeyChord) -> Vec<Action> {
        self.release_dead_triggers();
        if chord.is_empty() {
            return Vec::new();
        }

        let fired: Vec<Action> = Action::ALL
            .into_iter()
            .filter(|action| {
                self.triggers
                    .get(action)
                    .is_some_and(|t| t.chord == chord && t.scope.refers_to(scope))
            })
            .collect();

        for &action in &fired {
            debug!(action = %action, chord = %chord, "shortcut triggered");
            self.emit(ShortcutEvent::Triggered(action));
        }
        fired
    }

    /// Non-empty chords bound to more than one action.
    pub fn find_conflicts(&self) -> Vec<(KeyChord, Vec<Action>)> {
        let mut by_chord: HashMap<KeyChord, Vec<Action>> = HashMap::new();
        for (action, chord) in &self.bindings {
            if !chord.is_empty() {
                by_chord.entry(*chord).or_default().push(*action);
            }
        }
        let mut conflicts: Vec<(KeyChord, Vec<Action>)> = by_chord
            .into_iter()
            .filter(|(_, actions)| actions.len() > 1)
            .collect();
        conflicts.sort_by_key(|(_, actions)| actions[0]);
        conflicts
    }

    /// File backing this registry. Creates its directory if needed.
    pub fn config_path(&self) -> PathBuf {
        if let Err(e) = self.store.ensure_parent() {
            warn!(error = %e, "could not create config directory");
        }
        self.store.path().to_path_buf()
    }

    /// Persist the current table. Returns false if the file cannot be written.
    pub fn save(&self) -> bool {
        match self.store.write(&self.bindings) {
            Ok(()) => {
                debug!(path = %self.store.path().display(), "shortcuts saved");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to save shortcuts");
                false
            }
        }
    }

    /// Overlay the persisted overrides onto the current table.
    ///
    /// Returns false, leaving the table untouched, when the file is missing,
    /// unreadable, or not a JSON object. Actions absent from the file keep
    /// whatever binding they already had.
    pub fn load(&mut self) -> bool {
        let overrides = match self.store.read() {
            Ok(overrides) => overrides,
            Err(e) if e.is_not_found() => {
                debug!(path = %self.store.path().display(), "no saved shortcuts");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "failed to load shortcuts");
                return false;
            }
        };

        let mut changed = 0usize;
        for (action, chord) in overrides {
            if self.bindings.insert(action, chord) != Some(chord) {
                changed += 1;
            }
        }
        if changed > 0 {
            self.rearm_all();
            self.emit(ShortcutEvent::BindingsChanged);
        }
        info!(changed, path = %self.store.path().display(), "shortcuts loaded");
        true
    }

    /// Flush bindings to disk, then release every trigger.
    pub fn shutdown(mut self) -> bool {
        let saved = self.save();
        let released = self.triggers.len();
        self.triggers.clear();
        debug!(released, saved, "shortcut registry shut down");
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Key, Modifiers};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, ShortcutRegistry) {
        let temp_dir = TempDir::new().unwrap();
        let registry = ShortcutRegistry::open(store_in(&temp_dir));
        (temp_dir, registry)
    }

    fn store_in(temp_dir: &TempDir) -> ShortcutStore {
        ShortcutStore::new(temp_dir.path().join("shortcuts.json"))
    }

    fn chord(s: &str) -> KeyChord {
        s.parse().unwrap()
    }

    fn drain(rx: &Receiver<ShortcutEvent>) -> Vec<ShortcutEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_fresh_registry_uses_defaults() {
        let (temp_dir, mut registry) = setup();
        assert!(!temp_dir.path().join("shortcuts.json").exists());
        assert!(!registry.load());

        for action in Action::ALL {
            assert_eq!(registry.binding(action), registry.default_binding(action));
        }
        assert_eq!(&registry.all_bindings(), registry.defaults());
        assert_eq!(registry.description(Action::Settings), "Open settings");
    }

    #[test]
    fn test_set_binding_then_get() {
        let (_temp_dir, mut registry) = setup();

        registry.set_binding(Action::FocusInput, chord("Alt+I"));
        assert_eq!(registry.binding(Action::FocusInput), chord("Alt+I"));

        registry.set_binding(Action::FocusInput, KeyChord::empty());
        assert!(registry.binding(Action::FocusInput).is_empty());
        assert_eq!(registry.default_binding(Action::FocusInput), chord("Ctrl+L"));
    }

    #[test]
    fn test_set_same_binding_is_silent() {
        let (_temp_dir, mut registry) = setup();
        let rx = registry.subscribe();

        let current = registry.binding(Action::NewConversation);
        registry.set_binding(Action::NewConversation, current);
        assert!(drain(&rx).is_empty());

        registry.set_binding(Action::NewConversation, chord("Ctrl+Alt+N"));
        assert_eq!(drain(&rx), vec![ShortcutEvent::BindingsChanged]);
    }

    #[test]
    fn test_duplicate_chords_are_allowed() {
        let (_temp_dir, mut registry) = setup();
        registry.set_binding(Action::ExportConversation, chord("Ctrl+N"));

        assert_eq!(registry.binding(Action::ExportConversation), chord("Ctrl+N"));
        assert_eq!(
            registry.find_conflicts(),
            vec![(
                chord("Ctrl+N"),
                vec![Action::NewConversation, Action::ExportConversation]
            )]
        );
    }

    #[test]
    fn test_save_and_reopen() {
        let (temp_dir, mut registry) = setup();
        registry.set_binding(Action::NewConversation, chord("Ctrl+Shift+N"));
        registry.set_binding(Action::ToggleSidebar, chord("F9"));
        assert!(registry.save());

        let reopened = ShortcutRegistry::open(store_in(&temp_dir));
        assert_eq!(reopened.binding(Action::NewConversation), chord("Ctrl+Shift+N"));
        assert_eq!(reopened.binding(Action::Settings), chord("Ctrl+,"));

        let mut expected = registry.defaults().clone();
        expected.insert(Action::NewConversation, chord("Ctrl+Shift+N"));
        expected.insert(Action::ToggleSidebar, chord("F9"));
        assert_eq!(reopened.all_bindings(), expected);
    }

    #[test]
    fn test_extreme_keys_survive_save_and_reopen() {
        let (temp_dir, mut registry) = setup();
        let f24 = KeyChord::new(Key::F(24), Modifiers::CTRL.with(Modifiers::META)).unwrap();
        let tilde = KeyChord::new(Key::Char('~'), Modifiers::ALT).unwrap();
        registry.set_binding(Action::Settings, f24);
        registry.set_binding(Action::StopGeneration, tilde);
        assert!(registry.save());

        let reopened = ShortcutRegistry::open(store_in(&temp_dir));
        assert_eq!(reopened.all_bindings(), registry.all_bindings());
        assert!(KeyChord::new(Key::F(30), Modifiers::CTRL).is_err());
    }

    #[test]
    fn test_reset_then_load_restores_saved() {
        let (_temp_dir, mut registry) = setup();
        registry.set_binding(Action::SendMessage, chord("Shift+Enter"));
        assert!(registry.save());

        registry.reset_to_defaults();
        assert_eq!(registry.binding(Action::SendMessage), chord("Ctrl+Enter"));

        assert!(registry.load());
        assert_eq!(registry.binding(Action::SendMessage), chord("Shift+Enter"));
    }

    #[test]
    fn test_reset_notifies_once() {
        let (_temp_dir, mut registry) = setup();
        registry.set_binding(Action::NewConversation, chord("F1"));
        registry.set_binding(Action::Settings, chord("F2"));
        registry.set_binding(Action::StopGeneration, KeyChord::empty());

        let rx = registry.subscribe();
        registry.reset_to_defaults();

        assert_eq!(&registry.all_bindings(), registry.defaults());
        assert_eq!(drain(&rx), vec![ShortcutEvent::BindingsChanged]);
    }

    #[test]
    fn test_load_ignores_empty_and_unknown_entries() {
        let (temp_dir, _) = setup();
        fs::write(
            temp_dir.path().join("shortcuts.json"),
            r#"{"Settings": "", "NotAnAction": "Ctrl+Z", "FocusInput": "Alt+F"}"#,
        )
        .unwrap();

        let mut registry = ShortcutRegistry::new(store_in(&temp_dir));
        assert!(registry.load());
        assert_eq!(registry.binding(Action::Settings), chord("Ctrl+,"));
        assert_eq!(registry.binding(Action::FocusInput), chord("Alt+F"));
        for action in Action::ALL.into_iter().filter(|a| *a != Action::FocusInput) {
            assert_eq!(registry.binding(action), registry.default_binding(action));
        }
    }

    #[test]
    fn test_load_failure_leaves_table() {
        let (temp_dir, mut registry) = setup();
        registry.set_binding(Action::ToggleSidebar, chord("Alt+S"));
        fs::write(temp_dir.path().join("shortcuts.json"), "\"Ctrl+N\"").unwrap();

        let before = registry.all_bindings();
        assert!(!registry.load());
        assert_eq!(registry.all_bindings(), before);
    }

    #[test]
    fn test_save_failure_reports_false() {
        let temp_dir = TempDir::new().unwrap();
        // The target is a directory, so it cannot be opened for writing.
        let registry = ShortcutRegistry::new(ShortcutStore::new(temp_dir.path()));
        assert!(!registry.save());
    }

    #[test]
    fn test_load_notifies_and_rearms() {
        let (temp_dir, mut registry) = setup();
        let scope = ShortcutScope::new("main");
        registry.register_trigger(Action::ClearCurrentChat, &scope);
        fs::write(
            temp_dir.path().join("shortcuts.json"),
            r#"{"ClearCurrentChat": "Ctrl+K"}"#,
        )
        .unwrap();

        let rx = registry.subscribe();
        assert!(registry.load());
        assert_eq!(drain(&rx), vec![ShortcutEvent::BindingsChanged]);
        assert_eq!(
            registry.trigger_state(Action::ClearCurrentChat),
            TriggerState::Armed(chord("Ctrl+K"))
        );
    }

    #[test]
    fn test_trigger_follows_binding_changes() {
        let (_temp_dir, mut registry) = setup();
        let scope = ShortcutScope::new("main");

        assert_eq!(registry.trigger_state(Action::Settings), TriggerState::Absent);
        registry.register_trigger(Action::Settings, &scope);
        assert_eq!(
            registry.trigger_state(Action::Settings),
            TriggerState::Armed(chord("Ctrl+,"))
        );

        registry.set_binding(Action::Settings, chord("Ctrl+P"));
        assert_eq!(
            registry.trigger_state(Action::Settings),
            TriggerState::Armed(chord("Ctrl+P"))
        );

        registry.reset_to_defaults();
        assert_eq!(
            registry.trigger_state(Action::Settings),
            TriggerState::Armed(chord("Ctrl+,"))
        );
    }

    #[test]
    fn test_dispatch_fires_in_scope_only() {
        let (_temp_dir, mut registry) = setup();
        let main = ShortcutScope::new("main");
        let dialog = ShortcutScope::new("dialog");
        registry.register_trigger(Action::NewConversation, &main);
        let rx = registry.subscribe();

        let ctrl_n = KeyChord::new(Key::Char('n'), Modifiers::CTRL).unwrap();
        assert!(registry.dispatch(&dialog, ctrl_n).is_empty());
        assert_eq!(registry.dispatch(&main, ctrl_n), vec![Action::NewConversation]);
        assert!(registry.dispatch(&main, chord("Ctrl+M")).is_empty());
        assert!(registry.dispatch(&main, KeyChord::empty()).is_empty());

        assert_eq!(
            drain(&rx),
            vec![ShortcutEvent::Triggered(Action::NewConversation)]
        );
    }

    #[test]
    fn test_dispatch_fires_every_matching_trigger_in_order() {
        let (_temp_dir, mut registry) = setup();
        let main = ShortcutScope::new("main");
        let dialog = ShortcutScope::new("dialog");
        let ctrl_n = chord("Ctrl+N");
        registry.set_binding(Action::ExportConversation, ctrl_n);
        registry.set_binding(Action::FocusInput, ctrl_n);

        // Armed out of order on purpose; firing follows Action::ALL.
        registry.register_trigger(Action::ExportConversation, &main);
        registry.register_trigger(Action::NewConversation, &main);
        registry.register_trigger(Action::FocusInput, &dialog);
        let rx = registry.subscribe();

        assert_eq!(
            registry.dispatch(&main, ctrl_n),
            vec![Action::NewConversation, Action::ExportConversation]
        );
        assert_eq!(
            drain(&rx),
            vec![
                ShortcutEvent::Triggered(Action::NewConversation),
                ShortcutEvent::Triggered(Action::ExportConversation),
            ]
        );

        assert_eq!(registry.dispatch(&dialog, ctrl_n), vec![Action::FocusInput]);
        assert_eq!(drain(&rx), vec![ShortcutEvent::Triggered(Action::FocusInput)]);
    }

    #[test]
    fn test_register_replaces_previous_trigger() {
        let (_temp_dir, mut registry) = setup();
        let first = ShortcutScope::new("first");
        let second = ShortcutScope::new("second");
        let ctrl_f = chord("Ctrl+F");

        registry.register_trigger(Action::SearchConversations, &first);
        registry.register_trigger(Action::SearchConversations, &second);

        assert!(registry.dispatch(&first, ctrl_f).is_empty());
        assert_eq!(
            registry.dispatch(&second, ctrl_f),
            vec![Action::SearchConversations]
        );
    }

    #[test]
    fn test_dropped_scope_releases_trigger() {
        let (_temp_dir, mut registry) = setup();
        let scope = ShortcutScope::new("dialog");
        registry.register_trigger(Action::ExportConversation, &scope);
        drop(scope);

        assert_eq!(
            registry.trigger_state(Action::ExportConversation),
            TriggerState::Absent
        );
        let replacement = ShortcutScope::new("dialog");
        assert!(registry
            .dispatch(&replacement, chord("Ctrl+Shift+E"))
            .is_empty());
        assert!(!registry.unregister_trigger(Action::ExportConversation));
    }

    #[test]
    fn test_unregister_trigger() {
        let (_temp_dir, mut registry) = setup();
        let scope = ShortcutScope::new("main");
        registry.register_trigger(Action::StopGeneration, &scope);

        assert!(registry.unregister_trigger(Action::StopGeneration));
        assert_eq!(
            registry.trigger_state(Action::StopGeneration),
            TriggerState::Absent
        );
        assert!(registry.dispatch(&scope, chord("Escape")).is_empty());
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let (_temp_dir, mut registry) = setup();
        let kept = registry.subscribe();
        drop(registry.subscribe());

        registry.set_binding(Action::DeleteConversation, chord("Ctrl+Delete"));
        assert_eq!(registry.subscribers.len(), 1);
        assert_eq!(drain(&kept), vec![ShortcutEvent::BindingsChanged]);
    }

    #[test]
    fn test_shutdown_persists() {
        let (temp_dir, mut registry) = setup();
        let scope = ShortcutScope::new("main");
        registry.register_trigger(Action::FocusInput, &scope);
        registry.set_binding(Action::FocusInput, chord("Ctrl+I"));

        assert!(registry.shutdown());
        let reopened = ShortcutRegistry::open(store_in(&temp_dir));
        assert_eq!(reopened.binding(Action::FocusInput), chord("Ctrl+I"));
        assert_eq!(reopened.trigger_state(Action::FocusInput), TriggerState::Absent);
    }

    #[test]
    fn test_config_path_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("AIAssit").join("shortcuts.json");
        let registry = ShortcutRegistry::new(ShortcutStore::new(&nested));

        assert_eq!(registry.config_path(), nested);
        assert!(temp_dir.path().join("AIAssit").is_dir());
    }
}
