//! Notifications published by the shortcut registry.

use crate::keys::Action;

/// Event delivered to every registry subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutEvent {
    /// An armed trigger fired inside its scope.
    Triggered(Action),
    /// One or more bindings changed; re-read whatever chords you display.
    BindingsChanged,
}

impl ShortcutEvent {
    /// The action that fired, if this is a trigger event.
    pub fn triggered_action(&self) -> Option<Action> {
        match self {
            ShortcutEvent::Triggered(action) => Some(*action),
            ShortcutEvent::BindingsChanged => None,
        }
    }
}
