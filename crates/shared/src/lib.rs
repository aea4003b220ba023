pub mod events;
pub mod keys;

pub use events::ShortcutEvent;
pub use keys::{Action, Key, KeyChord, KeyChordError, Modifiers};
