//! Shortcut bindings: the action → chord table, live triggers, and the
//! `shortcuts.json` file that persists user overrides.

mod registry;
mod scope;
mod store;

pub use registry::{ShortcutRegistry, TriggerState};
pub use scope::ShortcutScope;
pub use store::{
    config_dir_from, default_config_dir, default_config_path, ShortcutError, ShortcutStore,
    CONFIG_DIR_ENV,
};
