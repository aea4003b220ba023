use shared::{Action, KeyChord};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Overrides the directory holding `shortcuts.json`.
pub const CONFIG_DIR_ENV: &str = "AIASSIT_CONFIG_DIR";

const APP_DIR_NAME: &str = "AIAssit";
const FILE_NAME: &str = "shortcuts.json";

#[derive(Debug, thiserror::Error)]
pub enum ShortcutError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("{} does not contain a JSON object", .0.display())]
    NotAnObject(PathBuf),
}

impl ShortcutError {
    /// True when the file simply does not exist yet (first run).
    pub fn is_not_found(&self) -> bool {
        matches!(self, ShortcutError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// Per-user directory for AIAssit configuration, honouring [`CONFIG_DIR_ENV`].
pub fn default_config_dir() -> PathBuf {
    config_dir_from(std::env::var_os(CONFIG_DIR_ENV))
}

/// A non-empty override wins; otherwise the platform config dir.
pub fn config_dir_from(override_dir: Option<OsString>) -> PathBuf {
    if let Some(dir) = override_dir.filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    directories::BaseDirs::new()
        .map(|dirs| dirs.config_dir().join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR_NAME))
}

/// Location of `shortcuts.json`. Creates the config directory if needed.
pub fn default_config_path() -> PathBuf {
    let dir = default_config_dir();
    if let Err(e) = fs::create_dir_all(&dir) {
        warn!(dir = %dir.display(), error = %e, "could not create config directory");
    }
    dir.join(FILE_NAME)
}

/// Reads and writes the shortcut file. Holds no bindings itself.
#[derive(Debug, Clone)]
pub struct ShortcutStore {
    path: PathBuf,
}

impl ShortcutStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_location() -> Self {
        Self::new(default_config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn ensure_parent(&self) -> Result<(), ShortcutError> {
        match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => fs::create_dir_all(parent).map_err(|source| ShortcutError::Io {
                path: parent.to_path_buf(),
                source,
            }),
            None => Ok(()),
        }
    }

    /// Parse the overrides held in the file.
    ///
    /// Fails only when the file cannot be read, is not JSON, or its top level
    /// is not an object. Individual entries that name no known action, are not
    /// strings, or do not parse to a non-empty chord are skipped.
    pub fn read(&self) -> Result<BTreeMap<Action, KeyChord>, ShortcutError> {
        let contents = fs::read_to_string(&self.path).map_err(|source| ShortcutError::Io {
            path: self.path.clone(),
            source,
        })?;
        let value: serde_json::Value =
            serde_json::from_str(&contents).map_err(|source| ShortcutError::Json {
                path: self.path.clone(),
                source,
            })?;
        let serde_json::Value::Object(entries) = value else {
            return Err(ShortcutError::NotAnObject(self.path.clone()));
        };

        let mut overrides = BTreeMap::new();
        for (name, raw) in entries {
            let Some(action) = Action::from_name(&name) else {
                debug!(name = %name, "skipping unknown shortcut action");
                continue;
            };
            let Some(text) = raw.as_str() else {
                warn!(action = %action, "skipping non-string shortcut value");
                continue;
            };
            match text.parse::<KeyChord>() {
                Ok(chord) if !chord.is_empty() => {
                    overrides.insert(action, chord);
                }
                Ok(_) => debug!(action = %action, "skipping empty shortcut"),
                Err(e) => warn!(action = %action, value = text, error = %e, "skipping unparseable shortcut"),
            }
        }
        Ok(overrides)
    }

    /// Write one entry for every known action.
    pub fn write(&self, bindings: &BTreeMap<Action, KeyChord>) -> Result<(), ShortcutError> {
        self.ensure_parent()?;

        let entries: serde_json::Map<String, serde_json::Value> = Action::ALL
            .into_iter()
            .map(|action| {
                let chord = bindings
                    .get(&action)
                    .map(KeyChord::to_canonical)
                    .unwrap_or_default();
                (action.as_str().to_string(), serde_json::Value::String(chord))
            })
            .collect();

        let json = serde_json::to_string_pretty(&serde_json::Value::Object(entries)).map_err(
            |source| ShortcutError::Json {
                path: self.path.clone(),
                source,
            },
        )?;
        fs::write(&self.path, json).map_err(|source| ShortcutError::Io {
            path: self.path.clone(),
            source,
        })
    }
}
