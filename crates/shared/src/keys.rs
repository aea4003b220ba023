//! Named application actions and the key chords bound to them.
//!
//! A [`KeyChord`] is at most one non-modifier [`Key`] plus a set of
//! [`Modifiers`]. The canonical string form (`"Ctrl+Shift+D"`) is what gets
//! persisted; [`KeyChord::display_label`] is what settings screens show.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every command that can be bound to a shortcut.
///
/// The set is closed. The variant name doubles as the persisted key in
/// `shortcuts.json`, so renaming a variant breaks existing config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    NewConversation,
    SearchConversations,
    ToggleSidebar,
    FocusInput,
    SendMessage,
    StopGeneration,
    Settings,
    ClearCurrentChat,
    ExportConversation,
    DeleteConversation,
}

impl Action {
    pub const ALL: [Action; 10] = [
        Action::NewConversation,
        Action::SearchConversations,
        Action::ToggleSidebar,
        Action::FocusInput,
        Action::SendMessage,
        Action::StopGeneration,
        Action::Settings,
        Action::ClearCurrentChat,
        Action::ExportConversation,
        Action::DeleteConversation,
    ];

    /// Persisted name, identical to the variant name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::NewConversation => "NewConversation",
            Action::SearchConversations => "SearchConversations",
            Action::ToggleSidebar => "ToggleSidebar",
            Action::FocusInput => "FocusInput",
            Action::SendMessage => "SendMessage",
            Action::StopGeneration => "StopGeneration",
            Action::Settings => "Settings",
            Action::ClearCurrentChat => "ClearCurrentChat",
            Action::ExportConversation => "ExportConversation",
            Action::DeleteConversation => "DeleteConversation",
        }
    }

    /// Exact match on the persisted name. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }

    /// Case-insensitive lookup, for names typed by a user.
    pub fn from_name_ignore_case(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(name))
    }

    /// Human-readable label shown next to the binding in settings.
    pub fn description(&self) -> &'static str {
        match self {
            Action::NewConversation => "New conversation",
            Action::SearchConversations => "Search conversations",
            Action::ToggleSidebar => "Toggle sidebar",
            Action::FocusInput => "Focus message input",
            Action::SendMessage => "Send message",
            Action::StopGeneration => "Stop generation",
            Action::Settings => "Open settings",
            Action::ClearCurrentChat => "Clear current chat",
            Action::ExportConversation => "Export conversation",
            Action::DeleteConversation => "Delete conversation",
        }
    }

    /// The factory binding for this action.
    pub fn default_chord(&self) -> KeyChord {
        let ctrl_shift = Modifiers::CTRL.with(Modifiers::SHIFT);
        match self {
            Action::NewConversation => KeyChord::bound(Key::Char('N'), Modifiers::CTRL),
            Action::SearchConversations => KeyChord::bound(Key::Char('F'), Modifiers::CTRL),
            Action::ToggleSidebar => KeyChord::bound(Key::Char('B'), Modifiers::CTRL),
            Action::FocusInput => KeyChord::bound(Key::Char('L'), Modifiers::CTRL),
            Action::SendMessage => KeyChord::bound(Key::Enter, Modifiers::CTRL),
            Action::StopGeneration => KeyChord::bound(Key::Escape, Modifiers::NONE),
            Action::Settings => KeyChord::bound(Key::Char(','), Modifiers::CTRL),
            Action::ClearCurrentChat => KeyChord::bound(Key::Char('L'), ctrl_shift),
            Action::ExportConversation => KeyChord::bound(Key::Char('E'), ctrl_shift),
            Action::DeleteConversation => KeyChord::bound(Key::Char('D'), ctrl_shift),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Modifier keys held while the chord key is pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// Control.
    pub ctrl: bool,
    /// Alt, shown as Option on macOS.
    pub alt: bool,
    /// Shift.
    pub shift: bool,
    /// Command on macOS, Windows/Super elsewhere.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Self::NONE
    };
    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Self::NONE
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Self::NONE
    };
    pub const META: Modifiers = Modifiers {
        meta: true,
        ..Self::NONE
    };

    /// Union of two modifier sets.
    pub const fn with(self, other: Modifiers) -> Modifiers {
        Modifiers {
            ctrl: self.ctrl || other.ctrl,
            alt: self.alt || other.alt,
            shift: self.shift || other.shift,
            meta: self.meta || other.meta,
        }
    }

    /// True when no modifier is held.
    pub fn is_empty(&self) -> bool {
        !(self.ctrl || self.alt || self.shift || self.meta)
    }

    fn parse_name(name: &str) -> Option<Modifiers> {
        match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Self::CTRL),
            "alt" | "option" | "opt" => Some(Self::ALT),
            "shift" => Some(Self::SHIFT),
            "meta" | "cmd" | "command" | "super" | "win" | "windows" => Some(Self::META),
            _ => None,
        }
    }
}

/// A single non-modifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable ASCII, letters stored upper-case.
    Char(char),
    /// Function key F1..=F24.
    F(u8),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Backspace,
    Delete,
    Insert,
    Enter,
    Tab,
    Space,
    Escape,
}

impl Key {
    /// Lowest and highest function key a chord can use.
    pub const FUNCTION_KEYS: std::ops::RangeInclusive<u8> = 1..=24;

    fn normalized(self) -> Key {
        match self {
            Key::Char(' ') => Key::Space,
            Key::Char(c) => Key::Char(c.to_ascii_uppercase()),
            other => other,
        }
    }

    /// Function key `F<n>`, if `n` is in [`Key::FUNCTION_KEYS`].
    pub fn function(n: u8) -> Option<Key> {
        Self::FUNCTION_KEYS.contains(&n).then_some(Key::F(n))
    }

    /// Whether [`Key::from_name`] reads this key's display name back.
    /// Only printable ASCII characters and F1..=F24 qualify.
    pub fn is_bindable(&self) -> bool {
        match self.normalized() {
            Key::Char(c) => c.is_ascii_graphic(),
            Key::F(n) => Self::FUNCTION_KEYS.contains(&n),
            _ => true,
        }
    }

    /// Parse one key name (`"A"`, `","`, `"F5"`, `"Return"`, `"PgUp"`).
    pub fn from_name(name: &str) -> Option<Key> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return c.is_ascii_graphic().then(|| Key::Char(c).normalized());
        }

        let lower = name.to_ascii_lowercase();
        if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            return Key::function(n);
        }

        let key = match lower.as_str() {
            "up" | "arrowup" => Key::Up,
            "down" | "arrowdown" => Key::Down,
            "left" | "arrowleft" => Key::Left,
            "right" | "arrowright" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" | "pgup" => Key::PageUp,
            "pagedown" | "pgdown" | "pgdn" => Key::PageDown,
            "backspace" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "insert" | "ins" => Key::Insert,
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "space" | "spacebar" => Key::Space,
            "escape" | "esc" => Key::Escape,
            "comma" => Key::Char(','),
            "period" => Key::Char('.'),
            "minus" => Key::Char('-'),
            "plus" => Key::Char('+'),
            "equal" | "equals" => Key::Char('='),
            "slash" => Key::Char('/'),
            "backslash" => Key::Char('\\'),
            "semicolon" => Key::Char(';'),
            _ => return None,
        };
        Some(key)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Key::Char(c) => return write!(f, "{}", c),
            Key::F(n) => return write!(f, "F{}", n),
            Key::Up => "Up",
            Key::Down => "Down",
            Key::Left => "Left",
            Key::Right => "Right",
            Key::Home => "Home",
            Key::End => "End",
            Key::PageUp => "PageUp",
            Key::PageDown => "PageDown",
            Key::Backspace => "Backspace",
            Key::Delete => "Delete",
            Key::Insert => "Insert",
            Key::Enter => "Enter",
            Key::Tab => "Tab",
            Key::Space => "Space",
            Key::Escape => "Escape",
        };
        f.write_str(name)
    }
}

/// Errors from parsing a chord string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyChordError {
    #[error("no key in chord '{0}'")]
    MissingKey(String),
    #[error("unknown key '{0}'")]
    UnknownKey(String),
    #[error("unknown modifier '{0}'")]
    UnknownModifier(String),
    #[error("key '{0}' cannot be bound")]
    UnbindableKey(String),
}

/// Zero or one key plus modifiers. The default value is the empty chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyChord {
    key: Option<Key>,
    modifiers: Modifiers,
}

impl KeyChord {
    /// Chord for `key` with `modifiers`. Fails for keys that could not be
    /// parsed back from the persisted form (see [`Key::is_bindable`]).
    pub fn new(key: Key, modifiers: Modifiers) -> Result<Self, KeyChordError> {
        if !key.is_bindable() {
            return Err(KeyChordError::UnbindableKey(format!("{:?}", key)));
        }
        Ok(Self::bound(key, modifiers))
    }

    // Caller guarantees `key.is_bindable()`.
    fn bound(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key: Some(key.normalized()),
            modifiers,
        }
    }

    /// The unbound chord.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_none()
    }

    /// The chord key, `None` for the empty chord.
    pub fn key(&self) -> Option<Key> {
        self.key
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Whether a key press with these modifiers produces this chord.
    /// The empty chord matches nothing.
    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        self.key == Some(key.normalized()) && self.modifiers == modifiers
    }

    /// Canonical persisted form, e.g. `"Ctrl+Shift+D"`. Empty for the empty chord.
    pub fn to_canonical(&self) -> String {
        self.to_string()
    }

    /// Form shown to users: platform glyphs on macOS, canonical text elsewhere.
    pub fn display_label(&self) -> String {
        let Some(key) = self.key else {
            return "None".to_string();
        };

        if cfg!(target_os = "macos") {
            let mut label = String::new();
            if self.modifiers.ctrl {
                label.push('⌃');
            }
            if self.modifiers.alt {
                label.push('⌥');
            }
            if self.modifiers.shift {
                label.push('⇧');
            }
            if self.modifiers.meta {
                label.push('⌘');
            }
            label.push_str(&key.to_string());
            label
        } else {
            self.to_canonical()
        }
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(key) = self.key else {
            return Ok(());
        };

        let names = [
            (self.modifiers.ctrl, "Ctrl"),
            (self.modifiers.alt, "Alt"),
            (self.modifiers.shift, "Shift"),
            (self.modifiers.meta, "Meta"),
        ];
        for (_, name) in names.iter().filter(|(held, _)| *held) {
            write!(f, "{}+", name)?;
        }
        write!(f, "{}", key)
    }
}

impl FromStr for KeyChord {
    type Err = KeyChordError;

    /// Parse `"Ctrl+Shift+N"`-style text. Blank input is the empty chord.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(KeyChord::empty());
        }

        // A trailing "++" means the plus key itself.
        let (modifier_part, key_part) = if s == "+" {
            ("", "+")
        } else if let Some(head) = s.strip_suffix("++") {
            (head, "+")
        } else {
            s.rsplit_once('+').unwrap_or(("", s))
        };

        let key_part = key_part.trim();
        if key_part.is_empty() || Modifiers::parse_name(key_part).is_some() {
            return Err(KeyChordError::MissingKey(s.to_string()));
        }
        let key =
            Key::from_name(key_part).ok_or_else(|| KeyChordError::UnknownKey(key_part.to_string()))?;

        let mut modifiers = Modifiers::NONE;
        if !modifier_part.is_empty() {
            for part in modifier_part.split('+') {
                let part = part.trim();
                let parsed = Modifiers::parse_name(part)
                    .ok_or_else(|| KeyChordError::UnknownModifier(part.to_string()))?;
                modifiers = modifiers.with(parsed);
            }
        }

        Ok(KeyChord::bound(key, modifiers))
    }
}

impl TryFrom<String> for KeyChord {
    type Error = KeyChordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyChord> for String {
    fn from(chord: KeyChord) -> Self {
        chord.to_canonical()
    }
}
