//! Key capture for the shortcut settings screen.
//!
//! While recording, the next qualifying key press becomes the action's new
//! chord. Escape clears the binding. A press with no modifiers is ignored,
//! except for Delete, Backspace and Enter, and so is any key a chord cannot
//! hold.

use services::shortcuts::ShortcutRegistry;
use shared::{Action, Key, KeyChord, Modifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    Captured(KeyChord),
    Cleared,
    Ignored,
}

/// The capture rule on its own, without any recording state.
pub fn classify(key: Key, modifiers: Modifiers) -> CaptureOutcome {
    if key == Key::Escape {
        return CaptureOutcome::Cleared;
    }
    let bare_allowed = matches!(key, Key::Delete | Key::Backspace | Key::Enter);
    if modifiers.is_empty() && !bare_allowed {
        return CaptureOutcome::Ignored;
    }
    match KeyChord::new(key, modifiers) {
        Ok(chord) => CaptureOutcome::Captured(chord),
        Err(_) => CaptureOutcome::Ignored,
    }
}

/// Editing state for one action's binding.
#[derive(Debug, Clone)]
pub struct KeyCapture {
    action: Action,
    chord: KeyChord,
    recording: bool,
}

impl KeyCapture {
    pub fn new(action: Action, registry: &ShortcutRegistry) -> Self {
        Self {
            action,
            chord: registry.binding(action),
            recording: false,
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Chord currently shown in the control.
    pub fn chord(&self) -> KeyChord {
        self.chord
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn start_recording(&mut self) {
        self.recording = true;
    }

    pub fn cancel_recording(&mut self) {
        self.recording = false;
    }

    /// Pick up an external change (e.g. after a reset to defaults).
    pub fn refresh(&mut self, registry: &ShortcutRegistry) {
        if !self.recording {
            self.chord = registry.binding(self.action);
        }
    }

    /// Feed one key press. A capture or clear ends recording and is forwarded
    /// to the registry.
    pub fn handle_key(
        &mut self,
        key: Key,
        modifiers: Modifiers,
        registry: &mut ShortcutRegistry,
    ) -> CaptureOutcome {
        if !self.recording {
            return CaptureOutcome::Ignored;
        }

        let outcome = classify(key, modifiers);
        match outcome {
            CaptureOutcome::Captured(chord) => self.chord = chord,
            CaptureOutcome::Cleared => self.chord = KeyChord::empty(),
            CaptureOutcome::Ignored => return outcome,
        }
        self.recording = false;
        tracing::debug!(action = %self.action, chord = %self.chord, "captured shortcut");
        registry.set_binding(self.action, self.chord);
        outcome
    }

    /// [`KeyCapture::handle_key`] for a raw egui event. Releases and
    /// untranslatable keys are ignored.
    pub fn handle_egui_event(
        &mut self,
        event: &egui::Event,
        registry: &mut ShortcutRegistry,
    ) -> CaptureOutcome {
        match translate_event(event) {
            Some((key, modifiers)) => self.handle_key(key, modifiers, registry),
            None => CaptureOutcome::Ignored,
        }
    }
}

/// Key press from an egui event, if it maps onto a chord key.
pub fn translate_event(event: &egui::Event) -> Option<(Key, Modifiers)> {
    match event {
        egui::Event::Key {
            key,
            pressed: true,
            modifiers,
            ..
        } => translate_key(*key).map(|k| (k, translate_modifiers(*modifiers))),
        _ => None,
    }
}

pub fn translate_modifiers(modifiers: egui::Modifiers) -> Modifiers {
    Modifiers {
        ctrl: modifiers.ctrl,
        alt: modifiers.alt,
        shift: modifiers.shift,
        meta: modifiers.mac_cmd,
    }
}

pub fn translate_key(key: egui::Key) -> Option<Key> {
    use egui::Key as E;
    let key = match key {
        E::A => Key::Char('A'),
        E::B => Key::Char('B'),
        E::C => Key::Char('C'),
        E::D => Key::Char('D'),
        E::E => Key::Char('E'),
        E::F => Key::Char('F'),
        E::G => Key::Char('G'),
        E::H => Key::Char('H'),
        E::I => Key::Char('I'),
        E::J => Key::Char('J'),
        E::K => Key::Char('K'),
        E::L => Key::Char('L'),
        E::M => Key::Char('M'),
        E::N => Key::Char('N'),
        E::O => Key::Char('O'),
        E::P => Key::Char('P'),
        E::Q => Key::Char('Q'),
        E::R => Key::Char('R'),
        E::S => Key::Char('S'),
        E::T => Key::Char('T'),
        E::U => Key::Char('U'),
        E::V => Key::Char('V'),
        E::W => Key::Char('W'),
        E::X => Key::Char('X'),
        E::Y => Key::Char('Y'),
        E::Z => Key::Char('Z'),
        E::Num0 => Key::Char('0'),
        E::Num1 => Key::Char('1'),
        E::Num2 => Key::Char('2'),
        E::Num3 => Key::Char('3'),
        E::Num4 => Key::Char('4'),
        E::Num5 => Key::Char('5'),
        E::Num6 => Key::Char('6'),
        E::Num7 => Key::Char('7'),
        E::Num8 => Key::Char('8'),
        E::Num9 => Key::Char('9'),
        E::Comma => Key::Char(','),
        E::Period => Key::Char('.'),
        E::Minus => Key::Char('-'),
        E::Plus => Key::Char('+'),
        E::Equals => Key::Char('='),
        E::Slash => Key::Char('/'),
        E::Backslash => Key::Char('\\'),
        E::Semicolon => Key::Char(';'),
        E::OpenBracket => Key::Char('['),
        E::CloseBracket => Key::Char(']'),
        E::Backtick => Key::Char('`'),
        E::F1 => Key::F(1),
        E::F2 => Key::F(2),
        E::F3 => Key::F(3),
        E::F4 => Key::F(4),
        E::F5 => Key::F(5),
        E::F6 => Key::F(6),
        E::F7 => Key::F(7),
        E::F8 => Key::F(8),
        E::F9 => Key::F(9),
        E::F10 => Key::F(10),
        E::F11 => Key::F(11),
        E::F12 => Key::F(12),
        E::ArrowUp => Key::Up,
        E::ArrowDown => Key::Down,
        E::ArrowLeft => Key::Left,
        E::ArrowRight => Key::Right,
        E::Home => Key::Home,
        E::End => Key::End,
        E::PageUp => Key::PageUp,
        E::PageDown => Key::PageDown,
        E::Backspace => Key::Backspace,
        E::Delete => Key::Delete,
        E::Insert => Key::Insert,
        E::Enter => Key::Enter,
        E::Tab => Key::Tab,
        E::Space => Key::Space,
        E::Escape => Key::Escape,
        _ => return None,
    };
    Some(key)
}
