//! Keyboard command surface.
//!
//! Maps key chords to editor commands. Editing shortcuts are live in
//! [`KeyContext::Editing`]; the "1"/"2" phase triggers only in
//! [`KeyContext::Playback`] (preview and exported artifact).

use serde::{Deserialize, Serialize};

use crate::animation::Phase;

/// A key, as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// The Delete key.
    Delete,
    /// A printable character key.
    Char(char),
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom(key: &str) -> Option<Self> {
        if key == "Delete" {
            return Some(Self::Delete);
        }
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(Self::Char(c.to_ascii_lowercase())),
            _ => None,
        }
    }
}

/// A key press with modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    /// The pressed key.
    pub key: Key,
    /// Control held.
    pub ctrl: bool,
    /// Command (meta) held.
    pub meta: bool,
    /// Shift held.
    pub shift: bool,
}

impl KeyChord {
    /// An unmodified key press.
    #[must_use]
    pub const fn plain(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    /// Key press with Ctrl held.
    #[must_use]
    pub const fn ctrl(c: char) -> Self {
        Self {
            key: Key::Char(c),
            ctrl: true,
            meta: false,
            shift: false,
        }
    }

    /// Add Shift to the chord.
    #[must_use]
    pub const fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Ctrl on Linux/Windows or Cmd on macOS.
    #[must_use]
    pub const fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Which set of shortcuts is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyContext {
    /// Editing canvas.
    Editing,
    /// Preview player or exported artifact.
    Playback,
}

/// A command issued from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorCommand {
    /// Delete every selected element.
    DeleteSelected,
    /// Duplicate every selected element.
    DuplicateSelected,
    /// Step back in history.
    Undo,
    /// Step forward in history.
    Redo,
    /// Add every element to the selection.
    SelectAll,
    /// Trigger an animation phase.
    Play(Phase),
}

/// Resolve a chord in a context, or `None` if it is not bound.
#[must_use]
pub fn resolve(chord: KeyChord, context: KeyContext) -> Option<EditorCommand> {
    match context {
        KeyContext::Playback => match chord.key {
            Key::Char('1') => Some(EditorCommand::Play(Phase::Enter)),
            Key::Char('2') => Some(EditorCommand::Play(Phase::Exit)),
            _ => None,
        },
        KeyContext::Editing => match chord.key {
            Key::Delete => Some(EditorCommand::DeleteSelected),
            Key::Char(_) if !chord.primary() => None,
            Key::Char('d') => Some(EditorCommand::DuplicateSelected),
            Key::Char('z') if chord.shift => Some(EditorCommand::Redo),
            Key::Char('z') => Some(EditorCommand::Undo),
            Key::Char('y') => Some(EditorCommand::Redo),
            Key::Char('a') => Some(EditorCommand::SelectAll),
            Key::Char(_) => None,
        },
    }
}
