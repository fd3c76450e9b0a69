// ABOUTME: Keyboard chord canonicalization and the chord-to-action table.
// ABOUTME: Chords look like "Control+Shift+R" with modifiers in a fixed order.

use std::collections::HashMap;

/// Modifier keys held during a key press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub control: bool,
    pub shift: bool,
    /// Mod1, usually Alt
    pub alt: bool,
    /// Meta / Super
    pub meta: bool,
}

impl Modifiers {
    pub fn is_empty(&self) -> bool {
        !(self.control || self.shift || self.alt || self.meta)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HotkeyError {
    #[error("Empty chord")]
    Empty,

    #[error("Unknown modifier {modifier:?} in chord {chord:?}")]
    UnknownModifier { chord: String, modifier: String },

    #[error("Chord {0:?} has no key")]
    MissingKey(String),

    #[error("Hotkey {0:?} has no action")]
    MissingAction(String),
}

/// Build the canonical chord string for a key press.
///
/// Modifiers are always emitted as `Control+`, `Shift+`, `Mod1+`, `Meta+` in
/// that order; single letters are upper-cased so `q` and `Q` bind alike.
pub fn canonical_chord(modifiers: Modifiers, key: &str) -> String {
    let mut chord = String::new();
    if modifiers.control {
        chord.push_str("Control+");
    }
    if modifiers.shift {
        chord.push_str("Shift+");
    }
    if modifiers.alt {
        chord.push_str("Mod1+");
    }
    if modifiers.meta {
        chord.push_str("Meta+");
    }
    chord.push_str(&normalize_key(key));
    chord
}

fn normalize_key(key: &str) -> String {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_alphabetic() => c.to_uppercase().collect(),
        _ => key.to_string(),
    }
}

fn modifier_slot<'a>(modifiers: &'a mut Modifiers, name: &str) -> Option<&'a mut bool> {
    match name.to_ascii_lowercase().as_str() {
        "control" | "ctrl" => Some(&mut modifiers.control),
        "shift" => Some(&mut modifiers.shift),
        "mod1" | "alt" => Some(&mut modifiers.alt),
        "meta" | "super" | "mod4" => Some(&mut modifiers.meta),
        _ => None,
    }
}

/// Parse a user-written chord (any modifier order, common aliases) into
/// its canonical form.
pub fn parse_chord(s: &str) -> Result<String, HotkeyError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(HotkeyError::Empty);
    }

    let parts: Vec<&str> = s.split('+').map(str::trim).collect();
    let (key, modifier_names) = parts
        .split_last()
        .ok_or(HotkeyError::Empty)?;

    let mut modifiers = Modifiers::default();
    if key.is_empty() || modifier_slot(&mut modifiers, key).is_some() {
        return Err(HotkeyError::MissingKey(s.to_string()));
    }

    for name in modifier_names {
        match modifier_slot(&mut modifiers, name) {
            Some(slot) => *slot = true,
            None => {
                return Err(HotkeyError::UnknownModifier {
                    chord: s.to_string(),
                    modifier: name.to_string(),
                })
            }
        }
    }

    Ok(canonical_chord(modifiers, key))
}

/// One `hotkey <chord> <action>` entry, chord already canonical
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyBinding {
    pub chord: String,
    pub action: String,
}

impl HotkeyBinding {
    /// Parse the value part of a `hotkey` directive: `<chord> <verb> [args...]`
    pub fn parse(value: &str) -> Result<Self, HotkeyError> {
        let value = value.trim();
        let (chord, action) = value
            .split_once(char::is_whitespace)
            .ok_or_else(|| HotkeyError::MissingAction(value.to_string()))?;
        let action = action.trim();
        if action.is_empty() {
            return Err(HotkeyError::MissingAction(value.to_string()));
        }
        Ok(Self {
            chord: parse_chord(chord)?,
            action: action.to_string(),
        })
    }
}

/// Shortcuts available without any configuration
pub const DEFAULT_BINDINGS: &[(&str, &str)] = &[
    ("Control+Shift+C", "copy"),
    ("Control+Shift+V", "paste"),
    ("Control+Shift+Insert", "paste"),
    ("Control+Shift+KP_Insert", "paste"),
    ("Control+Shift+R", "reload"),
    ("Control+Shift+Q", "quit"),
    ("Control+Shift+plus", "font_inc"),
    ("Control+Shift+asterisk", "font_inc"),
    ("Control+Shift+KP_Add", "font_inc"),
    ("Control+Shift+underscore", "font_dec"),
    ("Control+Shift+KP_Subtract", "font_dec"),
    ("Control+Shift+equal", "font_reset"),
    // Shift+0 on US layouts
    ("Control+Shift+parenright", "font_reset"),
    ("Control+Shift+KP_Enter", "font_reset"),
    ("Control+Shift+Up", "split_v"),
    ("Control+Shift+Down", "split_down"),
    ("Control+Shift+Left", "split_h"),
    ("Control+Shift+Right", "split_right"),
    ("Control+Shift+T", "new_tab"),
    ("Control+Shift+Return", "new_tab"),
    ("Control+Shift+Page_Up", "prev"),
    ("Control+Shift+KP_Page_Up", "prev"),
    ("Control+Shift+Page_Down", "next"),
    ("Control+Shift+KP_Page_Down", "next"),
    ("Control+Shift+BackSpace", "close"),
    ("Control+Shift+colon", "cmd"),
];

/// Canonical chord -> action string
#[derive(Debug, Clone, Default)]
pub struct HotkeyTable {
    bindings: HashMap<String, String>,
}

impl HotkeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (chord, action) in DEFAULT_BINDINGS {
            table.insert(chord, action);
        }
        table
    }

    /// Defaults overlaid with configured bindings; later entries win
    pub fn from_bindings(bindings: &[HotkeyBinding]) -> Self {
        let mut table = Self::with_defaults();
        for binding in bindings {
            tracing::debug!("Registered hotkey {} -> {}", binding.chord, binding.action);
            table.insert(&binding.chord, &binding.action);
        }
        tracing::info!("Hotkey table initialized with {} bindings", table.len());
        table
    }

    pub fn insert(&mut self, chord: &str, action: &str) {
        self.bindings.insert(chord.to_string(), action.to_string());
    }

    pub fn lookup(&self, chord: &str) -> Option<&str> {
        self.bindings.get(chord).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
