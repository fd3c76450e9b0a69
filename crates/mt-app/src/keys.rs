// ABOUTME: Translation of winit key events into chord names and PTY bytes.
// ABOUTME: Key names follow X11 keysym spelling so config files stay portable.

use mt_core::Modifiers;
use winit::keyboard::{Key, KeyLocation, ModifiersState, NamedKey};

pub fn modifiers(state: ModifiersState) -> Modifiers {
    Modifiers {
        control: state.control_key(),
        shift: state.shift_key(),
        alt: state.alt_key(),
        meta: state.super_key(),
    }
}

/// Keysym-style name used in chords, or `None` for modifier-only presses.
/// Keys on the numeric keypad get their `KP_` names.
pub fn key_name(key: &Key, location: KeyLocation) -> Option<String> {
    if location == KeyLocation::Numpad {
        if let Some(name) = keypad_name(key) {
            return Some(name);
        }
    }
    match key {
        Key::Character(s) => Some(character_name(s)),
        Key::Named(named) => named_key_name(*named).map(str::to_string),
        _ => None,
    }
}

fn keypad_name(key: &Key) -> Option<String> {
    let name = match key {
        Key::Character(s) => match s.as_str() {
            "+" => "KP_Add",
            "-" => "KP_Subtract",
            "*" => "KP_Multiply",
            "/" => "KP_Divide",
            "." => "KP_Decimal",
            "=" => "KP_Equal",
            digit if digit.len() == 1 && digit.as_bytes()[0].is_ascii_digit() => {
                return Some(format!("KP_{}", digit));
            }
            _ => return None,
        },
        Key::Named(named) => match named {
            NamedKey::Enter => "KP_Enter",
            NamedKey::PageUp => "KP_Page_Up",
            NamedKey::PageDown => "KP_Page_Down",
            NamedKey::Insert => "KP_Insert",
            NamedKey::Delete => "KP_Delete",
            NamedKey::Home => "KP_Home",
            NamedKey::End => "KP_End",
            NamedKey::ArrowUp => "KP_Up",
            NamedKey::ArrowDown => "KP_Down",
            NamedKey::ArrowLeft => "KP_Left",
            NamedKey::ArrowRight => "KP_Right",
            _ => return None,
        },
        _ => return None,
    };
    Some(name.to_string())
}

fn character_name(s: &str) -> String {
    let mut chars = s.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return s.to_string();
    };
    let name = match c {
        ' ' => "space",
        '!' => "exclam",
        '"' => "quotedbl",
        '#' => "numbersign",
        '$' => "dollar",
        '%' => "percent",
        '&' => "ampersand",
        '\'' => "apostrophe",
        '(' => "parenleft",
        ')' => "parenright",
        '*' => "asterisk",
        '+' => "plus",
        ',' => "comma",
        '-' => "minus",
        '.' => "period",
        '/' => "slash",
        ':' => "colon",
        ';' => "semicolon",
        '<' => "less",
        '=' => "equal",
        '>' => "greater",
        '?' => "question",
        '@' => "at",
        '[' => "bracketleft",
        '\\' => "backslash",
        ']' => "bracketright",
        '^' => "asciicircum",
        '_' => "underscore",
        '`' => "grave",
        '{' => "braceleft",
        '|' => "bar",
        '}' => "braceright",
        '~' => "asciitilde",
        _ => return s.to_string(),
    };
    name.to_string()
}

fn named_key_name(key: NamedKey) -> Option<&'static str> {
    let name = match key {
        NamedKey::Enter => "Return",
        NamedKey::Backspace => "BackSpace",
        NamedKey::Tab => "Tab",
        NamedKey::Escape => "Escape",
        NamedKey::Space => "space",
        NamedKey::ArrowUp => "Up",
        NamedKey::ArrowDown => "Down",
        NamedKey::ArrowLeft => "Left",
        NamedKey::ArrowRight => "Right",
        NamedKey::PageUp => "Page_Up",
        NamedKey::PageDown => "Page_Down",
        NamedKey::Home => "Home",
        NamedKey::End => "End",
        NamedKey::Insert => "Insert",
        NamedKey::Delete => "Delete",
        NamedKey::F1 => "F1",
        NamedKey::F2 => "F2",
        NamedKey::F3 => "F3",
        NamedKey::F4 => "F4",
        NamedKey::F5 => "F5",
        NamedKey::F6 => "F6",
        NamedKey::F7 => "F7",
        NamedKey::F8 => "F8",
        NamedKey::F9 => "F9",
        NamedKey::F10 => "F10",
        NamedKey::F11 => "F11",
        NamedKey::F12 => "F12",
        _ => return None,
    };
    Some(name)
}

/// Bytes a key press sends to the shell
pub fn key_to_bytes(key: &Key, mods: Modifiers) -> Option<Vec<u8>> {
    match key {
        Key::Character(s) => {
            let mut chars = s.chars();
            let single = match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            };
            match single {
                // Ctrl+letter sends control code
                Some(c) if mods.control && c.is_ascii_alphabetic() => {
                    Some(vec![c.to_ascii_lowercase() as u8 - b'a' + 1])
                }
                // Alt+key sends ESC + key
                Some(_) if mods.alt => {
                    let mut bytes = vec![0x1b];
                    bytes.extend(s.as_bytes());
                    Some(bytes)
                }
                _ => Some(s.as_bytes().to_vec()),
            }
        }
        Key::Named(named) => match named {
            NamedKey::Enter => Some(vec![b'\r']),
            NamedKey::Backspace => Some(vec![0x7f]),
            NamedKey::Tab => Some(vec![b'\t']),
            NamedKey::Escape => Some(vec![0x1b]),
            NamedKey::ArrowUp => Some(b"\x1b[A".to_vec()),
            NamedKey::ArrowDown => Some(b"\x1b[B".to_vec()),
            NamedKey::ArrowRight => Some(b"\x1b[C".to_vec()),
            NamedKey::ArrowLeft => Some(b"\x1b[D".to_vec()),
            NamedKey::Home => Some(b"\x1b[H".to_vec()),
            NamedKey::End => Some(b"\x1b[F".to_vec()),
            NamedKey::PageUp => Some(b"\x1b[5~".to_vec()),
            NamedKey::PageDown => Some(b"\x1b[6~".to_vec()),
            NamedKey::Insert => Some(b"\x1b[2~".to_vec()),
            NamedKey::Delete => Some(b"\x1b[3~".to_vec()),
            NamedKey::Space => Some(vec![b' ']),
            _ => None,
        },
        _ => None,
    }
}
