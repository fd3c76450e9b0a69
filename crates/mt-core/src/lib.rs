// ABOUTME: Shared types and configuration for microterm.
// ABOUTME: Defines colors, the line-oriented config file format, and hotkey tables.

pub mod color;
pub mod config;
pub mod hotkey;

pub use color::{parse_color, ColorError, Palette, TermColors};
pub use config::{Config, ConfigError, CursorShape, Position};
pub use hotkey::{canonical_chord, parse_chord, HotkeyBinding, HotkeyError, HotkeyTable, Modifiers};
