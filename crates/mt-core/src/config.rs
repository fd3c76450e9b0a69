// ABOUTME: Application configuration handling.
// ABOUTME: Parses the line-oriented `key value` config file, including nested includes.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::color::{parse_color, ColorError, Palette, TermColors};
use crate::hotkey::{HotkeyBinding, HotkeyError};

const MAX_INCLUDE_DEPTH: usize = 16;

/// Where the tab bar or the command line sits in the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    Top,
    #[default]
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorShape {
    #[default]
    Block,
    IBeam,
    Underline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub locale: String,

    /// Characters besides alphanumerics that count as part of a word
    pub word_chars: String,

    pub tab_position: Position,
    pub commander_position: Position,

    pub font_family: String,

    /// Font size in points; `font_reset` returns to this value
    pub font_size: u32,

    /// Background opacity (0.0 = transparent, 1.0 = opaque)
    pub opacity: f32,

    pub cursor_color: u32,
    pub cursor_foreground: u32,
    pub cursor_shape: CursorShape,
    pub foreground: u32,
    pub background: u32,
    pub bold_color: u32,

    pub focus_follows_mouse: bool,
    pub copy_on_selection: bool,

    /// `colorNN` entries, applied on top of the default palette
    pub palette_overrides: BTreeMap<u8, u32>,

    /// `hotkey` entries in file order
    pub hotkeys: Vec<HotkeyBinding>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: "en_US.UTF-8".to_string(),
            word_chars: "-./?%&#_=+@~".to_string(),
            tab_position: Position::Bottom,
            commander_position: Position::Bottom,
            font_family: "Monospace".to_string(),
            font_size: 9,
            opacity: 1.0,
            cursor_color: 0xffffff,
            cursor_foreground: 0xffffff,
            cursor_shape: CursorShape::Block,
            foreground: 0xffffff,
            background: 0x000000,
            bold_color: 0xffffff,
            focus_follows_mouse: false,
            copy_on_selection: true,
            palette_overrides: BTreeMap::new(),
            hotkeys: Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Include cycle through {0}")]
    IncludeCycle(PathBuf),

    #[error("Includes nested too deeply at {0}")]
    IncludeDepth(PathBuf),

    #[error("Unknown option {0:?}")]
    UnknownKey(String),

    #[error("Option {0:?} needs a value")]
    MissingValue(String),

    #[error("Invalid value {value:?} for option {key:?}")]
    InvalidValue { key: String, value: String },

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error(transparent)]
    Hotkey(#[from] HotkeyError),
}

/// A single parsed config line
#[derive(Debug, Clone, PartialEq)]
enum Directive {
    Locale(String),
    WordChars(String),
    TabPosition(Position),
    CommanderPosition(Position),
    Font { family: String, size: u32 },
    Opacity(f32),
    CursorColor(u32),
    CursorForeground(u32),
    CursorShape(CursorShape),
    Foreground(u32),
    BoldColor(u32),
    Background(u32),
    FocusFollowsMouse(bool),
    CopyOnSelection(bool),
    PaletteColor(u8, u32),
    Hotkey(HotkeyBinding),
    Include(PathBuf),
}

impl Config {
    /// Get the default config file path (~/.config/microterm/microterm.conf)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("microterm").join("microterm.conf"))
    }

    /// Load config from a path on top of the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_file(path)?;
        Ok(config)
    }

    /// Load config from a path, or return default config if it can't be read
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Parse config text directly; includes resolve against the current directory
    pub fn parse(text: &str) -> Self {
        let mut config = Self::default();
        config.apply_text(text, Path::new("."), "<inline>", &mut Vec::new());
        config
    }

    /// Apply every directive in `path` (and its includes) to this config.
    ///
    /// Only an unreadable top-level file is an error; bad lines and broken
    /// includes are logged and skipped.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        self.apply_file_nested(path, &mut Vec::new())
    }

    fn apply_file_nested(&mut self, path: &Path, stack: &mut Vec<PathBuf>) -> Result<(), ConfigError> {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if stack.contains(&canonical) {
            return Err(ConfigError::IncludeCycle(path.to_path_buf()));
        }
        if stack.len() >= MAX_INCLUDE_DEPTH {
            return Err(ConfigError::IncludeDepth(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Parsing config file {}", path.display());

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let origin = path.display().to_string();
        stack.push(canonical);
        self.apply_text(&content, base, &origin, stack);
        stack.pop();
        Ok(())
    }

    fn apply_text(&mut self, text: &str, base: &Path, origin: &str, stack: &mut Vec<PathBuf>) {
        for (index, line) in text.lines().enumerate() {
            match parse_line(line) {
                Ok(None) => {}
                Ok(Some(Directive::Include(file))) => {
                    let target = base.join(file);
                    if let Err(e) = self.apply_file_nested(&target, stack) {
                        tracing::warn!("{}:{}: skipping include: {}", origin, index + 1, e);
                    }
                }
                Ok(Some(directive)) => {
                    tracing::trace!("{}:{}: {:?}", origin, index + 1, directive);
                    self.apply(directive);
                }
                Err(e) => {
                    tracing::warn!("{}:{}: skipping line: {}", origin, index + 1, e);
                }
            }
        }
    }

    fn apply(&mut self, directive: Directive) {
        match directive {
            Directive::Locale(locale) => self.locale = locale,
            Directive::WordChars(chars) => self.word_chars = chars,
            Directive::TabPosition(position) => self.tab_position = position,
            Directive::CommanderPosition(position) => self.commander_position = position,
            Directive::Font { family, size } => {
                self.font_family = family;
                self.font_size = size;
            }
            Directive::Opacity(opacity) => self.opacity = opacity,
            Directive::CursorColor(rgb) => self.cursor_color = rgb,
            Directive::CursorForeground(rgb) => self.cursor_foreground = rgb,
            Directive::CursorShape(shape) => self.cursor_shape = shape,
            Directive::Foreground(rgb) => self.foreground = rgb,
            Directive::BoldColor(rgb) => self.bold_color = rgb,
            Directive::Background(rgb) => self.background = rgb,
            Directive::FocusFollowsMouse(on) => self.focus_follows_mouse = on,
            Directive::CopyOnSelection(on) => self.copy_on_selection = on,
            Directive::PaletteColor(index, rgb) => {
                self.palette_overrides.insert(index, rgb);
            }
            Directive::Hotkey(binding) => self.hotkeys.push(binding),
            // Resolved by apply_text, which knows the including file
            Directive::Include(_) => {}
        }
    }

    pub fn term_colors(&self) -> TermColors {
        TermColors {
            foreground: self.foreground,
            background: self.background,
            bold: self.bold_color,
            cursor: self.cursor_color,
            cursor_foreground: self.cursor_foreground,
            opacity: self.opacity,
            palette: Palette::with_overrides(&self.palette_overrides),
        }
    }
}

fn parse_line(line: &str) -> Result<Option<Directive>, ConfigError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (key, value) = match line.split_once(char::is_whitespace) {
        Some((key, value)) => (key, value.trim()),
        None => (line, ""),
    };
    if value.is_empty() {
        return Err(ConfigError::MissingValue(key.to_string()));
    }

    let invalid = || ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    };

    let directive = match key {
        "locale" => Directive::Locale(value.to_string()),
        "char" | "word_chars" => Directive::WordChars(unquote(value).to_string()),
        "tab" => Directive::TabPosition(parse_position(value).ok_or_else(invalid)?),
        "commander" => Directive::CommanderPosition(parse_position(value).ok_or_else(invalid)?),
        "font" => {
            let (family, size) = value.rsplit_once(char::is_whitespace).ok_or_else(invalid)?;
            let size = size.parse::<u32>().ok().filter(|s| *s > 0).ok_or_else(invalid)?;
            Directive::Font {
                family: family.trim().to_string(),
                size,
            }
        }
        "opacity" => {
            let opacity = value
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(invalid)?;
            Directive::Opacity(opacity.clamp(0.0, 1.0))
        }
        "cursor" => Directive::CursorColor(parse_color(value)?),
        "cursor_foreground" => Directive::CursorForeground(parse_color(value)?),
        "cursor_shape" => Directive::CursorShape(match value {
            "block" => CursorShape::Block,
            "ibeam" => CursorShape::IBeam,
            "underline" => CursorShape::Underline,
            _ => return Err(invalid()),
        }),
        "foreground" => Directive::Foreground(parse_color(value)?),
        "foreground_bold" => Directive::BoldColor(parse_color(value)?),
        "background" => Directive::Background(parse_color(value)?),
        "focus_follow_mouse" => Directive::FocusFollowsMouse(parse_bool(value).ok_or_else(invalid)?),
        "copy_on_selection" => Directive::CopyOnSelection(parse_bool(value).ok_or_else(invalid)?),
        "include" => Directive::Include(PathBuf::from(unquote(value))),
        "hotkey" => Directive::Hotkey(HotkeyBinding::parse(value)?),
        _ => match key.strip_prefix("color") {
            Some(index) => {
                let index = index.parse::<u8>().map_err(|_| invalid())?;
                Directive::PaletteColor(index, parse_color(value)?)
            }
            None => return Err(ConfigError::UnknownKey(key.to_string())),
        },
    };

    Ok(Some(directive))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

fn parse_position(value: &str) -> Option<Position> {
    match value {
        "top" => Some(Position::Top),
        "bottom" => Some(Position::Bottom),
        _ => None,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_match_stock_terminal() {
        let config = Config::default();
        assert_eq!(config.font_family, "Monospace");
        assert_eq!(config.font_size, 9);
        assert_eq!(config.background, 0x000000);
        assert!(config.copy_on_selection);
        assert_eq!(config.tab_position, Position::Bottom);
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let config = Config::parse("# a comment\n\n   \nlocale C.UTF-8\n");
        assert_eq!(config.locale, "C.UTF-8");
    }

    #[test]
    fn parses_visual_options() {
        let config = Config::parse(
            "font Fira Code 12\n\
             opacity 0.8\n\
             foreground #ff8100\n\
             background 0x101010\n\
             foreground_bold ffffff\n\
             cursor #00ff00\n\
             cursor_foreground #000000\n\
             cursor_shape ibeam\n\
             char \"-./\"\n\
             tab top\n\
             commander top\n\
             copy_on_selection false\n\
             focus_follow_mouse true\n",
        );
        assert_eq!(config.font_family, "Fira Code");
        assert_eq!(config.font_size, 12);
        assert!((config.opacity - 0.8).abs() < f32::EPSILON);
        assert_eq!(config.foreground, 0xff8100);
        assert_eq!(config.background, 0x101010);
        assert_eq!(config.cursor_color, 0x00ff00);
        assert_eq!(config.cursor_foreground, 0x000000);
        assert_eq!(config.cursor_shape, CursorShape::IBeam);
        assert_eq!(config.word_chars, "-./");
        assert_eq!(config.tab_position, Position::Top);
        assert_eq!(config.commander_position, Position::Top);
        assert!(!config.copy_on_selection);
        assert!(config.focus_follows_mouse);
    }

    #[test]
    fn palette_overrides_reach_term_colors() {
        let config = Config::parse("color1 #aa0000\ncolor255 #010203\n");
        let colors = config.term_colors();
        assert_eq!(colors.palette.get(1), 0xaa0000);
        assert_eq!(colors.palette.get(255), 0x010203);
        assert_eq!(colors.palette.get(2), Palette::xterm().get(2));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let config = Config::parse(
            "font Monospace\n\
             opacity lots\n\
             color300 #ffffff\n\
             frobnicate yes\n\
             background\n\
             foreground #123456\n",
        );
        assert_eq!(config.font_size, 9);
        assert_eq!(config.opacity, 1.0);
        assert!(config.palette_overrides.is_empty());
        assert_eq!(config.background, 0x000000);
        assert_eq!(config.foreground, 0x123456);
    }

    #[test]
    fn non_finite_opacity_is_rejected() {
        for value in ["NaN", "inf", "-infinity"] {
            let line = format!("opacity {}", value);
            assert!(matches!(
                parse_line(&line),
                Err(ConfigError::InvalidValue { ref key, .. }) if key == "opacity"
            ));
        }
        let config = Config::parse("opacity 0.5
opacity NaN
");
        assert_eq!(config.opacity, 0.5);
        let config = Config::parse("opacity 7
");
        assert_eq!(config.opacity, 1.0);
    }

    #[test]
    fn hotkeys_are_canonicalized() {
        let config = Config::parse("hotkey Shift+Ctrl+l exec ls -la\nhotkey Control+Shift+Q quit\n");
        assert_eq!(config.hotkeys.len(), 2);
        assert_eq!(config.hotkeys[0].chord, "Control+Shift+L");
        assert_eq!(config.hotkeys[0].action, "exec ls -la");
        assert_eq!(config.hotkeys[1].action, "quit");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("nope.conf"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
        let fallback = Config::load_or_default(&dir.path().join("nope.conf"));
        assert_eq!(fallback, Config::default());
    }

    #[test]
    fn include_resolves_relative_to_including_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("colors.conf"), "background #222222\n").unwrap();
        fs::write(
            dir.path().join("main.conf"),
            "foreground #eeeeee\ninclude colors.conf\nlocale C\n",
        )
        .unwrap();

        let config = Config::load(&dir.path().join("main.conf")).unwrap();
        assert_eq!(config.foreground, 0xeeeeee);
        assert_eq!(config.background, 0x222222);
        assert_eq!(config.locale, "C");
    }

    #[test]
    fn include_cycles_are_cut() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.conf"), "include b.conf\nfont Mono 10\n").unwrap();
        fs::write(dir.path().join("b.conf"), "include a.conf\nlocale C\n").unwrap();

        let config = Config::load(&dir.path().join("a.conf")).unwrap();
        assert_eq!(config.font_size, 10);
        assert_eq!(config.locale, "C");
    }

    #[test]
    fn later_lines_override_earlier_ones() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.conf"), "font Mono 10\n").unwrap();
        fs::write(dir.path().join("main.conf"), "include base.conf\nfont Mono 14\n").unwrap();

        let config = Config::load(&dir.path().join("main.conf")).unwrap();
        assert_eq!(config.font_size, 14);
    }
}
