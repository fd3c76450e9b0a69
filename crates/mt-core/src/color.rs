// ABOUTME: Color parsing and the 256-entry terminal palette.
// ABOUTME: Colors travel as packed 0xRRGGBB values until a session applies them.

use std::collections::BTreeMap;

pub const PALETTE_SIZE: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("Invalid color value: {0:?}")]
    Invalid(String),
}

/// Parse `#rrggbb`, `0xrrggbb` or bare hex digits into a packed RGB value.
pub fn parse_color(value: &str) -> Result<u32, ColorError> {
    let digits = value
        .strip_prefix('#')
        .or_else(|| value.strip_prefix("0x"))
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    if digits.is_empty() || digits.len() > 6 {
        return Err(ColorError::Invalid(value.to_string()));
    }

    u32::from_str_radix(digits, 16).map_err(|_| ColorError::Invalid(value.to_string()))
}

/// Full 256-color palette handed to sessions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [u32; PALETTE_SIZE],
}

impl Palette {
    /// xterm-style defaults: 16 base colors, 6x6x6 cube, grayscale ramp
    pub fn xterm() -> Self {
        let mut colors = [0; PALETTE_SIZE];
        for (index, slot) in colors.iter_mut().enumerate() {
            *slot = default_indexed(index as u8);
        }
        Self { colors }
    }

    /// Defaults with `colorNN` overrides applied on top
    pub fn with_overrides(overrides: &BTreeMap<u8, u32>) -> Self {
        let mut palette = Self::xterm();
        for (&index, &rgb) in overrides {
            palette.set(index, rgb);
        }
        palette
    }

    pub fn get(&self, index: u8) -> u32 {
        self.colors[index as usize]
    }

    pub fn set(&mut self, index: u8, rgb: u32) {
        self.colors[index as usize] = rgb;
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::xterm()
    }
}

fn default_indexed(index: u8) -> u32 {
    match index {
        0..=15 => {
            // Normal colors at 0xc0, bright ones lifted by 0x3f
            let bright = if index > 7 { 0x3f } else { 0 };
            let channel = |bit: u8| if index & bit != 0 { 0xc0 + bright } else { bright };
            (channel(1) << 16) | (channel(2) << 8) | channel(4)
        }
        16..=231 => {
            let idx = index - 16;
            let r = (idx / 36) % 6;
            let g = (idx / 6) % 6;
            let b = idx % 6;
            // 0->0, 1->95, 2->135, 3->175, 4->215, 5->255
            let to_255 = |v: u8| -> u32 {
                if v == 0 {
                    0
                } else {
                    55 + v as u32 * 40
                }
            };
            (to_255(r) << 16) | (to_255(g) << 8) | to_255(b)
        }
        232..=255 => {
            let gray = 8 + (index - 232) as u32 * 10;
            (gray << 16) | (gray << 8) | gray
        }
    }
}

/// Everything a session needs to color itself
#[derive(Debug, Clone, PartialEq)]
pub struct TermColors {
    pub foreground: u32,
    pub background: u32,
    pub bold: u32,
    pub cursor: u32,
    pub cursor_foreground: u32,
    /// Background opacity (0.0 = transparent, 1.0 = opaque)
    pub opacity: f32,
    pub palette: Palette,
}

impl TermColors {
    /// Color for an xterm color index: 0-255 from the palette, then
    /// foreground (256), background (257) and cursor (258)
    pub fn rgb_at(&self, index: usize) -> Option<u32> {
        match index {
            0..=255 => Some(self.palette.get(index as u8)),
            256 => Some(self.foreground),
            257 => Some(self.background),
            258 => Some(self.cursor),
            _ => None,
        }
    }
}
