//! `Token` — a foreground color plus text modifiers.
//!
//! A `Token` is the unit of styling passed through a `Context`'s style
//! port. It downsamples from 24-bit RGB to the 256-color and 16-color
//! palettes by Euclidean distance, the way a terminal capability layer
//! would (cube + grayscale ramp for 256-color; the standard VT100
//! bright set for 16-color).

use std::fmt;

/// A single text modifier bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    /// No modifiers set.
    pub const NONE: Self = Self(0);
    /// Bold / increased intensity.
    pub const BOLD: Self = Self(1 << 0);
    /// Dim / decreased intensity.
    pub const DIM: Self = Self(1 << 1);
    /// Strikethrough.
    pub const STRIKETHROUGH: Self = Self(1 << 2);
    /// Inverse / reverse video.
    pub const INVERSE: Self = Self(1 << 3);

    /// True if `self` contains every bit set in `other`.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// True if no modifier bits are set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A 24-bit RGB color plus an optional modifier set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    /// Foreground red component.
    pub r: u8,
    /// Foreground green component.
    pub g: u8,
    /// Foreground blue component.
    pub b: u8,
    /// Active text modifiers.
    pub modifiers: Modifiers,
}

impl Token {
    /// Create a token from RGB components with no modifiers.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            modifiers: Modifiers::NONE,
        }
    }

    /// Parse a `"#rrggbb"` or `"#rgb"` hex string into a token.
    pub fn from_hex(hex: &str) -> crate::error::Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let (r, g, b) = match hex.len() {
            6 => (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ),
            3 => {
                let d = |s: &str| u8::from_str_radix(s, 16).map(|v| v * 17);
                (d(&hex[0..1]), d(&hex[1..2]), d(&hex[2..3]))
            }
            _ => {
                return Err(crate::error::BijouError::Style(format!(
                    "invalid hex color length: expected 3 or 6, got {}",
                    hex.len()
                )));
            }
        };
        let (r, g, b) = (
            r.map_err(|e| crate::error::BijouError::Style(format!("invalid hex color: {e}")))?,
            g.map_err(|e| crate::error::BijouError::Style(format!("invalid hex color: {e}")))?,
            b.map_err(|e| crate::error::BijouError::Style(format!("invalid hex color: {e}")))?,
        );
        Ok(Self::rgb(r, g, b))
    }

    /// Builder: set modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Nearest 256-color palette index by Euclidean distance over the
    /// 6x6x6 color cube plus the 24-step grayscale ramp.
    pub fn to_ansi256(self) -> u8 {
        let cube_steps: [u8; 6] = [0, 95, 135, 175, 215, 255];
        let nearest_cube = |v: u8| -> usize {
            cube_steps
                .iter()
                .enumerate()
                .min_by_key(|(_, &s)| (i32::from(s) - i32::from(v)).unsigned_abs())
                .map(|(i, _)| i)
                .unwrap_or(0)
        };
        let ci = nearest_cube(self.r);
        let cj = nearest_cube(self.g);
        let ck = nearest_cube(self.b);
        let cube_color = (
            cube_steps[ci],
            cube_steps[cj],
            cube_steps[ck],
            16 + 36 * ci as u16 + 6 * cj as u16 + ck as u16,
        );

        // Grayscale ramp: 24 steps from 8 to 238, step 10.
        let gray_idx = ((i32::from(self.r) + i32::from(self.g) + i32::from(self.b)) / 3 - 8)
            .clamp(0, 23 * 10)
            / 10;
        let gray_idx = gray_idx.clamp(0, 23) as u16;
        let gray_level = 8 + gray_idx * 10;
        let gray_color = (gray_level as u8, gray_level as u8, gray_level as u8, 232 + gray_idx);

        let dist = |c: (u8, u8, u8, u16)| -> i64 {
            let dr = i64::from(c.0) - i64::from(self.r);
            let dg = i64::from(c.1) - i64::from(self.g);
            let db = i64::from(c.2) - i64::from(self.b);
            dr * dr + dg * dg + db * db
        };

        if dist(cube_color) <= dist(gray_color) {
            cube_color.3 as u8
        } else {
            gray_color.3 as u8
        }
    }

    /// Nearest one of the 16 standard VT100 colors by Euclidean distance.
    pub fn to_ansi16(self) -> u8 {
        const PALETTE: [(u8, u8, u8); 16] = [
            (0, 0, 0),
            (128, 0, 0),
            (0, 128, 0),
            (128, 128, 0),
            (0, 0, 128),
            (128, 0, 128),
            (0, 128, 128),
            (192, 192, 192),
            (128, 128, 128),
            (255, 0, 0),
            (0, 255, 0),
            (255, 255, 0),
            (0, 0, 255),
            (255, 0, 255),
            (0, 255, 255),
            (255, 255, 255),
        ];
        PALETTE
            .iter()
            .enumerate()
            .min_by_key(|(_, &(r, g, b))| {
                let dr = i64::from(r) - i64::from(self.r);
                let dg = i64::from(g) - i64::from(self.g);
                let db = i64::from(b) - i64::from(self.b);
                dr * dr + dg * dg + db * db
            })
            .map(|(i, _)| i as u8)
            .unwrap_or(0)
    }

    /// SGR modifier codes (not including color) for this token.
    fn modifier_codes(self) -> Vec<u8> {
        let mut codes = Vec::new();
        if self.modifiers.contains(Modifiers::BOLD) {
            codes.push(1);
        }
        if self.modifiers.contains(Modifiers::DIM) {
            codes.push(2);
        }
        if self.modifiers.contains(Modifiers::STRIKETHROUGH) {
            codes.push(9);
        }
        if self.modifiers.contains(Modifiers::INVERSE) {
            codes.push(7);
        }
        codes
    }

    /// Render this token as a 24-bit-truecolor SGR opener, e.g. `ESC[1;38;2;r;g;bm`.
    pub fn sgr_truecolor(self) -> String {
        let mut parts = self.modifier_codes();
        parts.push(38);
        let codes = parts
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(";");
        format!("\x1b[{codes};2;{};{};{}m", self.r, self.g, self.b)
    }

    /// Render this token as a 256-color SGR opener.
    pub fn sgr_ansi256(self) -> String {
        let mut parts = self.modifier_codes();
        parts.push(38);
        let codes = parts
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(";");
        format!("\x1b[{codes};5;{}m", self.to_ansi256())
    }

    /// Render this token as a 16-color SGR opener (30-37 foreground range).
    pub fn sgr_ansi16(self) -> String {
        let base = self.to_ansi16();
        let code = if base < 8 { 30 + base } else { 82 + base };
        let mut parts = self.modifier_codes();
        parts.push(code);
        let codes = parts
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(";");
        format!("\x1b[{codes}m")
    }
}

/// The reset SGR sequence.
pub const SGR_RESET: &str = "\x1b[0m";

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
