//! Viewport windowing and Z-ordered overlay compositing.

use crate::ansi::{clip_to_width, pad_to_width, visible_width};

/// Return the `height`-row window of `content` starting at `scroll_y`,
/// each row clipped to `width`.
pub fn viewport(content: &str, width: u16, height: u16, scroll_y: u16) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = scroll_y as usize;
    let mut out = Vec::with_capacity(height as usize);
    for i in 0..height as usize {
        let line = lines.get(start + i).copied().unwrap_or("");
        out.push(clip_to_width(line, width as usize));
    }
    out.join("\n")
}

/// A single overlay to paint onto a background frame.
#[derive(Debug, Clone)]
pub struct Overlay {
    /// The overlay's own rendered content (`\n`-joined lines).
    pub content: String,
    /// Row at which to paint the overlay's first line.
    pub row: u16,
    /// Column at which to paint each overlay row.
    pub col: u16,
}

impl Overlay {
    /// Create a new overlay.
    pub fn new(content: impl Into<String>, row: u16, col: u16) -> Self {
        Self {
            content: content.into(),
            row,
            col,
        }
    }
}

/// Composite `overlays`, painted in order (later overlays cover earlier
/// ones), onto `background`. When `dim` is set, background rows are
/// wrapped in the dim SGR attribute (never the overlay cells).
pub fn composite(background: &str, overlays: &[Overlay], dim: bool) -> String {
    let mut rows: Vec<String> = background.lines().map(String::from).collect();

    for overlay in overlays {
        let overlay_lines: Vec<&str> = overlay.content.lines().collect();
        for (i, line) in overlay_lines.iter().enumerate() {
            let target_row = overlay.row as usize + i;
            if target_row >= rows.len() {
                // Overlay clipping past the bottom of the background: stop.
                break;
            }
            rows[target_row] = paint_row(&rows[target_row], overlay.col, line);
        }
    }

    if dim {
        rows.iter()
            .map(|r| format!("\x1b[2m{r}\x1b[0m"))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        rows.join("\n")
    }
}

/// Paint `overlay_line` into `bg_row` at column `col`, preserving
/// background content outside the overlay span. SGR state is closed
/// before the overlay and a fresh attribute context starts after it.
fn paint_row(bg_row: &str, col: u16, overlay_line: &str) -> String {
    let col = col as usize;
    let overlay_width = visible_width(overlay_line);
    let bg_width = visible_width(bg_row);

    let left = if bg_width >= col {
        clip_width_prefix(bg_row, col)
    } else {
        pad_to_width(bg_row, col)
    };

    let right = if bg_width > col + overlay_width {
        clip_width_suffix(bg_row, col + overlay_width)
    } else {
        String::new()
    };

    format!("{left}\x1b[0m{overlay_line}\x1b[0m{right}")
}

/// Return the prefix of `s` spanning visible width `[0, n)`.
fn clip_width_prefix(s: &str, n: usize) -> String {
    clip_to_width(s, n)
}

/// Return the suffix of `s` starting at visible column `from` through
/// the end of the line, preserving any SGR state active at that column
/// by re-opening nothing (plain text tail; background rows in this
/// engine carry no persistent styling runs across columns other than
/// what `clip_to_width`/full-row composition already account for).
fn clip_width_suffix(s: &str, from: usize) -> String {
    let mut width = 0usize;
    let mut byte_start = None;
    let mut i = 0;
    let bytes = s.as_bytes();
    while i < bytes.len() {
        if s[i..].starts_with('\x1b') {
            // Skip any SGR sequence without counting width.
            if let Some(end) = s[i..].find('m') {
                i += end + 1;
                continue;
            }
        }
        let ch_len = s[i..].chars().next().map(char::len_utf8).unwrap_or(1);
        let ch = &s[i..i + ch_len];
        if width == from {
            byte_start = Some(i);
            break;
        }
        width += unicode_width::UnicodeWidthStr::width(ch);
        i += ch_len;
        if width > from {
            byte_start = Some(i);
            break;
        }
    }
    match byte_start {
        Some(b) => s[b..].to_string(),
        None => String::new(),
    }
}

/// A bordered modal box centered on screen.
pub struct Modal<'a> {
    /// Optional title line.
    pub title: Option<&'a str>,
    /// Body text.
    pub body: &'a str,
    /// Optional hint line (e.g. keybinding help).
    pub hint: Option<&'a str>,
    /// Inner content width (excluding borders).
    pub width: u16,
}

impl<'a> Modal<'a> {
    /// Render this modal as an overlay positioned to be centered within
    /// a `screen_width`x`screen_height` frame. Position clamps to
    /// `(0, 0)` when the box exceeds screen dimensions.
    pub fn overlay(&self, screen_width: u16, screen_height: u16) -> Overlay {
        let mut lines = Vec::new();
        let inner = self.width as usize;
        lines.push(format!("+{}+", "-".repeat(inner + 2)));
        if let Some(title) = self.title {
            lines.push(format!("| {} |", pad_to_width(&clip_to_width(title, inner), inner)));
            lines.push(format!("+{}+", "-".repeat(inner + 2)));
        }
        for body_line in self.body.lines() {
            lines.push(format!(
                "| {} |",
                pad_to_width(&clip_to_width(body_line, inner), inner)
            ));
        }
        if let Some(hint) = self.hint {
            lines.push(format!("+{}+", "-".repeat(inner + 2)));
            lines.push(format!("| {} |", pad_to_width(&clip_to_width(hint, inner), inner)));
        }
        lines.push(format!("+{}+", "-".repeat(inner + 2)));

        let box_width = inner as u16 + 4;
        let box_height = lines.len() as u16;
        let row = if box_height >= screen_height {
            0
        } else {
            (screen_height - box_height) / 2
        };
        let col = if box_width >= screen_width {
            0
        } else {
            (screen_width - box_width) / 2
        };
        Overlay::new(lines.join("\n"), row, col)
    }
}

/// Toast variant, selecting the leading icon glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    /// Success (✔).
    Success,
    /// Error (✘).
    Error,
    /// Informational (ℹ).
    Info,
}

impl ToastVariant {
    fn glyph(self) -> char {
        match self {
            Self::Success => '✔',
            Self::Error => '✘',
            Self::Info => 'ℹ',
        }
    }
}

/// Anchor corner for toast placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Top-left.
    TopLeft,
    /// Top-right.
    TopRight,
    /// Bottom-left.
    BottomLeft,
    /// Bottom-right.
    BottomRight,
}

/// A toast notification anchored to a screen corner.
pub struct Toast<'a> {
    /// Message text.
    pub message: &'a str,
    /// Icon/color variant.
    pub variant: ToastVariant,
    /// Corner to anchor to.
    pub anchor: Anchor,
    /// Margin in cells from the anchored edges.
    pub margin: u16,
}

impl<'a> Toast<'a> {
    /// Render this toast as an overlay within a `screen_width`x`screen_height` frame.
    pub fn overlay(&self, screen_width: u16, screen_height: u16) -> Overlay {
        let text = format!("{} {}", self.variant.glyph(), self.message);
        let w = visible_width(&text) as u16;
        let (row, col) = match self.anchor {
            Anchor::TopLeft => (self.margin, self.margin),
            Anchor::TopRight => (self.margin, screen_width.saturating_sub(w + self.margin)),
            Anchor::BottomLeft => (screen_height.saturating_sub(1 + self.margin), self.margin),
            Anchor::BottomRight => (
                screen_height.saturating_sub(1 + self.margin),
                screen_width.saturating_sub(w + self.margin),
            ),
        };
        Overlay::new(text, row, col)
    }
}

/// Which side of the screen a drawer is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerSide {
    /// Anchored to the left edge.
    Left,
    /// Anchored to the right edge.
    Right,
}

/// A bordered panel spanning the full screen height.
pub struct Drawer<'a> {
    /// Drawer content.
    pub content: &'a str,
    /// Drawer width (excluding borders).
    pub width: u16,
    /// Which side to anchor to.
    pub side: DrawerSide,
}

impl<'a> Drawer<'a> {
    /// Render this drawer as an overlay within a screen of the given dimensions.
    pub fn overlay(&self, screen_width: u16, screen_height: u16) -> Overlay {
        let inner_w = self.width as usize;
        let inner_h = (screen_height as usize).saturating_sub(2);
        let mut lines = Vec::with_capacity(inner_h + 2);
        lines.push(format!("+{}+", "-".repeat(inner_w)));
        let content_lines: Vec<&str> = self.content.lines().collect();
        for i in 0..inner_h {
            let line = content_lines.get(i).copied().unwrap_or("");
            lines.push(format!("|{}|", pad_to_width(&clip_to_width(line, inner_w), inner_w)));
        }
        lines.push(format!("+{}+", "-".repeat(inner_w)));

        let box_width = inner_w as u16 + 2;
        let col = match self.side {
            DrawerSide::Left => 0,
            DrawerSide::Right => screen_width.saturating_sub(box_width),
        };
        Overlay::new(lines.join("\n"), 0, col)
    }
}
