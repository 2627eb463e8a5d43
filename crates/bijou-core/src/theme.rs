//! Built-in theme presets and `BIJOU_THEME` selection.
//!
//! Named color/token dictionaries for components are an external
//! collaborator per the core's scope; what lives here is the minimal
//! built-in default (and a high-contrast variant) that selection falls
//! back to, plus the `no_color` interaction `NO_COLOR` drives.

use std::collections::HashMap;
use crate::runtime::{EnvSnapshot, ThemePort};
use crate::token::{Modifiers, Token};

/// A named dictionary of tokens, implementing [`ThemePort`].
pub struct Theme {
    name: &'static str,
    tokens: HashMap<&'static str, Token>,
    no_color: bool,
}

impl Theme {
    /// The name this theme was built under ("default", "high-contrast").
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The default palette: muted status colors, no extreme contrast.
    pub fn default_theme() -> Self {
        let mut tokens = HashMap::new();
        tokens.insert("status.success", Token::rgb(87, 170, 99));
        tokens.insert("status.warning", Token::rgb(212, 163, 52));
        tokens.insert("status.error", Token::rgb(196, 71, 71));
        tokens.insert("status.info", Token::rgb(82, 139, 196));
        tokens.insert("semantic.primary", Token::rgb(99, 132, 222));
        tokens.insert("semantic.muted", Token::rgb(128, 128, 128));
        tokens.insert("border.default", Token::rgb(90, 90, 90));
        tokens.insert("ui.selected", Token { modifiers: Modifiers::INVERSE, ..Token::rgb(255, 255, 255) });
        Self { name: "default", tokens, no_color: false }
    }

    /// A high-contrast palette: saturated colors, bold emphasis.
    pub fn high_contrast() -> Self {
        let bold = |t: Token| Token { modifiers: Modifiers::BOLD, ..t };
        let mut tokens = HashMap::new();
        tokens.insert("status.success", bold(Token::rgb(0, 255, 0)));
        tokens.insert("status.warning", bold(Token::rgb(255, 255, 0)));
        tokens.insert("status.error", bold(Token::rgb(255, 0, 0)));
        tokens.insert("status.info", bold(Token::rgb(0, 200, 255)));
        tokens.insert("semantic.primary", bold(Token::rgb(255, 255, 255)));
        tokens.insert("semantic.muted", Token::rgb(200, 200, 200));
        tokens.insert("border.default", bold(Token::rgb(255, 255, 255)));
        tokens.insert("ui.selected", Token { modifiers: Modifiers::INVERSE | Modifiers::BOLD, ..Token::rgb(255, 255, 255) });
        Self { name: "high-contrast", tokens, no_color: false }
    }

    /// Strip color from this theme's resolution, keeping modifiers.
    #[must_use]
    pub fn strip_color(mut self) -> Self {
        self.no_color = true;
        self
    }

    /// Resolve `BIJOU_THEME` against the known presets, falling back
    /// to [`Theme::default_theme`] with a one-time warning (emitted
    /// through the given sink) on an unrecognized name. `NO_COLOR`
    /// strips color from the result.
    pub fn select(env: &EnvSnapshot, warn: impl FnOnce(&str)) -> Self {
        let mut theme = match env.get("BIJOU_THEME") {
            None | Some("default") => Self::default_theme(),
            Some("high-contrast") => Self::high_contrast(),
            Some(other) => {
                warn(&format!("unknown theme {other:?}, falling back to default"));
                Self::default_theme()
            }
        };
        if env.is_defined("NO_COLOR") {
            theme = theme.strip_color();
        }
        theme
    }
}

impl ThemePort for Theme {
    fn ink(&self, name: &str) -> Option<Token> {
        if self.no_color {
            return None;
        }
        self.tokens.get(name).copied()
    }

    fn no_color(&self) -> bool {
        self.no_color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvSnapshot {
        EnvSnapshot::from_map(pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect())
    }

    #[test]
    fn unknown_theme_name_falls_back_to_default_with_one_warning() {
        let mut warnings = Vec::new();
        let theme = Theme::select(&env(&[("BIJOU_THEME", "nonexistent")]), |msg| warnings.push(msg.to_string()));
        assert_eq!(theme.name(), "default");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn known_theme_name_selects_without_warning() {
        let mut warnings = Vec::new();
        let theme = Theme::select(&env(&[("BIJOU_THEME", "high-contrast")]), |msg| warnings.push(msg.to_string()));
        assert_eq!(theme.name(), "high-contrast");
        assert!(warnings.is_empty());
    }

    #[test]
    fn no_color_env_strips_ink_but_not_modifiers() {
        let theme = Theme::select(&env(&[("NO_COLOR", "1")]), |_| {});
        assert!(theme.no_color());
        assert_eq!(theme.ink("status.error"), None);
    }

    #[test]
    fn default_theme_resolves_known_tokens() {
        let theme = Theme::default_theme();
        assert!(theme.ink("status.error").is_some());
        assert_eq!(theme.ink("nonexistent.token"), None);
    }
}
