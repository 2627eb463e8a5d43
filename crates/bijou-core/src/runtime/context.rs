//! The four ports the core depends on, and `OutputMode` detection.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use crate::token::Token;

/// A boxed, owned future, for the object-safe ports below.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// How the engine should render: full interactive control, a static
/// one-shot render, a plain pipe-safe stream, or a screen-reader
/// friendly degradation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Full alt-screen, cursor control, styled output.
    Interactive,
    /// One-shot render with styling, no alt-screen or cursor control.
    Static,
    /// No styling, safe for redirected stdout.
    Pipe,
    /// Textual degradation mode for screen readers.
    Accessible,
}

/// A read-only snapshot of the variables `OutputMode` detection and
/// theme selection consult. Built once per process; no component
/// consults the real environment directly.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Build a snapshot from the process's actual environment.
    pub fn from_process() -> Self {
        Self { vars: std::env::vars().collect() }
    }

    /// Build a snapshot from an explicit map, for tests.
    pub fn from_map(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    /// Look up a variable by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// True if the variable is defined, regardless of value.
    pub fn is_defined(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }
}

/// Resolve the output mode per the documented env-var precedence.
/// First match wins.
pub fn detect_output_mode(env: &EnvSnapshot, stdout_is_tty: bool) -> OutputMode {
    if env.get("BIJOU_ACCESSIBLE") == Some("1") {
        return OutputMode::Accessible;
    }
    if env.is_defined("NO_COLOR") {
        return OutputMode::Pipe;
    }
    if env.get("TERM") == Some("dumb") {
        return OutputMode::Pipe;
    }
    if !stdout_is_tty {
        return OutputMode::Pipe;
    }
    if env.is_defined("CI") {
        return OutputMode::Static;
    }
    OutputMode::Interactive
}

/// `columns`, `rows`, and TTY-ness of the two standard streams.
pub trait Runtime: Send + Sync {
    /// Terminal width in columns.
    fn columns(&self) -> usize;
    /// Terminal height in rows.
    fn rows(&self) -> usize;
    /// Whether stdin is attached to a TTY.
    fn stdin_is_tty(&self) -> bool;
    /// Whether stdout is attached to a TTY.
    fn stdout_is_tty(&self) -> bool;
    /// The environment snapshot this runtime was built from.
    fn env(&self) -> &EnvSnapshot;
}

/// A disposable subscription or timer. Dropping it does not by itself
/// release the resource; callers must call [`Handle::dispose`].
pub trait Handle: Send {
    /// Release the underlying resource (stop a timer, unsubscribe a
    /// callback).
    fn dispose(&mut self);
}

/// Terminal I/O: writes, prompts, and subscriptions to raw input,
/// resize, and timers. Implementations route every control sequence
/// and poll through here; nothing touches a global stdout/stdin.
pub trait IoPort: Send + Sync {
    /// Write raw bytes to the terminal.
    fn write(&self, bytes: &[u8]);

    /// Prompt for a line of input, resolving once the user answers.
    fn question(&self, prompt: &str) -> BoxFuture<String>;

    /// Subscribe to raw input bytes as they arrive.
    fn raw_input(&self, callback: Box<dyn Fn(&[u8]) + Send + Sync>) -> Box<dyn Handle>;

    /// Subscribe to terminal resize events (columns, rows).
    fn on_resize(&self, callback: Box<dyn Fn(usize, usize) + Send + Sync>) -> Box<dyn Handle>;

    /// Install a recurring timer, firing every `ms` milliseconds.
    fn set_interval(&self, callback: Box<dyn Fn() + Send + Sync>, ms: u64) -> Box<dyn Handle>;

    /// Read a filesystem file as bytes, for the logo loader.
    fn read_file(&self, path: &str) -> std::io::Result<Vec<u8>>;

    /// List a directory's entries, for the logo loader.
    fn read_dir(&self, path: &str) -> std::io::Result<Vec<String>>;

    /// Join two path segments using the host's path conventions.
    fn join_path(&self, base: &str, segment: &str) -> String;
}

/// Converts a [`Token`] into styled output text. Implementations may
/// downsample 24-bit color to a narrower palette; a no-color
/// implementation returns text unchanged but still applies bold.
pub trait StylePort: Send + Sync {
    /// Render `text` styled with `token`.
    fn styled(&self, token: Token, text: &str) -> String;
    /// Render `text` in bold, independent of color.
    fn bold(&self, text: &str) -> String;
}

/// Named dictionaries of tokens (status, semantic, border, ui colors)
/// plus the effective no-color flag.
pub trait ThemePort: Send + Sync {
    /// Look up a named token (e.g. `"status.error"`).
    fn ink(&self, name: &str) -> Option<Token>;
    /// True if this theme strips color (but keeps modifiers/glyphs).
    fn no_color(&self) -> bool;
}

/// The composite object the TEA runtime and components are built
/// against: runtime descriptor, I/O, style, theme, and the resolved
/// output mode.
pub struct Context {
    /// Runtime descriptor port.
    pub runtime: Box<dyn Runtime>,
    /// I/O port.
    pub io: Box<dyn IoPort>,
    /// Style port.
    pub style: Box<dyn StylePort>,
    /// Theme port.
    pub theme: Box<dyn ThemePort>,
    /// The resolved output mode for this session.
    pub output_mode: OutputMode,
}

impl Context {
    /// Build a context, resolving `output_mode` from the runtime's
    /// environment snapshot and `stdout_is_tty`.
    pub fn new(
        runtime: Box<dyn Runtime>,
        io: Box<dyn IoPort>,
        style: Box<dyn StylePort>,
        theme: Box<dyn ThemePort>,
    ) -> Self {
        let output_mode = detect_output_mode(runtime.env(), runtime.stdout_is_tty());
        Self { runtime, io, style, theme, output_mode }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvSnapshot {
        EnvSnapshot::from_map(pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect())
    }

    #[test]
    fn accessible_env_wins_over_everything() {
        let e = env(&[("BIJOU_ACCESSIBLE", "1"), ("NO_COLOR", "1")]);
        assert_eq!(detect_output_mode(&e, true), OutputMode::Accessible);
    }

    #[test]
    fn no_color_forces_pipe() {
        let e = env(&[("NO_COLOR", "")]);
        assert_eq!(detect_output_mode(&e, true), OutputMode::Pipe);
    }

    #[test]
    fn dumb_term_forces_pipe() {
        let e = env(&[("TERM", "dumb")]);
        assert_eq!(detect_output_mode(&e, true), OutputMode::Pipe);
    }

    #[test]
    fn non_tty_stdout_forces_pipe() {
        let e = env(&[]);
        assert_eq!(detect_output_mode(&e, false), OutputMode::Pipe);
    }

    #[test]
    fn ci_env_forces_static() {
        let e = env(&[("CI", "true")]);
        assert_eq!(detect_output_mode(&e, true), OutputMode::Static);
    }

    #[test]
    fn default_is_interactive() {
        let e = env(&[]);
        assert_eq!(detect_output_mode(&e, true), OutputMode::Interactive);
    }
}
