//! Crossterm-backed `Runtime`/`IoPort`/`StylePort` implementations.
//!
//! Keys and mouse events are decoded from raw stdin bytes by
//! `bijou_core::input`, not by crossterm's own event parser — this
//! backend's job is raw mode, alternate-screen bytes, and ferrying
//! bytes and resize notifications across port boundaries.

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bijou_core::runtime::{BoxFuture, EnvSnapshot, Handle, IoPort, Runtime, StylePort};
use bijou_core::token::Token;

/// A background thread plus a stop flag it polls between iterations.
struct ThreadHandle {
    stop: Arc<AtomicBool>,
}

impl Handle for ThreadHandle {
    fn dispose(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Terminal size and TTY-ness, sampled once at startup.
pub struct CrosstermRuntime {
    env: EnvSnapshot,
    stdin_is_tty: bool,
    stdout_is_tty: bool,
}

impl CrosstermRuntime {
    /// Build a runtime descriptor from an already-resolved environment
    /// snapshot and TTY probes.
    pub fn new(env: EnvSnapshot, stdin_is_tty: bool, stdout_is_tty: bool) -> anyhow::Result<Self> {
        Ok(Self { env, stdin_is_tty, stdout_is_tty })
    }
}

impl Runtime for CrosstermRuntime {
    fn columns(&self) -> usize {
        crossterm::terminal::size().map(|(w, _)| w as usize).unwrap_or(80)
    }

    fn rows(&self) -> usize {
        crossterm::terminal::size().map(|(_, h)| h as usize).unwrap_or(24)
    }

    fn stdin_is_tty(&self) -> bool {
        self.stdin_is_tty
    }

    fn stdout_is_tty(&self) -> bool {
        self.stdout_is_tty
    }

    fn env(&self) -> &EnvSnapshot {
        &self.env
    }
}

/// Raw-mode terminal I/O. Enables raw mode on construction and
/// restores the terminal on drop, mirroring the workspace's
/// enable-on-enter/restore-on-drop backend pattern.
pub struct CrosstermIo {
    raw_mode: AtomicBool,
}

impl CrosstermIo {
    /// Enable raw mode and return a port ready to drive the screen
    /// lifecycle and input decoding.
    pub fn new() -> Self {
        let enabled = crossterm::terminal::enable_raw_mode().is_ok();
        Self { raw_mode: AtomicBool::new(enabled) }
    }
}

impl Default for CrosstermIo {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CrosstermIo {
    fn drop(&mut self) {
        if self.raw_mode.load(Ordering::SeqCst) {
            let _ = crossterm::terminal::disable_raw_mode();
        }
    }
}

impl IoPort for CrosstermIo {
    fn write(&self, bytes: &[u8]) {
        let mut stdout = std::io::stdout();
        let _ = stdout.write_all(bytes);
        let _ = stdout.flush();
    }

    fn question(&self, prompt: &str) -> BoxFuture<String> {
        let prompt = prompt.to_string();
        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let mut stdout = std::io::stdout();
                let _ = write!(stdout, "{prompt}");
                let _ = stdout.flush();
                let mut line = String::new();
                let _ = std::io::stdin().read_line(&mut line);
                line.trim_end_matches(['\n', '\r']).to_string()
            })
            .await
            .unwrap_or_default()
        })
    }

    fn raw_input(&self, callback: Box<dyn Fn(&[u8]) + Send + Sync>) -> Box<dyn Handle> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = Arc::clone(&stop);
        std::thread::spawn(move || {
            let mut stdin = std::io::stdin();
            let mut buf = [0u8; 64];
            while !stop_for_thread.load(Ordering::SeqCst) {
                match stdin.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => callback(&buf[..n]),
                }
            }
        });
        Box::new(ThreadHandle { stop })
    }

    fn on_resize(&self, callback: Box<dyn Fn(usize, usize) + Send + Sync>) -> Box<dyn Handle> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = Arc::clone(&stop);
        std::thread::spawn(move || {
            let mut last = crossterm::terminal::size().unwrap_or((80, 24));
            while !stop_for_thread.load(Ordering::SeqCst) {
                std::thread::sleep(std::time::Duration::from_millis(100));
                if let Ok(size) = crossterm::terminal::size() {
                    if size != last {
                        last = size;
                        callback(size.0 as usize, size.1 as usize);
                    }
                }
            }
        });
        Box::new(ThreadHandle { stop })
    }

    fn set_interval(&self, callback: Box<dyn Fn() + Send + Sync>, ms: u64) -> Box<dyn Handle> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_for_thread = Arc::clone(&stop);
        std::thread::spawn(move || {
            while !stop_for_thread.load(Ordering::SeqCst) {
                std::thread::sleep(std::time::Duration::from_millis(ms));
                if stop_for_thread.load(Ordering::SeqCst) {
                    break;
                }
                callback();
            }
        });
        Box::new(ThreadHandle { stop })
    }

    fn read_file(&self, path: &str) -> std::io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn read_dir(&self, path: &str) -> std::io::Result<Vec<String>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(path)? {
            entries.push(entry?.file_name().to_string_lossy().into_owned());
        }
        Ok(entries)
    }

    fn join_path(&self, base: &str, segment: &str) -> String {
        std::path::Path::new(base).join(segment).to_string_lossy().into_owned()
    }
}

/// True-color SGR styling, or a plain passthrough when stdout isn't a
/// TTY (`Pipe`/non-interactive modes already route around this, but a
/// direct caller gets a safe default either way).
pub struct CrosstermStyle {
    enabled: bool,
}

impl CrosstermStyle {
    /// Build a style port that emits SGR sequences only when `enabled`.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl StylePort for CrosstermStyle {
    fn styled(&self, token: Token, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        format!("{}{text}{}", token.sgr_truecolor(), bijou_core::token::SGR_RESET)
    }

    fn bold(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        format!("\x1b[1m{text}\x1b[22m")
    }
}
