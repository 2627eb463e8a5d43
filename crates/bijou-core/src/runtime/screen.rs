//! Screen lifecycle control sequences and differential frame rendering.
//!
//! Every byte is written verbatim through the [`IoPort`](super::context::IoPort);
//! none of this goes through a terminal crate's own command types, so
//! the exact sequence is guaranteed regardless of backend.

use crate::runtime::context::{BoxFuture, Handle, IoPort};

const ENTER_ALT_SCREEN: &[u8] = b"\x1b[?1049h";
const HIDE_CURSOR: &[u8] = b"\x1b[?25l";
const DISABLE_WRAP: &[u8] = b"\x1b[?7l";
const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
const CURSOR_HOME: &[u8] = b"\x1b[H";
const SHOW_CURSOR: &[u8] = b"\x1b[?25h";
const ENABLE_WRAP: &[u8] = b"\x1b[?7h";
const EXIT_ALT_SCREEN: &[u8] = b"\x1b[?1049l";
const ERASE_TO_END_OF_LINE: &[u8] = b"\x1b[K";
const ERASE_TO_END_OF_SCREEN: &[u8] = b"\x1b[J";

/// Enter the alternate screen, hide the cursor, disable line wrap,
/// clear, and home the cursor.
pub fn enter(io: &dyn IoPort) {
    io.write(ENTER_ALT_SCREEN);
    io.write(HIDE_CURSOR);
    io.write(DISABLE_WRAP);
    io.write(CLEAR_SCREEN);
    io.write(CURSOR_HOME);
}

/// Restore cursor visibility and wrap, then leave the alternate screen.
pub fn exit(io: &dyn IoPort) {
    io.write(SHOW_CURSOR);
    io.write(ENABLE_WRAP);
    io.write(EXIT_ALT_SCREEN);
}

/// Clear the screen and home the cursor.
pub fn clear(io: &dyn IoPort) {
    io.write(CLEAR_SCREEN);
    io.write(CURSOR_HOME);
}

/// Render a frame: home the cursor, then for each line of `view`
/// write the line followed by erase-to-end-of-line and a newline,
/// then erase-to-end-of-screen. Erasing per line and at the end
/// guarantees a shorter frame never leaves residue from a longer one.
pub fn render_frame(io: &dyn IoPort, view: &str) {
    io.write(CURSOR_HOME);
    let mut lines = view.split('\n').peekable();
    while let Some(line) = lines.next() {
        io.write(line.as_bytes());
        io.write(ERASE_TO_END_OF_LINE);
        if lines.peek().is_some() {
            io.write(b"\n");
        }
    }
    io.write(ERASE_TO_END_OF_SCREEN);
}
