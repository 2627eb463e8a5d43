//! Grapheme-aware text measurement and ANSI SGR-preserving string ops.
//!
//! Width measurement counts grapheme clusters, not UTF-16 code units or
//! bytes, so supplementary-plane characters behave correctly. SGR
//! (`ESC [ ... m`) sequences are preserved across clipping so that open
//! color/attribute runs survive truncation, closed by an appended reset
//! when necessary.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const ESC: char = '\u{1b}';

/// One grapheme cluster together with the bytes that produced it and its
/// display width in terminal columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grapheme<'a> {
    /// The cluster's source text.
    pub text: &'a str,
    /// Display width in columns (0 for combining marks, 1 ambiguous, 2 wide).
    pub width: usize,
}

/// Segment a string into grapheme clusters with their display widths,
/// skipping over embedded SGR escape sequences (which contribute no
/// width and are not split).
pub fn segment_graphemes(s: &str) -> Vec<Grapheme<'_>> {
    let mut out = Vec::new();
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if let Some(len) = sgr_len_at(s, i) {
            i += len;
            continue;
        }
        // Find the next SGR start (if any) to bound this grapheme-segmentable run.
        let run_end = find_next_sgr_start(s, i).unwrap_or(s.len());
        let run = &s[i..run_end];
        for g in run.grapheme_indices(true) {
            let (_, cluster) = g;
            out.push(Grapheme {
                text: cluster,
                width: UnicodeWidthStr::width(cluster),
            });
        }
        i = run_end;
    }
    out
}

/// Returns the byte length of an SGR escape sequence (`ESC [ ... m`)
/// starting at byte offset `at`, or `None` if one doesn't start there.
fn sgr_len_at(s: &str, at: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.get(at).copied()? != ESC as u8 {
        return None;
    }
    if bytes.get(at + 1).copied()? != b'[' {
        return None;
    }
    let mut j = at + 2;
    while j < bytes.len() {
        let c = bytes[j];
        if c == b'm' {
            return Some(j + 1 - at);
        }
        // Parameter bytes are digits and ';'. Anything else means this
        // wasn't a well-formed SGR sequence; stop scanning.
        if !(c.is_ascii_digit() || c == b';') {
            return None;
        }
        j += 1;
    }
    None
}

fn find_next_sgr_start(s: &str, from: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == ESC as u8 && sgr_len_at(s, i).is_some() {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Display width of `s` in terminal columns, ignoring SGR escapes.
pub fn visible_width(s: &str) -> usize {
    segment_graphemes(s).iter().map(|g| g.width).sum()
}

/// Remove every `ESC [ ... m` SGR sequence from `s`.
pub fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        if let Some(len) = sgr_len_at(s, i) {
            i += len;
        } else {
            let ch_len = s[i..].chars().next().map(char::len_utf8).unwrap_or(1);
            out.push_str(&s[i..i + ch_len]);
            i += ch_len;
        }
    }
    out
}

/// Return the longest prefix of `s` whose visible width is `<= n`,
/// preserving any SGR sequences encountered along the way. If an SGR
/// sequence other than a bare reset (`ESC[0m` / `ESC[m`) was opened and
/// not subsequently reset within the returned prefix, a reset is
/// appended.
pub fn clip_to_width(s: &str, n: usize) -> String {
    let mut out = String::new();
    let mut width = 0usize;
    let mut open_attr = false;
    let bytes = s.as_bytes();
    let mut i = 0;
    'outer: while i < bytes.len() {
        if let Some(len) = sgr_len_at(s, i) {
            let seq = &s[i..i + len];
            out.push_str(seq);
            open_attr = !is_reset_sequence(seq);
            i += len;
            continue;
        }
        // Grapheme-segment the run up to the next SGR sequence so a
        // multi-codepoint cluster (ZWJ emoji, flag pair, combining mark)
        // is kept or dropped whole rather than cleaved mid-cluster.
        let run_end = find_next_sgr_start(s, i).unwrap_or(s.len());
        let run = &s[i..run_end];
        for cluster in run.graphemes(true) {
            let cluster_width = UnicodeWidthStr::width(cluster);
            if width + cluster_width > n {
                break 'outer;
            }
            out.push_str(cluster);
            width += cluster_width;
        }
        i = run_end;
    }
    if open_attr {
        out.push_str("\x1b[0m");
    }
    out
}

fn is_reset_sequence(seq: &str) -> bool {
    matches!(seq, "\x1b[0m" | "\x1b[m")
}

/// Right-pad `s` with spaces until its visible width is exactly `n`
/// (no-op if `s` is already at least that wide).
pub fn pad_to_width(s: &str, n: usize) -> String {
    let w = visible_width(s);
    if w >= n {
        s.to_string()
    } else {
        let mut out = String::with_capacity(s.len() + (n - w));
        out.push_str(s);
        out.push_str(&" ".repeat(n - w));
        out
    }
}

/// Pad `s` on the left with spaces until its visible width is exactly `n`.
pub fn pad_left_to_width(s: &str, n: usize) -> String {
    let w = visible_width(s);
    if w >= n {
        s.to_string()
    } else {
        format!("{}{}", " ".repeat(n - w), s)
    }
}

/// Center `s` within a field of width `n`, padding left/right with spaces.
/// When the padding is odd, the extra space goes on the right.
pub fn pad_center_to_width(s: &str, n: usize) -> String {
    let w = visible_width(s);
    if w >= n {
        return s.to_string();
    }
    let total_pad = n - w;
    let left = total_pad / 2;
    let right = total_pad - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

/// Clip or pad `s` to exactly `n` visible columns, per the given alignment.
pub fn fit_to_width(s: &str, n: usize, align: crate::flex::Align) -> String {
    let clipped = clip_to_width(s, n);
    match align {
        crate::flex::Align::Start => pad_to_width(&clipped, n),
        crate::flex::Align::End => pad_left_to_width(&clipped, n),
        crate::flex::Align::Center => pad_center_to_width(&clipped, n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_ascii() {
        assert_eq!(visible_width("Hello"), 5);
    }

    #[test]
    fn width_wide_cjk() {
        assert_eq!(visible_width("\u{4F60}\u{597D}"), 4);
    }

    #[test]
    fn width_ignores_sgr() {
        assert_eq!(visible_width("\x1b[31mHello\x1b[0m"), 5);
    }

    #[test]
    fn width_combining_mark_is_zero() {
        // 'e' + combining acute accent
        let s = "e\u{0301}";
        assert_eq!(visible_width(s), 1);
    }

    #[test]
    fn strip_ansi_removes_sgr_only() {
        assert_eq!(strip_ansi("\x1b[1;31mred\x1b[0m plain"), "red plain");
    }

    #[test]
    fn clip_shorter_than_width_unchanged() {
        assert_eq!(clip_to_width("hi", 10), "hi");
    }

    #[test]
    fn clip_truncates_and_preserves_open_sgr_with_reset() {
        let input = "\x1b[31mHello World";
        let out = clip_to_width(input, 5);
        assert_eq!(out, "\x1b[31mHello\x1b[0m");
        assert_eq!(visible_width(&out), 5);
    }

    #[test]
    fn clip_does_not_append_reset_when_already_closed() {
        let input = "\x1b[31mHi\x1b[0m there";
        let out = clip_to_width(input, 2);
        assert_eq!(out, "\x1b[31mHi\x1b[0m");
    }

    #[test]
    fn clip_zero_width() {
        assert_eq!(clip_to_width("hello", 0), "");
    }

    #[test]
    fn pad_to_width_right_pads() {
        assert_eq!(pad_to_width("hi", 5), "hi   ");
    }

    #[test]
    fn pad_left_to_width_left_pads() {
        assert_eq!(pad_left_to_width("hi", 5), "   hi");
    }

    #[test]
    fn pad_center_splits_extra_to_the_right() {
        assert_eq!(pad_center_to_width("hi", 5), " hi  ");
    }

    #[test]
    fn fit_to_width_clips_then_pads() {
        let out = fit_to_width("hello world", 5, crate::flex::Align::Start);
        assert_eq!(out, "hello");
        let out2 = fit_to_width("hi", 5, crate::flex::Align::Start);
        assert_eq!(out2, "hi   ");
    }
}
