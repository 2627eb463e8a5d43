//! Pure SGR mouse protocol decoding.

/// Which mouse button (or none, for scroll/motion) produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left button.
    Left,
    /// Middle button.
    Middle,
    /// Right button.
    Right,
    /// No button (scroll events, or an unrecognized bit pattern).
    None,
}

/// The action a mouse event represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseAction {
    /// A button was pressed.
    Press,
    /// A button was released.
    Release,
    /// The pointer moved while a button was held.
    Drag,
    /// The wheel scrolled up.
    ScrollUp,
    /// The wheel scrolled down.
    ScrollDown,
}

/// A decoded mouse event, 0-based coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseMsg {
    /// The button involved, or `None` for scroll events.
    pub button: MouseButton,
    /// The action.
    pub action: MouseAction,
    /// 0-based column.
    pub col: u16,
    /// 0-based row.
    pub row: u16,
    /// True if Shift was held.
    pub shift: bool,
    /// True if Alt was held.
    pub alt: bool,
    /// True if Ctrl was held.
    pub ctrl: bool,
}

enum Suffix {
    Press,
    Release,
}

/// Decode an SGR mouse escape sequence (`ESC [ < b ; x ; y ; M|m`).
/// Coordinates are 1-based on the wire and converted to 0-based; any
/// coordinate component of `0` is rejected as malformed (`None`).
pub fn parse_mouse(raw: &[u8]) -> Option<MouseMsg> {
    let s = std::str::from_utf8(raw).ok()?;
    let body = s.strip_prefix("\x1b[<")?;
    let (params, suffix) = if let Some(p) = body.strip_suffix('M') {
        (p, Suffix::Press)
    } else if let Some(p) = body.strip_suffix('m') {
        (p, Suffix::Release)
    } else {
        return None;
    };

    let mut parts = params.split(';');
    let b: u32 = parts.next()?.parse().ok()?;
    let x: u32 = parts.next()?.parse().ok()?;
    let y: u32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    if x == 0 || y == 0 {
        return None;
    }

    let shift = b & 0b0000_0100 != 0;
    let alt = b & 0b0000_1000 != 0;
    let ctrl = b & 0b0001_0000 != 0;
    let is_motion = b & 0b0010_0000 != 0;
    let is_scroll = b & 0b0100_0000 != 0;

    let (button, action) = if is_scroll {
        let action = if b & 1 == 0 { MouseAction::ScrollUp } else { MouseAction::ScrollDown };
        (MouseButton::None, action)
    } else {
        let button = match b & 0b11 {
            0 => MouseButton::Left,
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::None,
        };
        let action = match suffix {
            Suffix::Release => MouseAction::Release,
            Suffix::Press if is_motion => MouseAction::Drag,
            Suffix::Press => MouseAction::Press,
        };
        (button, action)
    };

    Some(MouseMsg {
        button,
        action,
        col: (x - 1) as u16,
        row: (y - 1) as u16,
        shift,
        alt,
        ctrl,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_press() {
        let m = parse_mouse(b"\x1b[<0;10;20M").expect("should decode");
        assert_eq!(m.button, MouseButton::Left);
        assert_eq!(m.action, MouseAction::Press);
        assert_eq!(m.col, 9);
        assert_eq!(m.row, 19);
        assert!(!m.shift && !m.alt && !m.ctrl);
    }

    #[test]
    fn scroll_up_has_no_button() {
        let m = parse_mouse(b"\x1b[<64;10;20M").expect("should decode");
        assert_eq!(m.action, MouseAction::ScrollUp);
        assert_eq!(m.button, MouseButton::None);
    }

    #[test]
    fn scroll_down() {
        let m = parse_mouse(b"\x1b[<65;10;20M").expect("should decode");
        assert_eq!(m.action, MouseAction::ScrollDown);
    }

    #[test]
    fn zero_coordinate_rejected() {
        assert!(parse_mouse(b"\x1b[<0;0;1M").is_none());
    }

    #[test]
    fn release_suffix() {
        let m = parse_mouse(b"\x1b[<0;10;20m").expect("should decode");
        assert_eq!(m.action, MouseAction::Release);
    }

    #[test]
    fn drag_motion_bit() {
        let m = parse_mouse(b"\x1b[<32;10;20M").expect("should decode");
        assert_eq!(m.action, MouseAction::Drag);
    }

    #[test]
    fn modifier_bits() {
        let m = parse_mouse(b"\x1b[<28;10;20M").expect("should decode"); // 4+8+16
        assert!(m.shift && m.alt && m.ctrl);
    }

    #[test]
    fn malformed_prefix_rejected() {
        assert!(parse_mouse(b"not a mouse event").is_none());
    }
}
