//! Linux evdev keycodes (linux/input-event-codes.h) and the US-layout
//! character mapping used by the injection backends. X11 keycodes are these
//! values plus 8 on stock Xorg setups.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub keycode: u32,
    pub shift: bool,
}

pub const KEY_BACKSPACE: u32 = 14;
pub const KEY_TAB: u32 = 15;
pub const KEY_ENTER: u32 = 28;
pub const KEY_LEFTCTRL: u32 = 29;
pub const KEY_LEFTSHIFT: u32 = 42;
pub const KEY_RIGHTSHIFT: u32 = 54;
pub const KEY_LEFTALT: u32 = 56;
pub const KEY_SPACE: u32 = 57;
pub const KEY_RIGHTCTRL: u32 = 97;
pub const KEY_RIGHTALT: u32 = 100;
pub const KEY_LEFTMETA: u32 = 125;

const ROW_DIGITS: &[u8] = b"1234567890";
const ROW_DIGITS_SHIFTED: &[u8] = b"!@#$%^&*()";
const ROW_TOP: &[u8] = b"qwertyuiop";
const ROW_HOME: &[u8] = b"asdfghjkl";
const ROW_BOTTOM: &[u8] = b"zxcvbnm";

const KEY_1: u32 = 2; // .. KEY_0 = 11, contiguous
const KEY_Q: u32 = 16; // .. KEY_P = 25, contiguous
const KEY_A: u32 = 30; // .. KEY_L = 38, contiguous
const KEY_Z: u32 = 44; // .. KEY_M = 50, contiguous

fn row_keycode(row: &[u8], base: u32, c: char) -> Option<u32> {
    row.iter()
        .position(|&b| b as char == c)
        .map(|idx| base + idx as u32)
}

/// Keystroke producing `c` on a US QWERTY keymap. `None` for characters
/// outside the injectable set (locale-accurate mapping for every layout is
/// out of scope; non-QWERTY typo *geometry* is handled by `KeyboardLayout`).
pub fn keystroke_for_char(c: char) -> Option<KeyStroke> {
    let unshifted = |keycode| Some(KeyStroke { keycode, shift: false });
    let shifted = |keycode| Some(KeyStroke { keycode, shift: true });

    if c.is_ascii_lowercase() {
        let code = row_keycode(ROW_TOP, KEY_Q, c)
            .or_else(|| row_keycode(ROW_HOME, KEY_A, c))
            .or_else(|| row_keycode(ROW_BOTTOM, KEY_Z, c))?;
        return unshifted(code);
    }
    if c.is_ascii_uppercase() {
        let lower = c.to_ascii_lowercase();
        let code = row_keycode(ROW_TOP, KEY_Q, lower)
            .or_else(|| row_keycode(ROW_HOME, KEY_A, lower))
            .or_else(|| row_keycode(ROW_BOTTOM, KEY_Z, lower))?;
        return shifted(code);
    }
    if c.is_ascii_digit() {
        return unshifted(row_keycode(ROW_DIGITS, KEY_1, c)?);
    }
    if let Some(code) = row_keycode(ROW_DIGITS_SHIFTED, KEY_1, c) {
        return shifted(code);
    }

    match c {
        ' ' => unshifted(KEY_SPACE),
        '\n' => unshifted(KEY_ENTER),
        '\t' => unshifted(KEY_TAB),
        '-' => unshifted(12),
        '_' => shifted(12),
        '=' => unshifted(13),
        '+' => shifted(13),
        '[' => unshifted(26),
        '{' => shifted(26),
        ']' => unshifted(27),
        '}' => shifted(27),
        ';' => unshifted(39),
        ':' => shifted(39),
        '\'' => unshifted(40),
        '"' => shifted(40),
        '`' => unshifted(41),
        '~' => shifted(41),
        '\\' => unshifted(43),
        '|' => shifted(43),
        ',' => unshifted(51),
        '<' => shifted(51),
        '.' => unshifted(52),
        '>' => shifted(52),
        '/' => unshifted(53),
        '?' => shifted(53),
        _ => None,
    }
}
