//! USB HID Usage Table constants for the boot keyboard protocol.
//!
//! Keycodes follow the Keyboard/Keypad page (USB HID Usage Tables,
//! Section 10); modifiers are the bit positions of the first byte of a
//! standard 8-byte boot keyboard report.

/// HID modifier bitmask constants (first byte of the boot report,
/// usages 0xE0-0xE7).
pub mod mods {
    pub const LCTRL: u8 = 0x01;
    pub const LSHIFT: u8 = 0x02;
    pub const LALT: u8 = 0x04;
    pub const LGUI: u8 = 0x08;
    pub const RCTRL: u8 = 0x10;
    pub const RSHIFT: u8 = 0x20;
    pub const RALT: u8 = 0x40;
    pub const RGUI: u8 = 0x80;
}

/// Keyboard/Keypad page usage IDs for the keys the macro table uses.
pub mod keys {
    pub const NONE: u8 = 0x00;
    pub const A: u8 = 0x04;
    pub const C: u8 = 0x06;
    pub const D: u8 = 0x07;
    pub const E: u8 = 0x08;
    pub const H: u8 = 0x0B;
    pub const K: u8 = 0x0E;
    pub const N: u8 = 0x11;
    pub const O: u8 = 0x12;
    pub const P: u8 = 0x13;
    pub const R: u8 = 0x15;
    pub const S: u8 = 0x16;
    pub const T: u8 = 0x17;
    pub const U: u8 = 0x18;
    pub const W: u8 = 0x1A;
    pub const Y: u8 = 0x1C;
    pub const NUM_0: u8 = 0x27;
    pub const ENTER: u8 = 0x28;
    pub const SPACE: u8 = 0x2C;
    pub const SLASH: u8 = 0x38;
    pub const F4: u8 = 0x3D;
}

/// Get the name of a HID keyboard usage code.
pub fn key_name(code: u8) -> &'static str {
    match code {
        0x00 => "None",
        0x04 => "A", 0x05 => "B", 0x06 => "C", 0x07 => "D",
        0x08 => "E", 0x09 => "F", 0x0A => "G", 0x0B => "H",
        0x0C => "I", 0x0D => "J", 0x0E => "K", 0x0F => "L",
        0x10 => "M", 0x11 => "N", 0x12 => "O", 0x13 => "P",
        0x14 => "Q", 0x15 => "R", 0x16 => "S", 0x17 => "T",
        0x18 => "U", 0x19 => "V", 0x1A => "W", 0x1B => "X",
        0x1C => "Y", 0x1D => "Z",
        0x1E => "1", 0x1F => "2", 0x20 => "3", 0x21 => "4",
        0x22 => "5", 0x23 => "6", 0x24 => "7", 0x25 => "8",
        0x26 => "9", 0x27 => "0",
        0x28 => "Enter", 0x29 => "Escape", 0x2A => "Backspace",
        0x2B => "Tab", 0x2C => "Space", 0x2D => "-", 0x2E => "=",
        0x2F => "[", 0x30 => "]", 0x31 => "\\",
        0x33 => ";", 0x34 => "'", 0x35 => "`", 0x36 => ",",
        0x37 => ".", 0x38 => "/", 0x39 => "CapsLock",
        0x3A => "F1", 0x3B => "F2", 0x3C => "F3", 0x3D => "F4",
        0x3E => "F5", 0x3F => "F6", 0x40 => "F7", 0x41 => "F8",
        0x42 => "F9", 0x43 => "F10", 0x44 => "F11", 0x45 => "F12",
        0xE0 => "LCtrl", 0xE1 => "LShift", 0xE2 => "LAlt", 0xE3 => "LGUI",
        0xE4 => "RCtrl", 0xE5 => "RShift", 0xE6 => "RAlt", 0xE7 => "RGUI",
        _ => "?",
    }
}

/// Convert a character to a HID keycode.
/// Returns `(keycode, needs_shift)` or `None` if unsupported.
pub fn char_to_hid(ch: char) -> Option<(u8, bool)> {
    match ch {
        // Letters (a-z lowercase, A-Z needs shift)
        'a'..='z' => Some((0x04 + (ch as u8 - b'a'), false)),
        'A'..='Z' => Some((0x04 + (ch as u8 - b'A'), true)),
        // Numbers
        '1'..='9' => Some((0x1E + (ch as u8 - b'1'), false)),
        '0' => Some((0x27, false)),
        // Unshifted punctuation
        ' ' => Some((0x2C, false)),
        '-' => Some((0x2D, false)),
        '=' => Some((0x2E, false)),
        '[' => Some((0x2F, false)),
        ']' => Some((0x30, false)),
        '\\' => Some((0x31, false)),
        ';' => Some((0x33, false)),
        '\'' => Some((0x34, false)),
        '`' => Some((0x35, false)),
        ',' => Some((0x36, false)),
        '.' => Some((0x37, false)),
        '/' => Some((0x38, false)),
        '\n' => Some((0x28, false)), // Enter
        '\t' => Some((0x2B, false)), // Tab
        // Shifted punctuation
        '!' => Some((0x1E, true)),
        '@' => Some((0x1F, true)),
        '#' => Some((0x20, true)),
        '$' => Some((0x21, true)),
        '%' => Some((0x22, true)),
        '^' => Some((0x23, true)),
        '&' => Some((0x24, true)),
        '*' => Some((0x25, true)),
        '(' => Some((0x26, true)),
        ')' => Some((0x27, true)),
        '_' => Some((0x2D, true)),
        '+' => Some((0x2E, true)),
        ':' => Some((0x33, true)),
        '"' => Some((0x34, true)),
        '<' => Some((0x36, true)),
        '>' => Some((0x37, true)),
        '?' => Some((0x38, true)),
        _ => None,
    }
}
