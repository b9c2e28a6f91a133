//! A single timed keystroke: press, hold, release, pause.
//!
//! [`KeyAction`] is the unit the macro table is built from. Executing
//! one means sending a boot keyboard report with `keycode`+`modifier`,
//! holding it for `hold_ms`, sending an all-released report, then
//! pausing `release_ms` before the next action. Only one key is down at
//! a time; a combo like Win+R is a single action carrying both the
//! keycode and the modifier bit.

use crate::hid_codes::{key_name, mods};
use std::fmt;

/// One press/release step with explicit timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyAction {
    /// HID Keyboard/Keypad usage ID (0x00 = no key, modifier only).
    pub keycode: u8,
    /// HID modifier bitmask held together with the key.
    pub modifier: u8,
    /// How long the key stays pressed, in milliseconds.
    pub hold_ms: u64,
    /// Pause after the release report, in milliseconds.
    pub release_ms: u64,
}

impl KeyAction {
    /// Plain key with explicit timing.
    pub const fn timed(keycode: u8, hold_ms: u64, release_ms: u64) -> Self {
        Self {
            keycode,
            modifier: 0,
            hold_ms,
            release_ms,
        }
    }

    /// Modifier combo with explicit timing.
    pub const fn combo(modifier: u8, keycode: u8, hold_ms: u64, release_ms: u64) -> Self {
        Self {
            keycode,
            modifier,
            hold_ms,
            release_ms,
        }
    }
}

fn fmt_mods(modifier: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mod_names: &[(u8, &str)] = &[
        (mods::LCTRL, "Ctrl"),
        (mods::LSHIFT, "Shift"),
        (mods::LALT, "Alt"),
        (mods::LGUI, "GUI"),
        (mods::RCTRL, "RCtrl"),
        (mods::RSHIFT, "RShift"),
        (mods::RALT, "RAlt"),
        (mods::RGUI, "RGUI"),
    ];
    for &(bit, name) in mod_names {
        if modifier & bit != 0 {
            write!(f, "{name}+")?;
        }
    }
    Ok(())
}

impl fmt::Display for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_mods(self.modifier, f)?;
        write!(f, "{}", key_name(self.keycode))?;
        write!(f, "({}ms/{}ms)", self.hold_ms, self.release_ms)
    }
}
