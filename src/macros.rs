//! The keystroke macro table.
//!
//! One constant, ordered [`KeyAction`] sequence per host command that is
//! delivered as typed input. The restart/shutdown sequences drive the
//! Windows Run dialog (`Win+R`, the `shutdown` command line, `Enter`);
//! the application-relaunch sequences close the foreground window with
//! `Alt+F4`, open search, type the application name and confirm.
//!
//! Timings are part of the contract: the Run dialog needs the longer
//! 300 ms pause after `Win+R` before it accepts input, and command
//! characters are paced at 100 ms hold / 50 ms release so slow hosts do
//! not drop keystrokes.

use crate::hid_codes::{keys, mods};
use crate::key_action::KeyAction;

/// A macro is a fixed, ordered keystroke sequence.
pub type Macro = &'static [KeyAction];

/// Hold/release pacing for run-dialog command characters.
const CMD: (u64, u64) = (100, 50);
/// Hold/release pacing for application-relaunch gestures.
const APP: (u64, u64) = (100, 100);

const fn cmd_tap(keycode: u8) -> KeyAction {
    KeyAction::timed(keycode, CMD.0, CMD.1)
}

const fn app_tap(keycode: u8) -> KeyAction {
    KeyAction::timed(keycode, APP.0, APP.1)
}

/// `Win+R`, `shutdown /r /t 0`, `Enter`.
pub static RESTART_PC: Macro = &[
    KeyAction::combo(mods::LGUI, keys::R, 100, 300), // open Run dialog
    cmd_tap(keys::S),
    cmd_tap(keys::H),
    cmd_tap(keys::U),
    cmd_tap(keys::T),
    cmd_tap(keys::D),
    cmd_tap(keys::O),
    cmd_tap(keys::W),
    cmd_tap(keys::N),
    cmd_tap(keys::SPACE),
    cmd_tap(keys::SLASH),
    cmd_tap(keys::R),
    cmd_tap(keys::SPACE),
    cmd_tap(keys::SLASH),
    cmd_tap(keys::T),
    cmd_tap(keys::SPACE),
    cmd_tap(keys::NUM_0),
    cmd_tap(keys::ENTER),
];

/// `Win+R`, `shutdown /s /t 0`, `Enter`.
pub static SHUTDOWN_PC: Macro = &[
    KeyAction::combo(mods::LGUI, keys::R, 100, 300), // open Run dialog
    cmd_tap(keys::S),
    cmd_tap(keys::H),
    cmd_tap(keys::U),
    cmd_tap(keys::T),
    cmd_tap(keys::D),
    cmd_tap(keys::O),
    cmd_tap(keys::W),
    cmd_tap(keys::N),
    cmd_tap(keys::SPACE),
    cmd_tap(keys::SLASH),
    cmd_tap(keys::S),
    cmd_tap(keys::SPACE),
    cmd_tap(keys::SLASH),
    cmd_tap(keys::T),
    cmd_tap(keys::SPACE),
    cmd_tap(keys::NUM_0),
    cmd_tap(keys::ENTER),
];

/// `Alt+F4`, search, `parsec`, `Enter`.
pub static RESTART_PARSEC: Macro = &[
    KeyAction::combo(mods::LALT, keys::F4, APP.0, APP.1), // close foreground window
    KeyAction::combo(mods::LGUI, keys::NONE, APP.0, APP.1), // open search
    app_tap(keys::P),
    app_tap(keys::A),
    app_tap(keys::R),
    app_tap(keys::S),
    app_tap(keys::E),
    app_tap(keys::C),
    app_tap(keys::ENTER),
];

/// `Alt+F4`, search, `anydesk`, `Enter`.
pub static RESTART_ANYDESK: Macro = &[
    KeyAction::combo(mods::LALT, keys::F4, APP.0, APP.1), // close foreground window
    KeyAction::combo(mods::LGUI, keys::NONE, APP.0, APP.1), // open search
    app_tap(keys::A),
    app_tap(keys::N),
    app_tap(keys::Y),
    app_tap(keys::D),
    app_tap(keys::E),
    app_tap(keys::S),
    app_tap(keys::K),
    app_tap(keys::ENTER),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid_codes::char_to_hid;

    /// Map the plain taps of a run-dialog macro back to the text they
    /// type (skipping the leading combo and trailing Enter).
    fn typed_text(seq: Macro) -> Vec<u8> {
        seq[1..seq.len() - 1].iter().map(|a| a.keycode).collect()
    }

    fn expected_codes(text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| {
                let (code, shift) = char_to_hid(c).unwrap();
                assert!(!shift, "command characters must be unshifted");
                code
            })
            .collect()
    }

    #[test]
    fn restart_types_shutdown_r() {
        assert_eq!(typed_text(RESTART_PC), expected_codes("shutdown /r /t 0"));
    }

    #[test]
    fn shutdown_types_shutdown_s() {
        assert_eq!(typed_text(SHUTDOWN_PC), expected_codes("shutdown /s /t 0"));
    }

    #[test]
    fn run_dialog_macros_start_with_win_r() {
        for seq in [RESTART_PC, SHUTDOWN_PC] {
            let first = seq[0];
            assert_eq!(first.modifier, mods::LGUI);
            assert_eq!(first.keycode, keys::R);
            assert_eq!((first.hold_ms, first.release_ms), (100, 300));
        }
    }

    #[test]
    fn run_dialog_macros_end_with_enter() {
        for seq in [RESTART_PC, SHUTDOWN_PC] {
            let last = seq[seq.len() - 1];
            assert_eq!(last.keycode, keys::ENTER);
            assert_eq!((last.hold_ms, last.release_ms), (100, 50));
        }
    }

    #[test]
    fn run_dialog_macros_are_18_actions() {
        // Win+R + 16 command characters + Enter
        assert_eq!(RESTART_PC.len(), 18);
        assert_eq!(SHUTDOWN_PC.len(), 18);
    }

    #[test]
    fn restart_and_shutdown_differ_only_in_the_switch() {
        let diff: Vec<usize> = RESTART_PC
            .iter()
            .zip(SHUTDOWN_PC.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(diff, vec![11]); // the '/r' vs '/s' character
        assert_eq!(RESTART_PC[11].keycode, keys::R);
        assert_eq!(SHUTDOWN_PC[11].keycode, keys::S);
    }

    #[test]
    fn app_macros_spell_their_names() {
        let parsec: Vec<u8> = RESTART_PARSEC[2..RESTART_PARSEC.len() - 1]
            .iter()
            .map(|a| a.keycode)
            .collect();
        assert_eq!(parsec, expected_codes("parsec"));

        let anydesk: Vec<u8> = RESTART_ANYDESK[2..RESTART_ANYDESK.len() - 1]
            .iter()
            .map(|a| a.keycode)
            .collect();
        assert_eq!(anydesk, expected_codes("anydesk"));
    }

    #[test]
    fn app_macros_open_with_close_then_search() {
        for seq in [RESTART_PARSEC, RESTART_ANYDESK] {
            assert_eq!(seq[0].modifier, mods::LALT);
            assert_eq!(seq[0].keycode, keys::F4);
            assert_eq!(seq[1].modifier, mods::LGUI);
            assert_eq!(seq[1].keycode, keys::NONE);
            for action in seq {
                assert_eq!((action.hold_ms, action.release_ms), (100, 100));
            }
        }
    }
}
