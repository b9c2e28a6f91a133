// wakekey - remote PC control bridge
// Command dispatcher, keystroke macros, WoL encoder and SSH client

pub mod config;
pub mod dispatcher;
pub mod gadget;
pub mod hid_codes;
pub mod http;
pub mod indicator;
pub mod key_action;
pub mod macros;
pub mod ssh;
pub mod wol;

pub use config::Config;
pub use dispatcher::{AppTarget, Dispatcher, HostCommand};
pub use gadget::{HidKeyboard, UsbGadgetKeyboard};
pub use indicator::{BusyIndicator, NoIndicator, SysfsLed};
pub use key_action::KeyAction;
pub use wol::MacAddr;
