//! USB HID keyboard gadget transport.
//!
//! [`HidKeyboard`] is the seam between the dispatcher and the physical
//! USB device-controller. The production implementation writes 8-byte
//! boot keyboard reports to a Linux USB gadget character device
//! (`/dev/hidgN`, as exposed by the `g_hid`/configfs HID function) and
//! reads the bus state from the UDC's `state` attribute.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

/// Boot keyboard report: modifier, reserved, six keycode slots.
pub const REPORT_LEN: usize = 8;

/// The HID primitives the dispatcher drives.
///
/// Implementations must be cheap to call from async context: each
/// method is a single short write or attribute read.
pub trait HidKeyboard: Send + Sync {
    /// Whether the host currently has an active session with the
    /// gadget (bus enumerated and configured).
    fn is_mounted(&self) -> bool;

    /// Send a report with one key down (plus modifier bits).
    fn send_report(&self, modifier: u8, keycode: u8) -> io::Result<()>;

    /// Send the all-keys-released report.
    fn release_all(&self) -> io::Result<()>;

    /// Ask the host to resume from suspend (USB remote wakeup).
    fn remote_wakeup(&self) -> io::Result<()>;
}

/// Keyboard function of a Linux USB gadget.
pub struct UsbGadgetKeyboard {
    device: Mutex<File>,
    udc_state: PathBuf,
    wakeup_attr: Option<PathBuf>,
}

impl UsbGadgetKeyboard {
    /// Open the gadget HID device.
    ///
    /// `udc_state` is the controller's sysfs `state` attribute (reports
    /// `configured` while a host session is active). `wakeup_attr` is
    /// the board-specific attribute that triggers resume signalling;
    /// when absent, [`HidKeyboard::remote_wakeup`] is a no-op.
    pub fn open(
        device: &Path,
        udc_state: &Path,
        wakeup_attr: Option<&Path>,
    ) -> io::Result<Self> {
        let file = OpenOptions::new().write(true).open(device)?;
        debug!(device = %device.display(), "opened HID gadget");
        Ok(Self {
            device: Mutex::new(file),
            udc_state: udc_state.to_path_buf(),
            wakeup_attr: wakeup_attr.map(Path::to_path_buf),
        })
    }

    fn write_report(&self, report: [u8; REPORT_LEN]) -> io::Result<()> {
        let mut file = self
            .device
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        file.write_all(&report)?;
        file.flush()
    }
}

impl HidKeyboard for UsbGadgetKeyboard {
    fn is_mounted(&self) -> bool {
        match fs::read_to_string(&self.udc_state) {
            Ok(state) => state.trim() == "configured",
            Err(_) => false,
        }
    }

    fn send_report(&self, modifier: u8, keycode: u8) -> io::Result<()> {
        self.write_report([modifier, 0, keycode, 0, 0, 0, 0, 0])
    }

    fn release_all(&self) -> io::Result<()> {
        self.write_report([0; REPORT_LEN])
    }

    fn remote_wakeup(&self) -> io::Result<()> {
        match &self.wakeup_attr {
            Some(attr) => fs::write(attr, b"1"),
            None => Ok(()),
        }
    }
}
