//! Busy indicator — visual feedback while a command is being typed.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Something that can signal "the keyboard is busy" to the operator.
///
/// Indicator failures are absorbed: a dead LED must never abort a
/// command in flight.
pub trait BusyIndicator: Send + Sync {
    fn set_busy(&self, on: bool);
}

/// An LED driven through the sysfs LED class `brightness` attribute.
pub struct SysfsLed {
    brightness: PathBuf,
}

impl SysfsLed {
    pub fn new(brightness: &Path) -> Self {
        Self {
            brightness: brightness.to_path_buf(),
        }
    }
}

impl BusyIndicator for SysfsLed {
    fn set_busy(&self, on: bool) {
        let value: &[u8] = if on { b"1" } else { b"0" };
        if let Err(e) = fs::write(&self.brightness, value) {
            warn!(led = %self.brightness.display(), "indicator write failed: {e}");
        }
    }
}

/// Fallback when no indicator is configured.
pub struct NoIndicator;

impl BusyIndicator for NoIndicator {
    fn set_busy(&self, _on: bool) {}
}
