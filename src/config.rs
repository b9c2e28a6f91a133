//! Daemon configuration, loaded from a TOML file.
//!
//! Every field has a default so a missing file (or an empty one) still
//! yields a runnable configuration; the file only needs the sections it
//! overrides.
//!
//! ```toml
//! [http]
//! bind = "0.0.0.0:8080"
//!
//! [gadget]
//! device = "/dev/hidg0"
//! udc_state = "/sys/class/udc/fe980000.usb/state"
//! wakeup_attr = "/sys/class/udc/fe980000.usb/device/power/wakeup"
//!
//! [indicator]
//! led = "/sys/class/leds/ACT/brightness"
//!
//! [ssh]
//! host = "192.168.1.20"
//! username = "operator"
//! password = ""
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Default configuration path.
pub const DEFAULT_PATH: &str = "/etc/wakekey.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub gadget: GadgetConfig,
    #[serde(default)]
    pub indicator: IndicatorConfig,
    #[serde(default)]
    pub ssh: SshConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Listen address for the HTTP API.
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GadgetConfig {
    /// HID gadget character device.
    #[serde(default = "default_gadget_device")]
    pub device: PathBuf,
    /// UDC `state` sysfs attribute; reads `configured` while the host
    /// session is up.
    #[serde(default = "default_udc_state")]
    pub udc_state: PathBuf,
    /// Board-specific attribute that triggers USB remote wakeup.
    #[serde(default)]
    pub wakeup_attr: Option<PathBuf>,
}

fn default_gadget_device() -> PathBuf {
    PathBuf::from("/dev/hidg0")
}

fn default_udc_state() -> PathBuf {
    // Raspberry Pi 4 UDC; boards differ, override in the config file.
    PathBuf::from("/sys/class/udc/fe980000.usb/state")
}

impl Default for GadgetConfig {
    fn default() -> Self {
        Self {
            device: default_gadget_device(),
            udc_state: default_udc_state(),
            wakeup_attr: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IndicatorConfig {
    /// sysfs LED `brightness` attribute for the busy indicator.
    #[serde(default)]
    pub led: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SshConfig {
    /// Default remote host for the SSH endpoints.
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub username: String,
    /// Empty means "none supplied" and enables the empty-password
    /// fallback during authentication.
    #[serde(default)]
    pub password: String,
}

impl Config {
    /// Load from `path`, or from [`DEFAULT_PATH`] when `path` is None.
    /// An absent file at the default path yields the defaults; an
    /// explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_PATH), false),
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };
        toml::from_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}
