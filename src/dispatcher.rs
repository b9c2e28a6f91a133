//! Command dispatcher — the single consumer of the HID transport.
//!
//! Producers (HTTP handlers, a button handler, anything with a
//! reference) call [`Dispatcher::request`] from any context; the call
//! is non-blocking, allocation-free and idempotent. Repeated requests
//! for the same command before the consumer drains are coalesced into
//! one pending flag: presence, not history. A single long-lived
//! consumer task ([`Dispatcher::run`]) claims and clears the whole
//! pending set atomically, then services the claimed flags in fixed
//! priority order: wake keypress, then PC restart, then PC shutdown.
//!
//! Application relaunches take a different path: they bypass the
//! pending set and the mounted check and play their gesture in the
//! caller's own context (see [`Dispatcher::restart_app`]). Keystroke
//! playback itself is always mutually exclusive, whichever path
//! triggered it.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, Notify};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::gadget::HidKeyboard;
use crate::indicator::BusyIndicator;
use crate::key_action::KeyAction;
use crate::macros::{self, Macro};

const PENDING_KEYPRESS: u32 = 1 << 0;
const PENDING_RESTART: u32 = 1 << 1;
const PENDING_SHUTDOWN: u32 = 1 << 2;

/// Delay after remote wakeup before the run-dialog sequence starts, so
/// a just-resumed host is accepting input.
const WAKE_SETTLE: Duration = Duration::from_millis(500);

/// Length of the bare wake pulse serviced for a keypress request.
const KEYPRESS_PULSE: Duration = Duration::from_millis(50);

/// A coalescable host command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostCommand {
    /// Wake the host (remote-wakeup pulse, no keystrokes).
    Keypress,
    /// Type the restart command into the Run dialog.
    RestartPc,
    /// Type the shutdown command into the Run dialog.
    ShutdownPc,
}

impl HostCommand {
    fn bit(self) -> u32 {
        match self {
            HostCommand::Keypress => PENDING_KEYPRESS,
            HostCommand::RestartPc => PENDING_RESTART,
            HostCommand::ShutdownPc => PENDING_SHUTDOWN,
        }
    }
}

impl fmt::Display for HostCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostCommand::Keypress => write!(f, "keypress"),
            HostCommand::RestartPc => write!(f, "pc-restart"),
            HostCommand::ShutdownPc => write!(f, "pc-shutdown"),
        }
    }
}

/// An application the dispatcher knows how to relaunch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppTarget {
    Parsec,
    Anydesk,
}

/// Error for parsing an [`AppTarget`] from a request parameter.
#[derive(Debug, Clone, Error)]
#[error("unknown application: {0:?}")]
pub struct UnknownApp(pub String);

impl FromStr for AppTarget {
    type Err = UnknownApp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "parsec" => Ok(AppTarget::Parsec),
            "anydesk" => Ok(AppTarget::Anydesk),
            other => Err(UnknownApp(other.to_string())),
        }
    }
}

impl fmt::Display for AppTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppTarget::Parsec => write!(f, "parsec"),
            AppTarget::Anydesk => write!(f, "anydesk"),
        }
    }
}

impl AppTarget {
    /// The relaunch gesture for this application.
    pub fn sequence(self) -> Macro {
        match self {
            AppTarget::Parsec => macros::RESTART_PARSEC,
            AppTarget::Anydesk => macros::RESTART_ANYDESK,
        }
    }
}

/// Owns the pending set and the sole right to emit HID reports.
pub struct Dispatcher {
    pending: AtomicU32,
    wakeup: Notify,
    playback: Mutex<()>,
    keyboard: Arc<dyn HidKeyboard>,
    indicator: Arc<dyn BusyIndicator>,
}

impl Dispatcher {
    pub fn new(keyboard: Arc<dyn HidKeyboard>, indicator: Arc<dyn BusyIndicator>) -> Self {
        Self {
            pending: AtomicU32::new(0),
            wakeup: Notify::new(),
            playback: Mutex::new(()),
            keyboard,
            indicator,
        }
    }

    /// Mark `command` pending and wake the consumer.
    ///
    /// Safe to call concurrently from any context; never blocks, never
    /// allocates. If the command is already pending this is a no-op;
    /// requests are coalesced, not counted.
    pub fn request(&self, command: HostCommand) {
        self.pending.fetch_or(command.bit(), Ordering::AcqRel);
        self.wakeup.notify_one();
    }

    /// The consumer loop. Blocks until a flag is pending, claims and
    /// clears the whole set, services each claimed flag, repeats.
    /// Never returns.
    pub async fn run(&self) {
        info!("dispatcher started");
        loop {
            let claimed = self.claim().await;
            if claimed & PENDING_KEYPRESS != 0 {
                self.service_keypress().await;
            }
            if claimed & PENDING_RESTART != 0 {
                self.service_typed(HostCommand::RestartPc, macros::RESTART_PC)
                    .await;
            }
            if claimed & PENDING_SHUTDOWN != 0 {
                self.service_typed(HostCommand::ShutdownPc, macros::SHUTDOWN_PC)
                    .await;
            }
        }
    }

    /// Atomically take the current pending set, waiting if it is empty.
    async fn claim(&self) -> u32 {
        loop {
            let bits = self.pending.swap(0, Ordering::AcqRel);
            if bits != 0 {
                return bits;
            }
            self.wakeup.notified().await;
        }
    }

    async fn service_keypress(&self) {
        if !self.keyboard.is_mounted() {
            info!("not mounted, not sending keypress");
            return;
        }
        info!("sending wakeup signal");
        self.indicator.set_busy(true);
        if let Err(e) = self.keyboard.remote_wakeup() {
            warn!("remote wakeup failed: {e}");
        }
        sleep(KEYPRESS_PULSE).await;
        self.indicator.set_busy(false);
    }

    async fn service_typed(&self, command: HostCommand, sequence: Macro) {
        if !self.keyboard.is_mounted() {
            info!("not mounted, not sending {command} sequence");
            return;
        }
        info!("typing {command} sequence");
        self.indicator.set_busy(true);
        // Make sure the host is awake before the Run dialog opens.
        if let Err(e) = self.keyboard.remote_wakeup() {
            warn!("remote wakeup failed: {e}");
        }
        sleep(WAKE_SETTLE).await;
        self.play(sequence).await;
        self.indicator.set_busy(false);
    }

    /// Relaunch `app` immediately, in the caller's context.
    ///
    /// This path does not use the pending set and does not consult the
    /// mounted state; the gesture is best-effort and unverified.
    pub async fn restart_app(&self, app: AppTarget) {
        info!("relaunching {app}");
        self.play(app.sequence()).await;
    }

    /// Play one macro to completion. Playback is mutually exclusive:
    /// a second macro, whichever path requested it, waits for this one.
    async fn play(&self, sequence: Macro) {
        let _guard = self.playback.lock().await;
        for action in sequence {
            self.press(action).await;
        }
    }

    async fn press(&self, action: &KeyAction) {
        if let Err(e) = self.keyboard.send_report(action.modifier, action.keycode) {
            warn!("key report failed: {e}");
        }
        sleep(Duration::from_millis(action.hold_ms)).await;
        if let Err(e) = self.keyboard.release_all() {
            warn!("key release failed: {e}");
        }
        sleep(Duration::from_millis(action.release_ms)).await;
    }
}
