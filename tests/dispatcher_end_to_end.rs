//! End-to-end dispatcher tests against a recording HID transport.
//!
//! These exercise the public API the way the daemon wires it up: a
//! dispatcher over a `HidKeyboard`/`BusyIndicator` pair, with the
//! consumer loop running as its own task and producers signalling from
//! the outside. The recording transport captures indicator changes and
//! HID reports in one ordered log so service ordering is observable.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use wakekey::dispatcher::{AppTarget, Dispatcher, HostCommand};
use wakekey::gadget::HidKeyboard;
use wakekey::hid_codes::{keys, mods};
use wakekey::indicator::BusyIndicator;
use wakekey::{macros, KeyAction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    IndicatorOn,
    IndicatorOff,
    Wakeup,
    Report(u8, u8),
    ReleaseAll,
}

#[derive(Clone, Default)]
struct Log(Arc<Mutex<Vec<Event>>>);

impl Log {
    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }
}

struct RecordingKeyboard {
    mounted: AtomicBool,
    log: Log,
}

impl HidKeyboard for RecordingKeyboard {
    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Relaxed)
    }

    fn send_report(&self, modifier: u8, keycode: u8) -> io::Result<()> {
        self.log.push(Event::Report(modifier, keycode));
        Ok(())
    }

    fn release_all(&self) -> io::Result<()> {
        self.log.push(Event::ReleaseAll);
        Ok(())
    }

    fn remote_wakeup(&self) -> io::Result<()> {
        self.log.push(Event::Wakeup);
        Ok(())
    }
}

struct RecordingIndicator {
    log: Log,
}

impl BusyIndicator for RecordingIndicator {
    fn set_busy(&self, on: bool) {
        self.log.push(if on {
            Event::IndicatorOn
        } else {
            Event::IndicatorOff
        });
    }
}

fn harness(mounted: bool) -> (Log, Arc<Dispatcher>) {
    let log = Log::default();
    let keyboard = Arc::new(RecordingKeyboard {
        mounted: AtomicBool::new(mounted),
        log: log.clone(),
    });
    let indicator = Arc::new(RecordingIndicator { log: log.clone() });
    (log, Arc::new(Dispatcher::new(keyboard, indicator)))
}

fn macro_events(sequence: &[KeyAction]) -> Vec<Event> {
    sequence
        .iter()
        .flat_map(|a| [Event::Report(a.modifier, a.keycode), Event::ReleaseAll])
        .collect()
}

/// Let the consumer task drain everything pending, then stop it.
async fn drain(dispatcher: &Arc<Dispatcher>) {
    let consumer = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.run().await })
    };
    // Far longer (in virtual time) than any drain cycle needs.
    tokio::time::sleep(Duration::from_secs(60)).await;
    consumer.abort();
}

#[tokio::test(start_paused = true)]
async fn pc_restart_full_event_order() {
    let (log, dispatcher) = harness(true);
    dispatcher.request(HostCommand::RestartPc);
    drain(&dispatcher).await;

    let mut expected = vec![Event::IndicatorOn, Event::Wakeup];
    expected.extend(macro_events(macros::RESTART_PC));
    expected.push(Event::IndicatorOff);
    assert_eq!(log.events(), expected);

    // The sequence opens the Run dialog and then types 17 keystrokes:
    // the 16 characters of the command line plus Enter.
    let events = log.events();
    assert_eq!(events[2], Event::Report(mods::LGUI, keys::R));
    let keystrokes = events
        .iter()
        .filter(|e| matches!(e, Event::Report(0, _)))
        .count();
    assert_eq!(keystrokes, 17);
    assert_eq!(events[events.len() - 3], Event::Report(0, keys::ENTER));
}

#[tokio::test(start_paused = true)]
async fn repeated_requests_service_once_per_drain() {
    let (log, dispatcher) = harness(true);
    dispatcher.request(HostCommand::Keypress);
    dispatcher.request(HostCommand::Keypress);
    dispatcher.request(HostCommand::Keypress);
    drain(&dispatcher).await;

    assert_eq!(
        log.events(),
        vec![Event::IndicatorOn, Event::Wakeup, Event::IndicatorOff]
    );
}

#[tokio::test(start_paused = true)]
async fn unmounted_host_gets_nothing() {
    let (log, dispatcher) = harness(false);
    dispatcher.request(HostCommand::Keypress);
    dispatcher.request(HostCommand::RestartPc);
    dispatcher.request(HostCommand::ShutdownPc);
    drain(&dispatcher).await;

    assert!(log.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn relaunch_never_interleaves_with_a_queued_macro() {
    let (log, dispatcher) = harness(true);

    let consumer = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.run().await })
    };
    dispatcher.request(HostCommand::RestartPc);
    // Let the queued service get under way, then fire the relaunch
    // from a second producer context.
    tokio::time::sleep(Duration::from_millis(700)).await;
    dispatcher.restart_app(AppTarget::Anydesk).await;
    tokio::time::sleep(Duration::from_secs(60)).await;
    consumer.abort();

    // Keystroke traffic must be two contiguous macro blocks, in either
    // order.
    let keystrokes: Vec<Event> = log
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::Report(..) | Event::ReleaseAll))
        .collect();
    let restart = macro_events(macros::RESTART_PC);
    let anydesk = macro_events(macros::RESTART_ANYDESK);
    assert_eq!(keystrokes.len(), restart.len() + anydesk.len());
    let restart_first = keystrokes[..restart.len()] == restart[..]
        && keystrokes[restart.len()..] == anydesk[..];
    let anydesk_first = keystrokes[..anydesk.len()] == anydesk[..]
        && keystrokes[anydesk.len()..] == restart[..];
    assert!(
        restart_first || anydesk_first,
        "keystrokes interleaved: {keystrokes:?}"
    );
}
