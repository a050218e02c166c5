//! Live input capture.
//!
//! A recording session buffers every observed key press/release and mouse
//! press/release/move, stamped with seconds since the session started.
//! Releasing Escape ends the session; it is the only stop signal the hook
//! reacts to on its own, detected synchronously inside the key-release
//! handling. An external cancel of the session token also ends it.
//!
//! The OS-level listener is installed lazily, once per process, on its own
//! thread, and survives across sessions -- the underlying hook cannot be
//! uninstalled. While no session is active the callback drops events.

use crate::{
    CoreError,
    cancel::CancelToken,
    error::Result,
    event::{Event, EventKind},
    keymap,
};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex, MutexGuard, OnceLock,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

use crossbeam_channel::{Sender, bounded};
use error_location::ErrorLocation;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// How often the waiting task re-checks an externally cancelled token.
///
/// The stop-key path signals the waiter directly; this poll only bounds the
/// latency of a programmatic cancel that arrives while no input flows.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Capture behavior knobs.
#[derive(Debug, Clone, Copy)]
pub struct CaptureOptions {
    /// Whether pointer motion is recorded. Presses and releases always are;
    /// motion still updates the position attached to them when disabled.
    pub record_mouse_moves: bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            record_mouse_moves: true,
        }
    }
}

/// Whether the session keeps running after an observed event.
pub(crate) enum SessionControl {
    /// Keep observing.
    Continue,
    /// The stop key was released; the session is over.
    Stop,
}

/// Buffer and bookkeeping for one recording session.
pub(crate) struct Session {
    started: Instant,
    events: Vec<Event>,
    last_pos: (i32, i32),
    record_mouse_moves: bool,
    token: CancelToken,
    done_tx: Sender<()>,
}

impl Session {
    pub(crate) fn new(
        record_mouse_moves: bool,
        token: CancelToken,
        done_tx: Sender<()>,
    ) -> Self {
        Self {
            started: Instant::now(),
            events: Vec::new(),
            last_pos: (0, 0),
            record_mouse_moves,
            token,
            done_tx,
        }
    }

    /// Observe one low-level event at `offset` seconds into the session.
    ///
    /// The Escape release is recorded like any other event, then reported
    /// as the stop signal.
    pub(crate) fn observe(&mut self, event_type: &rdev::EventType, offset: f64) -> SessionControl {
        match event_type {
            rdev::EventType::KeyPress(key) => {
                self.events.push(Event::new(
                    EventKind::KeyPress {
                        key: keymap::key_identifier(*key),
                    },
                    offset,
                ));
            }
            rdev::EventType::KeyRelease(key) => {
                self.events.push(Event::new(
                    EventKind::KeyRelease {
                        key: keymap::key_identifier(*key),
                    },
                    offset,
                ));
                if *key == rdev::Key::Escape {
                    return SessionControl::Stop;
                }
            }
            rdev::EventType::ButtonPress(button) => {
                let (x, y) = self.last_pos;
                self.events.push(Event::new(
                    EventKind::MousePress {
                        x,
                        y,
                        button: keymap::button_from_rdev(*button),
                    },
                    offset,
                ));
            }
            rdev::EventType::ButtonRelease(button) => {
                let (x, y) = self.last_pos;
                self.events.push(Event::new(
                    EventKind::MouseRelease {
                        x,
                        y,
                        button: keymap::button_from_rdev(*button),
                    },
                    offset,
                ));
            }
            rdev::EventType::MouseMove { x, y } => {
                let pos = (x.round() as i32, y.round() as i32);
                self.last_pos = pos;
                if self.record_mouse_moves {
                    self.events
                        .push(Event::new(EventKind::MouseMove { x: pos.0, y: pos.1 }, offset));
                }
            }
            // Wheel activity is not part of the recorded vocabulary.
            rdev::EventType::Wheel { .. } => {}
        }

        SessionControl::Continue
    }

    pub(crate) fn into_events(self) -> Vec<Event> {
        self.events
    }
}

/// State shared with the listener thread's callback.
struct ListenerState {
    session: Mutex<Option<Session>>,
    /// Set once if the OS declined the hook installation.
    failure: OnceLock<String>,
}

impl ListenerState {
    fn lock_session(&self) -> MutexGuard<'_, Option<Session>> {
        // Recover from lock poison rather than dropping input. A poisoned
        // mutex means a previous holder panicked, but the buffer is intact.
        self.session.lock().unwrap_or_else(|e| {
            error!("Capture session lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    fn on_event(&self, event: rdev::Event) {
        let mut guard = self.lock_session();
        let Some(session) = guard.as_mut() else {
            return;
        };

        if session.token.is_cancelled() {
            let _ = session.done_tx.try_send(());
            return;
        }

        let offset = session.started.elapsed().as_secs_f64();
        if let SessionControl::Stop = session.observe(&event.event_type, offset) {
            session.token.cancel();
            let _ = session.done_tx.try_send(());
        }
    }

    fn fail(&self, reason: String) {
        let _ = self.failure.set(reason);
        let guard = self.lock_session();
        if let Some(session) = guard.as_ref() {
            session.token.cancel();
            let _ = session.done_tx.try_send(());
        }
    }
}

/// Records live keyboard/mouse activity into an event sequence.
///
/// At most one session at a time: starting a second while one is active is
/// rejected with [`CoreError::CaptureBusy`].
pub struct Recorder {
    options: CaptureOptions,
    active: AtomicBool,
    listener: OnceLock<Arc<ListenerState>>,
}

impl Recorder {
    /// Construct an idle recorder. No OS hook is installed until the first
    /// session starts.
    pub fn new(options: CaptureOptions) -> Self {
        Self {
            options,
            active: AtomicBool::new(false),
            listener: OnceLock::new(),
        }
    }

    /// Whether a capture session is in progress.
    pub fn is_recording(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    fn listener_state(&self) -> &Arc<ListenerState> {
        self.listener.get_or_init(|| {
            let state = Arc::new(ListenerState {
                session: Mutex::new(None),
                failure: OnceLock::new(),
            });

            let thread_state = Arc::clone(&state);
            std::thread::spawn(move || {
                let callback_state = Arc::clone(&thread_state);
                // Blocks for the life of the process on success. On macOS
                // this requires Accessibility permissions.
                if let Err(e) = rdev::listen(move |event| callback_state.on_event(event)) {
                    let reason = format!("{e:?}");
                    error!(reason = %reason, "Input listener could not start");
                    thread_state.fail(reason);
                }
            });

            state
        })
    }

    /// Record one session: Idle -> Recording -> Idle.
    ///
    /// Blocks the calling thread (run it under `spawn_blocking` or a
    /// dedicated thread) until the stop key is released or `token` is
    /// cancelled, then returns the buffered events in capture order.
    #[track_caller]
    #[instrument(skip(self, token))]
    pub fn record(&self, token: &CancelToken) -> Result<Vec<Event>> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CoreError::CaptureBusy {
                location: ErrorLocation::from(Location::caller()),
            });
        }
        let active = ActiveGuard(&self.active);

        let state = Arc::clone(self.listener_state());
        if let Some(reason) = state.failure.get() {
            return Err(CoreError::ListenerFailed {
                reason: reason.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let session_id = Uuid::new_v4();
        let (done_tx, done_rx) = bounded(1);
        {
            let mut slot = state.lock_session();
            *slot = Some(Session::new(
                self.options.record_mouse_moves,
                token.clone(),
                done_tx,
            ));
        }

        info!(session_id = %session_id, "Recording started");

        loop {
            match done_rx.recv_timeout(CANCEL_POLL_INTERVAL) {
                Ok(()) => break,
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                    if token.is_cancelled() {
                        warn!(session_id = %session_id, "Recording cancelled externally");
                        break;
                    }
                    // The listener can fail between the startup check and
                    // the session install; without this the wait would
                    // outlive a hook that will never deliver anything.
                    if state.failure.get().is_some() {
                        break;
                    }
                }
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
            }
        }

        let session = state.lock_session().take();
        drop(active);

        if let Some(reason) = state.failure.get() {
            return Err(CoreError::ListenerFailed {
                reason: reason.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let events = session.map(Session::into_events).unwrap_or_default();

        info!(
            session_id = %session_id,
            event_count = events.len(),
            "Recording stopped"
        );

        Ok(events)
    }
}

/// Clears the busy flag on every exit path.
struct ActiveGuard<'a>(&'a AtomicBool);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
