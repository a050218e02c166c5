//! Timing-faithful macro playback.
//!
//! Events dispatch in stored order. The wait before event `i` is the
//! difference between consecutive stored offsets, which reconstructs the
//! original inter-event pacing without aligning to the original session's
//! wall clock; the first event waits its own offset from playback start.

use crate::{
    CoreError,
    cancel::CancelToken,
    error::Result,
    event::{Button, Event, EventKind},
    keymap,
};

use std::{
    panic::Location,
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::Duration,
};

use enigo::{Coordinate, Direction, Enigo, Keyboard, Mouse, Settings};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Sink for synthetic input during playback.
///
/// The production implementation drives the OS input synthesis layer; tests
/// substitute a recording sink.
pub trait Dispatcher {
    /// Deliver one event to the playback target.
    fn dispatch(&mut self, kind: &EventKind) -> Result<()>;
}

/// [`Dispatcher`] backed by enigo.
///
/// `Enigo` is not `Send`; construct this inside the task that plays, not
/// before spawning it.
pub struct EnigoDispatcher {
    enigo: Enigo,
}

impl EnigoDispatcher {
    /// Initialize the OS input synthesizer.
    #[track_caller]
    pub fn new() -> Result<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| CoreError::Dispatch {
            reason: format!("Failed to initialize input synthesis: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        Ok(Self { enigo })
    }

    #[track_caller]
    fn move_to(&mut self, x: i32, y: i32) -> Result<()> {
        self.enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(|e| CoreError::Dispatch {
                reason: format!("Failed to move pointer: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    #[track_caller]
    fn button(&mut self, button: Button, direction: Direction) -> Result<()> {
        let Some(button) = keymap::button_to_enigo(button) else {
            debug!(?button, "Button has no synthetic counterpart, skipping");
            return Ok(());
        };

        self.enigo
            .button(button, direction)
            .map_err(|e| CoreError::Dispatch {
                reason: format!("Failed to deliver mouse button: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Named keys resolve through the lookup table; anything else that is a
    /// single character goes out as character input. An identifier that is
    /// neither is dropped here -- recovered locally, never surfaced.
    #[track_caller]
    fn key(&mut self, identifier: &str, direction: Direction) -> Result<()> {
        let Some(key) = keymap::resolve_key(identifier) else {
            debug!(identifier, "Key identifier not deliverable, skipping");
            return Ok(());
        };

        self.enigo
            .key(key, direction)
            .map_err(|e| CoreError::Dispatch {
                reason: format!("Failed to deliver key '{identifier}': {e}"),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

impl Dispatcher for EnigoDispatcher {
    fn dispatch(&mut self, kind: &EventKind) -> Result<()> {
        match kind {
            EventKind::MouseMove { x, y } => self.move_to(*x, *y),
            EventKind::MousePress { x, y, button } => {
                self.move_to(*x, *y)?;
                self.button(*button, Direction::Press)
            }
            EventKind::MouseRelease { x, y, button } => {
                self.move_to(*x, *y)?;
                self.button(*button, Direction::Release)
            }
            EventKind::KeyPress { key } => self.key(key, Direction::Press),
            EventKind::KeyRelease { key } => self.key(key, Direction::Release),
        }
    }
}

/// How a playback run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every event was dispatched.
    Completed {
        /// Number of events delivered.
        dispatched: usize,
    },
    /// The token was cancelled; the remaining events were not dispatched.
    Cancelled {
        /// Number of events delivered before the cancellation checkpoint.
        dispatched: usize,
    },
}

/// Replays stored event sequences.
///
/// At most one run at a time: a second concurrent `play` is rejected with
/// [`CoreError::PlaybackBusy`]. [`Player::stop`] cancels the active run at
/// its next checkpoint.
#[derive(Default)]
pub struct Player {
    active: AtomicBool,
    current: Mutex<Option<CancelToken>>,
}

impl Player {
    /// Construct an idle player.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a playback run is in progress.
    pub fn is_playing(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Request cancellation of the active run, if any.
    ///
    /// Takes effect at the next checkpoint: the in-flight sleep or dispatch
    /// is not interrupted, so at most one more event's worth of latency.
    pub fn stop(&self) {
        let guard = self.lock_current();
        if let Some(token) = guard.as_ref() {
            token.cancel();
            info!("Playback stop requested");
        }
    }

    /// Play `events` in order through `dispatcher`, pacing by offset deltas.
    ///
    /// Blocks the calling thread for the duration (run it under
    /// `spawn_blocking`); the per-event sleep is the only blocking point and
    /// doubles as the cancellation checkpoint.
    #[track_caller]
    #[instrument(skip_all, fields(event_count = events.len()))]
    pub fn play<D: Dispatcher>(
        &self,
        events: &[Event],
        token: &CancelToken,
        dispatcher: &mut D,
    ) -> Result<PlaybackOutcome> {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CoreError::PlaybackBusy {
                location: ErrorLocation::from(Location::caller()),
            });
        }

        *self.lock_current() = Some(token.clone());

        let outcome = self.run(events, token, dispatcher);

        *self.lock_current() = None;
        self.active.store(false, Ordering::Release);

        outcome
    }

    fn run<D: Dispatcher>(
        &self,
        events: &[Event],
        token: &CancelToken,
        dispatcher: &mut D,
    ) -> Result<PlaybackOutcome> {
        let session_id = Uuid::new_v4();
        info!(session_id = %session_id, "Playback started");

        let mut dispatched = 0usize;
        let mut previous_offset = 0.0f64;

        for event in events {
            let delay = (event.offset - previous_offset).max(0.0);
            if delay > 0.0 {
                thread::sleep(Duration::from_secs_f64(delay));
            }

            // Checkpoint sits between the sleep and the dispatch: once a
            // stop lands, no further event leaves the process.
            if token.is_cancelled() {
                info!(session_id = %session_id, dispatched, "Playback cancelled");
                return Ok(PlaybackOutcome::Cancelled { dispatched });
            }

            dispatcher.dispatch(&event.kind)?;
            dispatched += 1;
            previous_offset = event.offset;
        }

        info!(session_id = %session_id, dispatched, "Playback finished");

        Ok(PlaybackOutcome::Completed { dispatched })
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<CancelToken>> {
        self.current.lock().unwrap_or_else(|e| {
            error!("Playback token lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}
