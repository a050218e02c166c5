use crate::{
    CancelToken, CoreError, Dispatcher, Event, EventKind, PlaybackOutcome, Player,
    error::Result,
};

use std::{
    panic::Location,
    sync::{Arc, Mutex},
    thread,
    time::{Duration, Instant},
};

use error_location::ErrorLocation;

/// Dispatcher that records what was delivered and when.
#[derive(Clone, Default)]
struct RecordingDispatcher {
    delivered: Arc<Mutex<Vec<(EventKind, Instant)>>>,
}

impl RecordingDispatcher {
    #[allow(clippy::unwrap_used)]
    fn delivered(&self) -> Vec<(EventKind, Instant)> {
        self.delivered.lock().unwrap().clone()
    }
}

impl Dispatcher for RecordingDispatcher {
    #[allow(clippy::unwrap_used)]
    fn dispatch(&mut self, kind: &EventKind) -> Result<()> {
        self.delivered
            .lock()
            .unwrap()
            .push((kind.clone(), Instant::now()));
        Ok(())
    }
}

/// Dispatcher that always fails.
struct FailingDispatcher;

impl Dispatcher for FailingDispatcher {
    fn dispatch(&mut self, _kind: &EventKind) -> Result<()> {
        Err(CoreError::Dispatch {
            reason: "synthetic failure".into(),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}

fn key_events(offsets: &[f64]) -> Vec<Event> {
    offsets
        .iter()
        .map(|&offset| Event::new(EventKind::KeyPress { key: "a".into() }, offset))
        .collect()
}

/// WHAT: All events dispatch in stored order on an uncancelled run
/// WHY: Within one macro, dispatch order must equal capture order
#[test]
#[allow(clippy::unwrap_used)]
fn given_macro_when_playing_then_all_events_dispatch_in_order() {
    // Given: A three-event macro with distinct payloads
    let events = vec![
        Event::new(EventKind::KeyPress { key: "h".into() }, 0.0),
        Event::new(EventKind::KeyRelease { key: "h".into() }, 0.01),
        Event::new(EventKind::MouseMove { x: 4, y: 2 }, 0.02),
    ];
    let player = Player::new();
    let mut dispatcher = RecordingDispatcher::default();

    // When: Playing to completion
    let outcome = player
        .play(&events, &CancelToken::new(), &mut dispatcher)
        .unwrap();

    // Then: Completed, with the exact stored sequence delivered in order
    assert_eq!(outcome, PlaybackOutcome::Completed { dispatched: 3 });
    let delivered: Vec<EventKind> =
        dispatcher.delivered().into_iter().map(|(k, _)| k).collect();
    let expected: Vec<EventKind> = events.into_iter().map(|e| e.kind).collect();
    assert_eq!(delivered, expected);
}

/// WHAT: Inter-event waits are offset deltas, not absolute offsets
/// WHY: Delta pacing reconstructs the original rhythm; absolute pacing
///      would double-count earlier waits
#[test]
#[allow(clippy::unwrap_used)]
fn given_offsets_when_playing_then_waits_are_deltas() {
    // Given: Offsets 0.0, 0.2, 0.5 (deltas 0.2 and 0.3)
    let events = key_events(&[0.0, 0.2, 0.5]);
    let player = Player::new();
    let mut dispatcher = RecordingDispatcher::default();

    // When: Playing to completion
    let started = Instant::now();
    player
        .play(&events, &CancelToken::new(), &mut dispatcher)
        .unwrap();
    let total = started.elapsed();

    // Then: Total is the last offset, not the cumulative sum (0.7)
    assert!(total >= Duration::from_millis(500), "total was {total:?}");
    assert!(total < Duration::from_millis(650), "total was {total:?}");

    // And: The wait between the last two dispatches is the 0.3 delta
    let delivered = dispatcher.delivered();
    let gap = delivered[2].1.duration_since(delivered[1].1);
    assert!(gap >= Duration::from_millis(300), "gap was {gap:?}");
    assert!(gap < Duration::from_millis(450), "gap was {gap:?}");
}

/// WHAT: A first event with a non-zero offset waits that offset
/// WHY: The first delay is relative to playback start
#[test]
#[allow(clippy::unwrap_used)]
fn given_leading_offset_when_playing_then_first_dispatch_waits() {
    let events = key_events(&[0.15]);
    let player = Player::new();
    let mut dispatcher = RecordingDispatcher::default();

    let started = Instant::now();
    player
        .play(&events, &CancelToken::new(), &mut dispatcher)
        .unwrap();

    assert!(started.elapsed() >= Duration::from_millis(150));
}

/// WHAT: Cancelling during the second wait dispatches exactly one event
/// WHY: The checkpoint before each dispatch stops the remaining sequence
#[test]
#[allow(clippy::unwrap_used)]
fn given_cancel_during_second_wait_when_playing_then_one_event_dispatched() {
    // Given: A three-event macro with a long second delta
    let events = key_events(&[0.0, 0.3, 0.6]);
    let player = Arc::new(Player::new());
    let token = CancelToken::new();
    let dispatcher = RecordingDispatcher::default();

    // When: Playing on a background thread and cancelling mid-wait
    let handle = {
        let player = Arc::clone(&player);
        let token = token.clone();
        let mut dispatcher = dispatcher.clone();
        thread::spawn(move || player.play(&events, &token, &mut dispatcher))
    };
    thread::sleep(Duration::from_millis(100));
    token.cancel();
    let outcome = handle.join().unwrap_or_else(|_| {
        Err(CoreError::Dispatch {
            reason: "playback thread panicked".into(),
            location: ErrorLocation::from(Location::caller()),
        })
    });

    // Then: Exactly the first event went out
    assert_eq!(
        outcome.unwrap(),
        PlaybackOutcome::Cancelled { dispatched: 1 }
    );
    assert_eq!(dispatcher.delivered().len(), 1);
    assert!(!player.is_playing());
}

/// WHAT: Stop() cancels the active run at its next checkpoint
/// WHY: Stop is the user-facing cancellation entry point
#[test]
#[allow(clippy::unwrap_used)]
fn given_active_run_when_stopping_then_run_cancelled() {
    let events = key_events(&[0.0, 0.4]);
    let player = Arc::new(Player::new());
    let dispatcher = RecordingDispatcher::default();

    let handle = {
        let player = Arc::clone(&player);
        let mut dispatcher = dispatcher.clone();
        thread::spawn(move || player.play(&events, &CancelToken::new(), &mut dispatcher))
    };
    thread::sleep(Duration::from_millis(100));
    player.stop();

    let outcome = handle.join().unwrap_or_else(|_| {
        Err(CoreError::Dispatch {
            reason: "playback thread panicked".into(),
            location: ErrorLocation::from(Location::caller()),
        })
    });

    assert_eq!(
        outcome.unwrap(),
        PlaybackOutcome::Cancelled { dispatched: 1 }
    );
}

/// WHAT: A second concurrent play is rejected as busy
/// WHY: At most one playback session per player at a time
#[test]
#[allow(clippy::unwrap_used)]
fn given_active_run_when_playing_again_then_busy() {
    let events = key_events(&[0.0, 0.5]);
    let player = Arc::new(Player::new());
    let token = CancelToken::new();

    let handle = {
        let player = Arc::clone(&player);
        let token = token.clone();
        let events = events.clone();
        thread::spawn(move || {
            let mut dispatcher = RecordingDispatcher::default();
            player.play(&events, &token, &mut dispatcher)
        })
    };
    thread::sleep(Duration::from_millis(100));

    let mut second = RecordingDispatcher::default();
    let result = player.play(&events, &CancelToken::new(), &mut second);
    assert!(matches!(result, Err(CoreError::PlaybackBusy { .. })));
    assert!(second.delivered().is_empty());

    token.cancel();
    assert!(handle.join().is_ok());
}

/// WHAT: A dispatch failure aborts the run and frees the player
/// WHY: Errors are terminal for the operation, not for the engine
#[test]
fn given_failing_dispatcher_when_playing_then_error_and_player_idle() {
    let events = key_events(&[0.0]);
    let player = Player::new();

    let result = player.play(&events, &CancelToken::new(), &mut FailingDispatcher);

    assert!(matches!(result, Err(CoreError::Dispatch { .. })));
    assert!(!player.is_playing());

    // A fresh run is accepted afterwards
    let mut dispatcher = RecordingDispatcher::default();
    assert!(
        player
            .play(&events, &CancelToken::new(), &mut dispatcher)
            .is_ok()
    );
}

/// WHAT: An empty macro completes immediately with zero dispatches
/// WHY: Empty sequences are valid macros
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_macro_when_playing_then_completed_with_zero() {
    let player = Player::new();
    let mut dispatcher = RecordingDispatcher::default();

    let outcome = player
        .play(&[], &CancelToken::new(), &mut dispatcher)
        .unwrap();

    assert_eq!(outcome, PlaybackOutcome::Completed { dispatched: 0 });
}

/// WHAT: Stop with no active run is a no-op
/// WHY: Stop may race a natural completion; that must be harmless
#[test]
fn given_idle_player_when_stopping_then_nothing_happens() {
    let player = Player::new();
    player.stop();
    assert!(!player.is_playing());
}
