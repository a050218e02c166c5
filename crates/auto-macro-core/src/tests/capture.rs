use crate::{
    Button, CancelToken, EventKind,
    capture::{Session, SessionControl},
};

use crossbeam_channel::bounded;

fn session(record_mouse_moves: bool) -> Session {
    let (done_tx, _done_rx) = bounded(1);
    Session::new(record_mouse_moves, CancelToken::new(), done_tx)
}

/// WHAT: Observed events are buffered with the offsets they arrived at
/// WHY: Capture order is temporal order; offsets carry the pacing
#[test]
fn given_input_stream_when_observing_then_offsets_preserved_in_order() {
    // Given: A fresh session
    let mut s = session(true);

    // When: Observing a press/release pair at increasing offsets
    let press = rdev::EventType::KeyPress(rdev::Key::KeyA);
    let release = rdev::EventType::KeyRelease(rdev::Key::KeyA);
    assert!(matches!(s.observe(&press, 0.1), SessionControl::Continue));
    assert!(matches!(s.observe(&release, 0.25), SessionControl::Continue));

    // Then: Both buffered in order, offsets non-decreasing
    let events = s.into_events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, EventKind::KeyPress { key: "a".into() });
    assert_eq!(events[1].kind, EventKind::KeyRelease { key: "a".into() });
    assert!(
        events.windows(2).all(|w| w[0].offset <= w[1].offset),
        "offsets must be monotonically non-decreasing"
    );
}

/// WHAT: Releasing Escape records the event and stops the session
/// WHY: The stop key is detected synchronously inside the release handling,
///      and the reference behavior keeps the release in the buffer
#[test]
fn given_escape_release_when_observing_then_recorded_and_stopped() {
    let mut s = session(true);

    let control = s.observe(&rdev::EventType::KeyRelease(rdev::Key::Escape), 0.5);

    assert!(matches!(control, SessionControl::Stop));
    let events = s.into_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::KeyRelease { key: "esc".into() });
}

/// WHAT: Pressing Escape does not stop the session
/// WHY: Only the release is the stop signal
#[test]
fn given_escape_press_when_observing_then_session_continues() {
    let mut s = session(true);

    let control = s.observe(&rdev::EventType::KeyPress(rdev::Key::Escape), 0.5);

    assert!(matches!(control, SessionControl::Continue));
}

/// WHAT: Button events carry the last observed pointer position
/// WHY: The low-level hook reports buttons without coordinates
#[test]
fn given_pointer_motion_when_clicking_then_position_attached() {
    let mut s = session(true);

    let _ = s.observe(&rdev::EventType::MouseMove { x: 100.6, y: 40.2 }, 0.1);
    let _ = s.observe(&rdev::EventType::ButtonPress(rdev::Button::Left), 0.2);
    let _ = s.observe(&rdev::EventType::ButtonRelease(rdev::Button::Left), 0.3);

    let events = s.into_events();
    assert_eq!(
        events[1].kind,
        EventKind::MousePress {
            x: 101,
            y: 40,
            button: Button::Left,
        }
    );
    assert_eq!(
        events[2].kind,
        EventKind::MouseRelease {
            x: 101,
            y: 40,
            button: Button::Left,
        }
    );
}

/// WHAT: With motion recording off, moves are dropped but still tracked
/// WHY: Presses must carry fresh coordinates even when moves are not stored
#[test]
fn given_moves_disabled_when_clicking_then_clicks_carry_position() {
    let mut s = session(false);

    let _ = s.observe(&rdev::EventType::MouseMove { x: 7.0, y: 8.0 }, 0.1);
    let _ = s.observe(&rdev::EventType::ButtonPress(rdev::Button::Right), 0.2);

    let events = s.into_events();
    assert_eq!(events.len(), 1, "the move itself must not be recorded");
    assert_eq!(
        events[0].kind,
        EventKind::MousePress {
            x: 7,
            y: 8,
            button: Button::Right,
        }
    );
}

/// WHAT: Wheel activity is ignored
/// WHY: Wheel events are outside the recorded vocabulary
#[test]
fn given_wheel_event_when_observing_then_ignored() {
    let mut s = session(true);

    let _ = s.observe(
        &rdev::EventType::Wheel {
            delta_x: 0,
            delta_y: -1,
        },
        0.1,
    );

    assert!(s.into_events().is_empty());
}
