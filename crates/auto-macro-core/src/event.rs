//! Captured input events and their on-disk representation.
//!
//! A macro file is a JSON array of 3-element records `[kind, payload, offset]`
//! in capture order. `kind` is one of `"key_press"`, `"key_release"`,
//! `"mouse_press"`, `"mouse_release"`, `"mouse_move"`. `payload` is a
//! `[x, y]` position, a `[x, y, button]` triple, or a symbolic key
//! identifier string, depending on the kind. `offset` is seconds since the
//! start of the recording session, as f64.

use serde::{Deserialize, Serialize, de, ser::SerializeTuple};

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
    /// Any other button, by platform code.
    Other(u8),
}

impl Button {
    /// Stable wire name for this button.
    pub fn name(&self) -> String {
        match self {
            Button::Left => "left".to_string(),
            Button::Right => "right".to_string(),
            Button::Middle => "middle".to_string(),
            Button::Other(code) => format!("button{code}"),
        }
    }

    /// Parse a wire name back into a button. Unknown names map to `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "left" => Some(Button::Left),
            "right" => Some(Button::Right),
            "middle" => Some(Button::Middle),
            other => other
                .strip_prefix("button")
                .and_then(|n| n.parse::<u8>().ok())
                .map(Button::Other),
        }
    }
}

/// What happened, with exactly the payload that kind of event carries.
#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    /// A key went down. `key` is a symbolic identifier: a named key
    /// (`"esc"`, `"shift"`, `"f5"`) or a literal single character (`"a"`).
    KeyPress {
        /// Symbolic key identifier.
        key: String,
    },
    /// A key came up.
    KeyRelease {
        /// Symbolic key identifier.
        key: String,
    },
    /// A mouse button went down at the given position.
    MousePress {
        /// Pointer x in screen coordinates.
        x: i32,
        /// Pointer y in screen coordinates.
        y: i32,
        /// Which button.
        button: Button,
    },
    /// A mouse button came up at the given position.
    MouseRelease {
        /// Pointer x in screen coordinates.
        x: i32,
        /// Pointer y in screen coordinates.
        y: i32,
        /// Which button.
        button: Button,
    },
    /// The pointer moved.
    MouseMove {
        /// Pointer x in screen coordinates.
        x: i32,
        /// Pointer y in screen coordinates.
        y: i32,
    },
}

impl EventKind {
    fn wire_kind(&self) -> &'static str {
        match self {
            EventKind::KeyPress { .. } => "key_press",
            EventKind::KeyRelease { .. } => "key_release",
            EventKind::MousePress { .. } => "mouse_press",
            EventKind::MouseRelease { .. } => "mouse_release",
            EventKind::MouseMove { .. } => "mouse_move",
        }
    }
}

/// One captured input occurrence.
///
/// `offset` is relative to the start of the recording session that produced
/// it, never wall-clock. Within a macro, offsets are monotonically
/// non-decreasing in storage order.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Seconds since session start. Non-negative.
    pub offset: f64,
}

impl Event {
    /// Construct an event.
    pub fn new(kind: EventKind, offset: f64) -> Self {
        Self { kind, offset }
    }
}

/// The payload column of a wire record. Shape alone disambiguates: a string
/// is a key identifier, a 2-array is a position, a 3-array carries a button.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WirePayload {
    Key(String),
    Position(i32, i32),
    PositionButton(i32, i32, String),
}

impl Serialize for Event {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let payload = match &self.kind {
            EventKind::KeyPress { key } | EventKind::KeyRelease { key } => {
                WirePayload::Key(key.clone())
            }
            EventKind::MousePress { x, y, button } | EventKind::MouseRelease { x, y, button } => {
                WirePayload::PositionButton(*x, *y, button.name())
            }
            EventKind::MouseMove { x, y } => WirePayload::Position(*x, *y),
        };

        let mut record = serializer.serialize_tuple(3)?;
        record.serialize_element(self.kind.wire_kind())?;
        record.serialize_element(&payload)?;
        record.serialize_element(&self.offset)?;
        record.end()
    }
}

impl<'de> Deserialize<'de> for Event {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (kind, payload, offset) = <(String, WirePayload, f64)>::deserialize(deserializer)?;

        if offset < 0.0 || !offset.is_finite() {
            return Err(de::Error::custom(format!("invalid event offset {offset}")));
        }

        let kind = match (kind.as_str(), payload) {
            ("key_press", WirePayload::Key(key)) => EventKind::KeyPress { key },
            ("key_release", WirePayload::Key(key)) => EventKind::KeyRelease { key },
            ("mouse_press", WirePayload::PositionButton(x, y, name)) => {
                let button = Button::from_name(&name)
                    .ok_or_else(|| de::Error::custom(format!("unknown mouse button '{name}'")))?;
                EventKind::MousePress { x, y, button }
            }
            ("mouse_release", WirePayload::PositionButton(x, y, name)) => {
                let button = Button::from_name(&name)
                    .ok_or_else(|| de::Error::custom(format!("unknown mouse button '{name}'")))?;
                EventKind::MouseRelease { x, y, button }
            }
            ("mouse_move", WirePayload::Position(x, y)) => EventKind::MouseMove { x, y },
            (kind, _) => {
                return Err(de::Error::custom(format!(
                    "event kind '{kind}' does not match its payload shape"
                )));
            }
        };

        Ok(Event { kind, offset })
    }
}
