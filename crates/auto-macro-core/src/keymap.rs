//! Symbolic key identifiers.
//!
//! Capture stores keys as strings: named keys get a canonical lowercase name
//! (`"esc"`, `"shift"`, `"f5"`), everything that types a character gets the
//! literal character (`"a"`, `"1"`, `"-"`). Playback resolves identifiers
//! through a fixed lookup table; an identifier that is not a known name
//! falls back to literal single-character dispatch.

use crate::event::Button;

/// Canonical identifier for a captured key.
pub(crate) fn key_identifier(key: rdev::Key) -> String {
    use rdev::Key::*;

    let name = match key {
        KeyA => "a",
        KeyB => "b",
        KeyC => "c",
        KeyD => "d",
        KeyE => "e",
        KeyF => "f",
        KeyG => "g",
        KeyH => "h",
        KeyI => "i",
        KeyJ => "j",
        KeyK => "k",
        KeyL => "l",
        KeyM => "m",
        KeyN => "n",
        KeyO => "o",
        KeyP => "p",
        KeyQ => "q",
        KeyR => "r",
        KeyS => "s",
        KeyT => "t",
        KeyU => "u",
        KeyV => "v",
        KeyW => "w",
        KeyX => "x",
        KeyY => "y",
        KeyZ => "z",
        Num0 | Kp0 => "0",
        Num1 | Kp1 => "1",
        Num2 | Kp2 => "2",
        Num3 | Kp3 => "3",
        Num4 | Kp4 => "4",
        Num5 | Kp5 => "5",
        Num6 | Kp6 => "6",
        Num7 | Kp7 => "7",
        Num8 | Kp8 => "8",
        Num9 | Kp9 => "9",
        BackQuote => "`",
        Minus | KpMinus => "-",
        Equal => "=",
        LeftBracket => "[",
        RightBracket => "]",
        SemiColon => ";",
        Quote => "'",
        BackSlash | IntlBackslash => "\\",
        Comma => ",",
        Dot => ".",
        Slash | KpDivide => "/",
        KpPlus => "+",
        KpMultiply => "*",
        Alt => "alt",
        AltGr => "alt_gr",
        Backspace => "backspace",
        CapsLock => "caps_lock",
        ControlLeft => "ctrl",
        ControlRight => "ctrl_right",
        Delete | KpDelete => "delete",
        DownArrow => "down",
        End => "end",
        Escape => "esc",
        F1 => "f1",
        F2 => "f2",
        F3 => "f3",
        F4 => "f4",
        F5 => "f5",
        F6 => "f6",
        F7 => "f7",
        F8 => "f8",
        F9 => "f9",
        F10 => "f10",
        F11 => "f11",
        F12 => "f12",
        Home => "home",
        Insert => "insert",
        LeftArrow => "left",
        MetaLeft => "meta",
        MetaRight => "meta_right",
        NumLock => "num_lock",
        PageDown => "page_down",
        PageUp => "page_up",
        Pause => "pause",
        PrintScreen => "print_screen",
        Return | KpReturn => "enter",
        RightArrow => "right",
        ScrollLock => "scroll_lock",
        ShiftLeft => "shift",
        ShiftRight => "shift_right",
        Space => "space",
        Tab => "tab",
        UpArrow => "up",
        Unknown(code) => return format!("unknown_{code}"),
        other => return format!("{other:?}").to_lowercase(),
    };

    name.to_string()
}

/// Resolve a named key identifier to a synthetic key.
///
/// Only covers keys enigo can deliver on every platform; the caller falls
/// back to literal-character dispatch for everything else.
fn named_key(identifier: &str) -> Option<enigo::Key> {
    use enigo::Key;

    let key = match identifier {
        "alt" => Key::Alt,
        "backspace" => Key::Backspace,
        "caps_lock" => Key::CapsLock,
        "ctrl" | "ctrl_right" => Key::Control,
        "delete" => Key::Delete,
        "down" => Key::DownArrow,
        "end" => Key::End,
        "enter" => Key::Return,
        "esc" => Key::Escape,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        "home" => Key::Home,
        "left" => Key::LeftArrow,
        "meta" | "meta_right" => Key::Meta,
        "page_down" => Key::PageDown,
        "page_up" => Key::PageUp,
        "right" => Key::RightArrow,
        "shift" | "shift_right" => Key::Shift,
        "space" => Key::Space,
        "tab" => Key::Tab,
        "up" => Key::UpArrow,
        _ => return None,
    };

    Some(key)
}

/// Resolve a stored key identifier for dispatch.
///
/// Named keys resolve by name; anything else that is a single character is
/// sent as character input. Multi-character identifiers that are not in the
/// table cannot be delivered and yield `None`.
pub(crate) fn resolve_key(identifier: &str) -> Option<enigo::Key> {
    if let Some(key) = named_key(identifier) {
        return Some(key);
    }

    let mut chars = identifier.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(enigo::Key::Unicode(c)),
        _ => None,
    }
}

/// Captured button for a low-level mouse event.
pub(crate) fn button_from_rdev(button: rdev::Button) -> Button {
    match button {
        rdev::Button::Left => Button::Left,
        rdev::Button::Right => Button::Right,
        rdev::Button::Middle => Button::Middle,
        rdev::Button::Unknown(code) => Button::Other(code),
    }
}

/// Synthetic button for playback. Non-standard buttons cannot be delivered.
pub(crate) fn button_to_enigo(button: Button) -> Option<enigo::Button> {
    match button {
        Button::Left => Some(enigo::Button::Left),
        Button::Right => Some(enigo::Button::Right),
        Button::Middle => Some(enigo::Button::Middle),
        Button::Other(_) => None,
    }
}
