//! Hotkey combination strings.
//!
//! Users write combinations like `"ctrl+alt+1"`: zero or more modifier
//! tokens followed by exactly one key token, joined with `+`. Parsing is
//! case-insensitive and whitespace-tolerant; the canonical form (stable
//! modifier order, lowercase tokens) is what gets persisted and compared.

use crate::{AppError, AppResult};

use std::{fmt, panic::Location};

use error_location::ErrorLocation;
use global_hotkey::hotkey::{Code, HotKey, Modifiers};

/// A parsed, normalized hotkey combination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyCombo {
    modifiers: Modifiers,
    code: Code,
    key_token: &'static str,
}

impl HotkeyCombo {
    /// Parse a user-written combination string.
    #[track_caller]
    pub fn parse(combo: &str) -> AppResult<Self> {
        let tokens: Vec<String> = combo
            .split('+')
            .map(|t| t.trim().to_lowercase())
            .collect();

        let Some((key_token, modifier_tokens)) = tokens.split_last() else {
            return Err(invalid(combo, "empty combination"));
        };

        if key_token.is_empty() {
            return Err(invalid(combo, "missing key token"));
        }

        let mut modifiers = Modifiers::empty();
        for token in modifier_tokens {
            let modifier = match token.as_str() {
                "ctrl" | "control" => Modifiers::CONTROL,
                "alt" | "option" => Modifiers::ALT,
                "shift" => Modifiers::SHIFT,
                "cmd" | "command" | "super" | "meta" | "win" => Modifiers::META,
                other => return Err(invalid(combo, &format!("unknown modifier '{other}'"))),
            };
            modifiers |= modifier;
        }

        let (code, key_token) = key_code(key_token)
            .ok_or_else(|| invalid(combo, &format!("unknown key '{key_token}'")))?;

        Ok(Self {
            modifiers,
            code,
            key_token,
        })
    }

    /// The OS-level registration for this combination.
    pub fn to_hotkey(&self) -> HotKey {
        let modifiers = (!self.modifiers.is_empty()).then_some(self.modifiers);
        HotKey::new(modifiers, self.code)
    }

    /// Canonical string form: modifiers in a fixed order, then the key.
    pub fn canonical(&self) -> String {
        let mut parts = Vec::new();
        if self.modifiers.contains(Modifiers::CONTROL) {
            parts.push("ctrl");
        }
        if self.modifiers.contains(Modifiers::ALT) {
            parts.push("alt");
        }
        if self.modifiers.contains(Modifiers::SHIFT) {
            parts.push("shift");
        }
        if self.modifiers.contains(Modifiers::META) {
            parts.push("cmd");
        }
        parts.push(self.key_token);
        parts.join("+")
    }
}

impl fmt::Display for HotkeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[track_caller]
fn invalid(combo: &str, reason: &str) -> AppError {
    AppError::InvalidHotkey {
        combo: combo.to_string(),
        reason: reason.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}

/// Key token table. Returns the code plus the canonical spelling of the
/// token so `canonical()` never re-derives it.
fn key_code(token: &str) -> Option<(Code, &'static str)> {
    let entry = match token {
        "a" => (Code::KeyA, "a"),
        "b" => (Code::KeyB, "b"),
        "c" => (Code::KeyC, "c"),
        "d" => (Code::KeyD, "d"),
        "e" => (Code::KeyE, "e"),
        "f" => (Code::KeyF, "f"),
        "g" => (Code::KeyG, "g"),
        "h" => (Code::KeyH, "h"),
        "i" => (Code::KeyI, "i"),
        "j" => (Code::KeyJ, "j"),
        "k" => (Code::KeyK, "k"),
        "l" => (Code::KeyL, "l"),
        "m" => (Code::KeyM, "m"),
        "n" => (Code::KeyN, "n"),
        "o" => (Code::KeyO, "o"),
        "p" => (Code::KeyP, "p"),
        "q" => (Code::KeyQ, "q"),
        "r" => (Code::KeyR, "r"),
        "s" => (Code::KeyS, "s"),
        "t" => (Code::KeyT, "t"),
        "u" => (Code::KeyU, "u"),
        "v" => (Code::KeyV, "v"),
        "w" => (Code::KeyW, "w"),
        "x" => (Code::KeyX, "x"),
        "y" => (Code::KeyY, "y"),
        "z" => (Code::KeyZ, "z"),
        "0" => (Code::Digit0, "0"),
        "1" => (Code::Digit1, "1"),
        "2" => (Code::Digit2, "2"),
        "3" => (Code::Digit3, "3"),
        "4" => (Code::Digit4, "4"),
        "5" => (Code::Digit5, "5"),
        "6" => (Code::Digit6, "6"),
        "7" => (Code::Digit7, "7"),
        "8" => (Code::Digit8, "8"),
        "9" => (Code::Digit9, "9"),
        "f1" => (Code::F1, "f1"),
        "f2" => (Code::F2, "f2"),
        "f3" => (Code::F3, "f3"),
        "f4" => (Code::F4, "f4"),
        "f5" => (Code::F5, "f5"),
        "f6" => (Code::F6, "f6"),
        "f7" => (Code::F7, "f7"),
        "f8" => (Code::F8, "f8"),
        "f9" => (Code::F9, "f9"),
        "f10" => (Code::F10, "f10"),
        "f11" => (Code::F11, "f11"),
        "f12" => (Code::F12, "f12"),
        "space" => (Code::Space, "space"),
        "enter" | "return" => (Code::Enter, "enter"),
        "tab" => (Code::Tab, "tab"),
        "esc" | "escape" => (Code::Escape, "esc"),
        "backspace" => (Code::Backspace, "backspace"),
        "delete" => (Code::Delete, "delete"),
        "insert" => (Code::Insert, "insert"),
        "home" => (Code::Home, "home"),
        "end" => (Code::End, "end"),
        "page_up" | "pageup" => (Code::PageUp, "page_up"),
        "page_down" | "pagedown" => (Code::PageDown, "page_down"),
        "up" => (Code::ArrowUp, "up"),
        "down" => (Code::ArrowDown, "down"),
        "left" => (Code::ArrowLeft, "left"),
        "right" => (Code::ArrowRight, "right"),
        "-" | "minus" => (Code::Minus, "-"),
        "=" | "equal" => (Code::Equal, "="),
        "," | "comma" => (Code::Comma, ","),
        "." | "period" => (Code::Period, "."),
        "/" | "slash" => (Code::Slash, "/"),
        "`" | "backquote" => (Code::Backquote, "`"),
        _ => return None,
    };

    Some(entry)
}
