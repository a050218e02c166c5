use auto_macro_core::CoreError;

use std::{panic::Location, result::Result as StdResult};

use error_location::ErrorLocation;
use thiserror::Error;

/// Application-level errors for the auto-macro binary.
///
/// All variants include `ErrorLocation` for call-site tracking.
#[derive(Error, Debug)]
pub enum AppError {
    /// Capture/replay engine error from auto-macro-core.
    #[error("Engine error: {source} {location}")]
    Core {
        /// The underlying engine error.
        #[source]
        source: CoreError,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// A hotkey combination string could not be parsed.
    #[error("Invalid hotkey '{combo}': {reason} {location}")]
    InvalidHotkey {
        /// The rejected combination string.
        combo: String,
        /// Why parsing failed.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The hotkey combination is already bound to a different macro.
    #[error("Hotkey '{combo}' is already bound to macro '{bound_to}' {location}")]
    DuplicateHotkey {
        /// The colliding combination.
        combo: String,
        /// The macro currently holding it.
        bound_to: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The OS declined a global hotkey registration.
    #[error("Hotkey registration failed: {reason} {location}")]
    HotkeyRegistrationFailed {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// The hotkey binding file could not be read or written.
    #[error("Binding store failed: {reason} {location}")]
    BindingStoreFailed {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Failed to send a message through an internal channel.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// Configuration loading or saving error.
    #[error("Configuration error: {reason} {location}")]
    ConfigError {
        /// Human-readable reason for failure.
        reason: String,
        /// Location where this error was created.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    IoError {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Location where this error was created.
        location: ErrorLocation,
    },
}

// Manual From<CoreError> with location tracking.
// Cannot use #[from] because it does not support extra fields.
impl From<CoreError> for AppError {
    #[track_caller]
    fn from(source: CoreError) -> Self {
        AppError::Core {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for AppError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        AppError::IoError {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Convenience type alias for Results using `AppError`.
pub type Result<T> = StdResult<T, AppError>;
