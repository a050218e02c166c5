use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Capture/replay engine errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No stored macro with the requested name.
    #[error("No macro found with name '{name}' {location}")]
    MacroNotFound {
        /// The requested macro name.
        name: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A macro with the target name already exists.
    #[error("A macro named '{name}' already exists {location}")]
    MacroAlreadyExists {
        /// The colliding macro name.
        name: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Macro name is empty or would escape the storage directory.
    #[error("Invalid macro name '{name}' {location}")]
    InvalidMacroName {
        /// The rejected name.
        name: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Filesystem read/write failure.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A macro file could not be serialized or parsed.
    #[error("Macro format error: {reason} {location}")]
    Format {
        /// Description of the format error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A capture session is already in progress.
    #[error("A recording session is already active {location}")]
    CaptureBusy {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A playback session is already in progress.
    #[error("A playback session is already active {location}")]
    PlaybackBusy {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The OS declined the low-level input hook registration.
    #[error("Input listener failed: {reason} {location}")]
    ListenerFailed {
        /// Description of the hook failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Synthetic input could not be delivered to the OS.
    #[error("Input dispatch failed: {reason} {location}")]
    Dispatch {
        /// Description of the dispatch failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for CoreError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        CoreError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        CoreError::Format {
            reason: source.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
