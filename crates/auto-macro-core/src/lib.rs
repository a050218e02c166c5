//! Auto-Macro Core Library
//!
//! Input-macro capture and replay: record keyboard/mouse activity with
//! relative timestamps, persist named macros, and replay them with the
//! original pacing.
//!
//! # Example
//!
//! ```no_run
//! use auto_macro_core::{
//!     CancelToken, CaptureOptions, CoreResult, EnigoDispatcher, MacroStore, Player, Recorder,
//! };
//!
//! fn main() -> CoreResult<()> {
//!     let store = MacroStore::new("macros")?;
//!     let recorder = Recorder::new(CaptureOptions::default());
//!
//!     // Records until the Escape key is released.
//!     let events = recorder.record(&CancelToken::new())?;
//!     store.save("demo", &events)?;
//!
//!     let player = Player::new();
//!     let mut dispatcher = EnigoDispatcher::new()?;
//!     player.play(&store.load("demo")?, &CancelToken::new(), &mut dispatcher)?;
//!     Ok(())
//! }
//! ```

mod cancel;
mod capture;
mod error;
mod event;
mod keymap;
mod playback;
mod store;

pub use {
    cancel::CancelToken,
    capture::{CaptureOptions, Recorder},
    error::{CoreError, Result as CoreResult},
    event::{Button, Event, EventKind},
    playback::{Dispatcher, EnigoDispatcher, PlaybackOutcome, Player},
    store::MacroStore,
};

#[cfg(test)]
mod tests;
