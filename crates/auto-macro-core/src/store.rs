//! Durable macro storage.
//!
//! One JSON file per macro under the storage directory, named
//! `<macro name>.json`. Writes go through a temp file and rename so a macro
//! is never observable half-written.

use crate::{
    CoreError,
    error::Result,
    event::Event,
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

const MACRO_EXTENSION: &str = "json";

/// Directory-backed store of named macros.
pub struct MacroStore {
    dir: PathBuf,
}

impl MacroStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    #[track_caller]
    #[instrument(skip(dir))]
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        info!(dir = ?dir, "Macro store opened");

        Ok(Self { dir })
    }

    /// Persist `events` under `name`, overwriting any existing macro.
    #[track_caller]
    #[instrument(skip(self, events))]
    pub fn save(&self, name: &str, events: &[Event]) -> Result<()> {
        let path = self.path_for(name)?;
        let contents = serde_json::to_vec(events)?;

        // Atomic write: temp file in the same directory, then rename.
        let temp_path = path.with_extension("json.tmp");

        let mut temp_file = fs::File::create(&temp_path)?;
        temp_file.write_all(&contents)?;
        temp_file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        info!(name, event_count = events.len(), "Macro saved");

        Ok(())
    }

    /// Load the macro stored under `name`.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn load(&self, name: &str) -> Result<Vec<Event>> {
        let path = self.path_for(name)?;

        if !path.exists() {
            return Err(CoreError::MacroNotFound {
                name: name.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let contents = fs::read(&path)?;
        let events: Vec<Event> = serde_json::from_slice(&contents)?;

        debug!(name, event_count = events.len(), "Macro loaded");

        Ok(events)
    }

    /// Change a macro's identity from `old` to `new`.
    ///
    /// Fails without touching anything if `new` already names a macro or
    /// `old` does not exist. Any hotkey binding referencing `old` must be
    /// migrated by the caller.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn rename(&self, old: &str, new: &str) -> Result<()> {
        let old_path = self.path_for(old)?;
        let new_path = self.path_for(new)?;

        if !old_path.exists() {
            return Err(CoreError::MacroNotFound {
                name: old.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        if new_path.exists() {
            return Err(CoreError::MacroAlreadyExists {
                name: new.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        fs::rename(&old_path, &new_path)?;

        info!(old, new, "Macro renamed");

        Ok(())
    }

    /// Names of all stored macros, sorted for stable display.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_macro = path.extension().and_then(|e| e.to_str()) == Some(MACRO_EXTENSION);
            if !is_macro {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Storage file for `name`, after validating the name cannot escape the
    /// storage directory.
    #[track_caller]
    fn path_for(&self, name: &str) -> Result<PathBuf> {
        let valid = !name.is_empty()
            && name != ".."
            && !name.starts_with('.')
            && !name.contains(['/', '\\']);

        if !valid {
            return Err(CoreError::InvalidMacroName {
                name: name.to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(self.dir.join(format!("{name}.{MACRO_EXTENSION}")))
    }
}
