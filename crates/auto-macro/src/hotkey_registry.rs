//! Persistent macro-name -> hotkey bindings and the reinstall protocol.
//!
//! The binding set is a JSON map keyed by macro name, rewritten wholesale
//! on every mutation. Every mutation runs inside one critical section that
//! ends by shipping the full desired hook set to the main-thread hook host,
//! so the live hooks always equal the persisted bindings -- no orphans, no
//! duplicates, and no window where a concurrent mutation observes a
//! half-reinstalled set.

use crate::{AppError, AppResult, HookCommand, HotkeyCombo};

use std::{
    collections::HashMap,
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
    sync::mpsc::Sender,
};

use error_location::ErrorLocation;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Macro-name keyed hotkey bindings, persisted to a single JSON file.
pub struct HotkeyRegistry {
    path: PathBuf,
    /// Macro name -> canonical combo string. Authoritative once loaded;
    /// the file mirrors it after every mutation.
    bindings: Mutex<HashMap<String, String>>,
    hook_tx: Sender<HookCommand>,
}

impl HotkeyRegistry {
    /// Create a registry over the binding file at `path`.
    ///
    /// Nothing is read or installed until [`bind_all_from_storage`] runs.
    ///
    /// [`bind_all_from_storage`]: HotkeyRegistry::bind_all_from_storage
    pub fn new(path: PathBuf, hook_tx: Sender<HookCommand>) -> Self {
        Self {
            path,
            bindings: Mutex::new(HashMap::new()),
            hook_tx,
        }
    }

    /// Read the full persisted binding set. A missing file is an empty set.
    #[track_caller]
    pub fn load_all(&self) -> AppResult<HashMap<String, String>> {
        load_bindings(&self.path)
    }

    /// Rewrite the full persisted binding set.
    #[track_caller]
    pub fn persist_all(&self, bindings: &HashMap<String, String>) -> AppResult<()> {
        persist_bindings(&self.path, bindings)
    }

    /// Startup path: load the persisted set and install one hook per entry
    /// without re-persisting.
    #[instrument(skip(self))]
    pub async fn bind_all_from_storage(&self) -> AppResult<()> {
        let loaded = self.load_all()?;

        let mut bindings = self.bindings.lock().await;
        *bindings = loaded;

        info!(binding_count = bindings.len(), "Persisted hotkeys loaded");

        self.reinstall(&bindings)
    }

    /// Bind `combo` to `name`, then reinstall every hook.
    ///
    /// Fails with [`AppError::DuplicateHotkey`] if the combo is already
    /// held by a different macro. Returns the canonical combo string.
    #[track_caller]
    #[instrument(skip(self))]
    pub async fn assign(&self, name: &str, combo: &str, persist: bool) -> AppResult<String> {
        let parsed = HotkeyCombo::parse(combo)?;
        let canonical = parsed.canonical();

        let mut bindings = self.bindings.lock().await;

        if let Some((holder, _)) = bindings
            .iter()
            .find(|(n, c)| c.as_str() == canonical && n.as_str() != name)
        {
            return Err(AppError::DuplicateHotkey {
                combo: canonical,
                bound_to: holder.clone(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        bindings.insert(name.to_string(), canonical.clone());

        if persist {
            self.persist_all(&bindings)?;
        }
        self.reinstall(&bindings)?;

        info!(macro_name = name, combo = %canonical, "Hotkey assigned");

        Ok(canonical)
    }

    /// Replace the binding for `name`, persist the replacement, and
    /// reinstall every hook.
    #[track_caller]
    pub async fn rebind(&self, name: &str, combo: &str) -> AppResult<String> {
        self.assign(name, combo, true).await
    }

    /// The combo currently bound to `name`, if any.
    pub async fn binding_for(&self, name: &str) -> Option<String> {
        self.bindings.lock().await.get(name).cloned()
    }

    /// Rename propagation: move a binding from `old` to `new`, persist, and
    /// reinstall. Returns whether a binding was moved.
    #[track_caller]
    #[instrument(skip(self))]
    pub async fn handle_rename(&self, old: &str, new: &str) -> AppResult<bool> {
        let mut bindings = self.bindings.lock().await;

        let Some(combo) = bindings.remove(old) else {
            return Ok(false);
        };
        bindings.insert(new.to_string(), combo);

        self.persist_all(&bindings)?;
        self.reinstall(&bindings)?;

        info!(old, new, "Hotkey binding migrated");

        Ok(true)
    }

    /// Ship the desired hook set to the main-thread host.
    ///
    /// Called with the binding lock held, which makes the persist+reinstall
    /// pair a critical section. Entries that no longer parse (hand-edited
    /// file) are skipped with a warning rather than failing the pass.
    #[track_caller]
    fn reinstall(&self, bindings: &HashMap<String, String>) -> AppResult<()> {
        let mut desired = Vec::with_capacity(bindings.len());
        for (name, combo) in bindings {
            match HotkeyCombo::parse(combo) {
                Ok(parsed) => desired.push((name.clone(), parsed)),
                Err(e) => warn!(
                    macro_name = %name,
                    combo = %combo,
                    error = %e,
                    "Skipping unparseable persisted binding"
                ),
            }
        }

        self.hook_tx
            .send(HookCommand::Reinstall(desired))
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send hook reinstall: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

#[track_caller]
fn load_bindings(path: &Path) -> AppResult<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let contents = fs::read_to_string(path).map_err(|e| AppError::BindingStoreFailed {
        reason: format!("Failed to read {path:?}: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    serde_json::from_str(&contents).map_err(|e| AppError::BindingStoreFailed {
        reason: format!("Failed to parse {path:?}: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}

#[track_caller]
fn persist_bindings(path: &Path, bindings: &HashMap<String, String>) -> AppResult<()> {
    let contents =
        serde_json::to_string_pretty(bindings).map_err(|e| AppError::BindingStoreFailed {
            reason: format!("Failed to serialize bindings: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

    // Atomic write: temp file then rename, so the binding file is never
    // observable half-written.
    let temp_path = path.with_extension("json.tmp");

    let write_all = || -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut temp_file = fs::File::create(&temp_path)?;
        temp_file.write_all(contents.as_bytes())?;
        temp_file.sync_all()?;
        fs::rename(&temp_path, path)
    };

    write_all().map_err(|e| AppError::BindingStoreFailed {
        reason: format!("Failed to write {path:?}: {e}"),
        location: ErrorLocation::from(Location::caller()),
    })
}
