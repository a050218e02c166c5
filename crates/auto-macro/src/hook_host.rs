//! Main-thread owner of the OS-level hotkey hooks.
//!
//! `GlobalHotKeyManager` must be created on the thread that pumps platform
//! messages and stay there, so the host lives inside the tao event loop and
//! receives registry mutations as user events. The hook mechanism does not
//! support selective updates safely; every mutation ships the full desired
//! set and the host reconciles by uninstalling everything and installing
//! one hook per entry.

use crate::{AppError, AppResult, HotkeyCombo};

use std::{
    collections::HashMap,
    panic::Location,
    sync::{Arc, Mutex, MutexGuard},
};

use error_location::ErrorLocation;
use global_hotkey::{GlobalHotKeyManager, hotkey::HotKey};
use tracing::{error, info, instrument, warn};

/// Commands marshaled onto the main thread's event loop.
#[derive(Debug)]
pub enum HookCommand {
    /// Replace every live hook with one per entry of the desired set.
    Reinstall(Vec<(String, HotkeyCombo)>),
    /// Exit the process event loop.
    Shutdown,
}

/// Live hook id -> macro name, shared with the hotkey listener task.
pub type HookTargets = Arc<Mutex<HashMap<u32, String>>>;

/// Owns the hotkey manager and the set of live hooks.
pub struct HookHost {
    manager: GlobalHotKeyManager,
    installed: Vec<HotKey>,
    targets: HookTargets,
}

impl HookHost {
    /// Create the manager on the calling (main) thread.
    #[track_caller]
    #[instrument(skip(targets))]
    pub fn new(targets: HookTargets) -> AppResult<Self> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("Hotkey hook host initialized");

        Ok(Self {
            manager,
            installed: Vec::new(),
            targets,
        })
    }

    /// Uninstall every live hook, then install one per entry.
    ///
    /// Individual registration failures are collected and the pass continues
    /// with the remaining entries, so the live set converges to the desired
    /// set minus only the failures. Returns the failures for surfacing.
    #[track_caller]
    #[instrument(skip_all, fields(binding_count = bindings.len()))]
    pub fn apply(&mut self, bindings: Vec<(String, HotkeyCombo)>) -> Vec<AppError> {
        for hotkey in self.installed.drain(..) {
            if let Err(e) = self.manager.unregister(hotkey) {
                warn!(error = %e, "Failed to unregister hook");
            }
        }

        let mut targets = Self::lock_targets(&self.targets);
        targets.clear();

        let mut failures = Vec::new();
        for (name, combo) in bindings {
            let hotkey = combo.to_hotkey();
            match self.manager.register(hotkey) {
                Ok(()) => {
                    targets.insert(hotkey.id(), name);
                    self.installed.push(hotkey);
                }
                Err(e) => {
                    failures.push(AppError::HotkeyRegistrationFailed {
                        reason: format!("'{combo}' for macro '{name}': {e}"),
                        location: ErrorLocation::from(Location::caller()),
                    });
                }
            }
        }

        info!(
            installed = self.installed.len(),
            failed = failures.len(),
            "Hook reinstall applied"
        );

        failures
    }

    fn lock_targets(targets: &HookTargets) -> MutexGuard<'_, HashMap<u32, String>> {
        targets.lock().unwrap_or_else(|e| {
            error!("Hook target lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}
