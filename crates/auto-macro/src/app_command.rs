/// Commands sent from trigger surfaces (console, hotkey listener) to the
/// main application.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Start a capture session and save it under `name` when it completes.
    StartCapture {
        /// Name the finished macro is stored under.
        name: String,
    },
    /// Load the named macro and play it back.
    Play {
        /// Name of the stored macro.
        name: String,
    },
    /// Cancel the active playback run, if any.
    StopPlayback,
    /// Bind a hotkey to a macro and install the hook.
    AssignHotkey {
        /// Target macro name.
        name: String,
        /// Hotkey combination string, e.g. `"ctrl+alt+1"`.
        combo: String,
    },
    /// Replace a macro's binding and reinstall every hook.
    RebindHotkey {
        /// Target macro name.
        name: String,
        /// Replacement combination string.
        combo: String,
    },
    /// Change a macro's identity, migrating any hotkey binding.
    RenameMacro {
        /// Current name.
        old: String,
        /// New name.
        new: String,
    },
    /// Show the stored macro names.
    ListMacros,
    /// Request application shutdown.
    Shutdown,
}
