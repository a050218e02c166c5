use crate::{AppCommand, AppError, AppResult, HotkeyRegistry, Presenter};

use std::sync::Arc;

use auto_macro_core::{
    CancelToken, CoreError, EnigoDispatcher, MacroStore, PlaybackOutcome, Player, Recorder,
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument};
use uuid::Uuid;

/// Main application state.
///
/// Runs on the async runtime thread, consuming [`AppCommand`]s from the
/// trigger surfaces (console and hotkey listener). Capture and playback
/// each run on their own blocking task so this loop, and therefore every
/// trigger, stays responsive.
pub struct App {
    pub(crate) store: Arc<MacroStore>,
    pub(crate) recorder: Arc<Recorder>,
    pub(crate) player: Arc<Player>,
    pub(crate) registry: Arc<HotkeyRegistry>,
    pub(crate) presenter: Arc<dyn Presenter>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl App {
    /// Run the main application command loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Auto-Macro starting");

        while let Some(command) = self.command_rx.recv().await {
            match command {
                AppCommand::StartCapture { name } => self.start_capture(name),
                AppCommand::Play { name } => self.start_playback(name),
                AppCommand::StopPlayback => self.player.stop(),
                AppCommand::AssignHotkey { name, combo } => {
                    self.assign_hotkey(name, combo).await;
                }
                AppCommand::RebindHotkey { name, combo } => {
                    self.rebind_hotkey(name, combo).await;
                }
                AppCommand::RenameMacro { old, new } => self.rename_macro(old, new).await,
                AppCommand::ListMacros => self.list_macros(),
                AppCommand::Shutdown => {
                    info!("Shutdown requested");
                    break;
                }
            }
        }

        let _ = self.shutdown_tx.send(true);
        info!("Auto-Macro shut down successfully");

        Ok(())
    }

    /// Start a capture session on a background task.
    ///
    /// The session ends when the user releases Escape; the buffered events
    /// are then persisted under `name` and the result surfaced.
    #[instrument(skip(self))]
    fn start_capture(&self, name: String) {
        let store = Arc::clone(&self.store);
        let recorder = Arc::clone(&self.recorder);
        let presenter = Arc::clone(&self.presenter);
        let session_id = Uuid::new_v4();

        tokio::task::spawn_blocking(move || {
            info!(session_id = %session_id, macro_name = %name, "Capture task started");
            presenter.notify_info(
                "Recording",
                &format!("Recording '{name}'. Release Escape to finish."),
            );

            let result = recorder
                .record(&CancelToken::new())
                .and_then(|events| store.save(&name, &events).map(|()| events.len()));

            match result {
                Ok(event_count) => {
                    info!(session_id = %session_id, event_count, "Capture saved");
                    presenter.notify_info(
                        "Recording Complete",
                        &format!("Macro '{name}' saved ({event_count} events)."),
                    );
                }
                Err(e) => {
                    error!(session_id = %session_id, error = ?e, "Capture failed");
                    presenter.notify_error("Recording Failed", &e.to_string());
                }
            }
        });
    }

    /// Load and play a macro on a background task.
    #[instrument(skip(self))]
    fn start_playback(&self, name: String) {
        let store = Arc::clone(&self.store);
        let player = Arc::clone(&self.player);
        let presenter = Arc::clone(&self.presenter);
        let session_id = Uuid::new_v4();

        tokio::task::spawn_blocking(move || {
            // Enigo is not Send, so the dispatcher is created inside the
            // blocking task rather than before spawning it.
            let result = store.load(&name).and_then(|events| {
                let mut dispatcher = EnigoDispatcher::new()?;
                player.play(&events, &CancelToken::new(), &mut dispatcher)
            });

            match result {
                Ok(PlaybackOutcome::Completed { dispatched }) => {
                    info!(session_id = %session_id, dispatched, "Playback completed");
                }
                Ok(PlaybackOutcome::Cancelled { dispatched }) => {
                    info!(session_id = %session_id, dispatched, "Playback stopped early");
                }
                Err(CoreError::MacroNotFound { .. }) => {
                    presenter
                        .notify_error("Error", &format!("No macro found with name '{name}'"));
                }
                Err(e) => {
                    error!(session_id = %session_id, error = ?e, "Playback failed");
                    presenter.notify_error("Playback Failed", &e.to_string());
                }
            }
        });
    }

    #[instrument(skip(self))]
    async fn assign_hotkey(&self, name: String, combo: String) {
        match self.registry.assign(&name, &combo, true).await {
            Ok(canonical) => self.presenter.notify_info(
                "Hotkey Assigned",
                &format!("Hotkey '{canonical}' assigned to '{name}'."),
            ),
            Err(e) => self.presenter.notify_error("Hotkey Error", &e.to_string()),
        }
    }

    #[instrument(skip(self))]
    async fn rebind_hotkey(&self, name: String, combo: String) {
        let current = self.registry.binding_for(&name).await;
        match self.registry.rebind(&name, &combo).await {
            Ok(canonical) => {
                let previous = current.unwrap_or_else(|| "nothing".to_string());
                self.presenter.notify_info(
                    "Hotkey Rebound",
                    &format!("Macro '{name}' is now bound to '{canonical}' (was {previous})."),
                );
            }
            Err(e) => self.presenter.notify_error("Hotkey Error", &e.to_string()),
        }
    }

    /// Rename a macro, migrating its hotkey binding if it has one.
    #[instrument(skip(self))]
    async fn rename_macro(&self, old: String, new: String) {
        if let Err(e) = self.store.rename(&old, &new) {
            let e = AppError::from(e);
            self.presenter.notify_error("Rename Failed", &e.to_string());
            return;
        }

        match self.registry.handle_rename(&old, &new).await {
            Ok(migrated) => {
                info!(old, new, migrated, "Macro renamed");
                self.presenter
                    .notify_info("Macro Renamed", &format!("'{old}' is now '{new}'."));
            }
            Err(e) => {
                // The store rename already happened; the binding is the
                // part left inconsistent, so say exactly that.
                error!(old, new, error = ?e, "Binding migration failed after rename");
                self.presenter.notify_error(
                    "Hotkey Error",
                    &format!("Macro renamed, but migrating its hotkey failed: {e}"),
                );
            }
        }
    }

    fn list_macros(&self) {
        let names = self.presenter.list_available_macro_names();
        if names.is_empty() {
            self.presenter.notify_info("Stored Macros", "none");
        } else {
            self.presenter
                .notify_info("Stored Macros", &names.join(", "));
        }
    }
}
