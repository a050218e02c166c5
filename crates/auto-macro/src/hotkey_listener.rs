//! Global hotkey trigger listener.
//!
//! Resolves hook ids to macro names and fires playback commands. Dispatch
//! is fire-and-forget: the hook path never waits on the application loop.

use crate::{AppCommand, AppResult, HookTargets};

use std::time::Duration;

use global_hotkey::{GlobalHotKeyEvent, HotKeyState};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

/// Listens for global hotkey triggers and dispatches playback.
pub struct HotkeyListener {
    targets: HookTargets,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyListener {
    /// Create a listener over the shared hook-id map.
    ///
    /// This struct is `Send` and can live on any thread -- it only listens
    /// on the global [`GlobalHotKeyEvent`] channel; the hooks themselves
    /// stay with the main-thread host.
    pub fn new(targets: HookTargets, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self {
            targets,
            command_tx,
        }
    }

    /// Run the listener event loop.
    ///
    /// This method blocks until a shutdown signal is received.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // Single persistent blocking task that forwards hotkey events.
        // GlobalHotKeyEvent::receiver() returns a crossbeam_channel::Receiver
        // which has blocking recv() -- zero polling, instant response, one thread.
        //
        // Shutdown: when event_rx is dropped (loop breaks), the next
        // event_tx.blocking_send() fails, breaking the blocking loop.
        // The JoinHandle is awaited with a timeout after the main loop exits.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey listener shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    if event.state == HotKeyState::Pressed {
                        self.handle_trigger(event.id);
                    }
                }
            }
        }

        // Drop event_rx to unblock the blocking task's next blocking_send().
        // The task will break out of its loop when blocking_send returns Err.
        drop(event_rx);

        // Best-effort join: the blocking task may be stuck in recv() if no
        // hotkey event arrives after shutdown. Use a timeout to avoid hanging.
        // The task is cleaned up by the runtime on process exit regardless.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    /// Resolve the hook id and fire playback without waiting on it.
    fn handle_trigger(&self, id: u32) {
        let name = {
            let targets = self.targets.lock().unwrap_or_else(|e| {
                error!("Hook target lock poisoned, recovering: {}", e);
                e.into_inner()
            });
            targets.get(&id).cloned()
        };

        let Some(name) = name else {
            // A trigger can race a reinstall that just removed its hook.
            debug!(id, "Trigger for unknown hook id, ignoring");
            return;
        };

        match self.command_tx.try_send(AppCommand::Play { name: name.clone() }) {
            Ok(()) => info!(macro_name = %name, "Hotkey trigger dispatched"),
            Err(e) => warn!(
                macro_name = %name,
                error = %e,
                "Dropped hotkey trigger, command queue unavailable"
            ),
        }
    }
}
