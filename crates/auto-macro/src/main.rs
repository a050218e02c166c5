//! Auto-Macro: record, replay, and hotkey-dispatch keyboard/mouse macros.

mod app;
mod app_command;
mod combo;
mod config;
mod console;
mod error;
mod hook_host;
mod hotkey_listener;
mod hotkey_registry;
mod presenter;
#[cfg(test)]
mod tests;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    combo::HotkeyCombo,
    error::{AppError, Result as AppResult},
    hook_host::{HookCommand, HookHost, HookTargets},
    hotkey_listener::HotkeyListener,
    hotkey_registry::HotkeyRegistry,
    presenter::{DesktopPresenter, Presenter},
};

use crate::{config::Config, console::ConsoleSurface};

use std::{collections::HashMap, sync::Arc};

use auto_macro_core::{CaptureOptions, MacroStore, Player, Recorder};
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::error;

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("auto_macro=debug,auto_macro_core=debug")
        .init();

    let event_loop = EventLoopBuilder::<HookCommand>::with_user_event().build();
    let proxy = event_loop.create_proxy();

    // Registry mutations arrive on a plain channel and are forwarded onto
    // the event loop, where the hook manager lives.
    let (hook_tx, hook_rx) = std::sync::mpsc::channel::<HookCommand>();
    std::thread::spawn(move || {
        while let Ok(command) = hook_rx.recv() {
            if proxy.send_event(command).is_err() {
                break;
            }
        }
    });

    let targets: HookTargets = Arc::new(std::sync::Mutex::new(HashMap::new()));

    // Both live on the main thread for the app's lifetime. The hook manager
    // needs the platform message pump tao provides; dropping it would
    // unregister every hotkey.
    let mut hook_host: Option<HookHost> = None;
    let mut hook_presenter: Option<Arc<dyn Presenter>> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(command) => match command {
                HookCommand::Reinstall(bindings) => {
                    if let Some(host) = hook_host.as_mut() {
                        for failure in host.apply(bindings) {
                            // Non-fatal: the pass already continued with the
                            // remaining entries.
                            error!(error = ?failure, "Hook registration failed");
                            if let Some(presenter) = &hook_presenter {
                                presenter.notify_error("Hotkey Error", &failure.to_string());
                            }
                        }
                    }
                }
                HookCommand::Shutdown => {
                    *control_flow = ControlFlow::ExitWithCode(0);
                }
            },
            Event::NewEvents(tao::event::StartCause::Init) => {
                let config = match Config::load() {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to load config: {:?}", e);
                        std::process::exit(1);
                    }
                };

                let (macro_dir, bindings_path) =
                    match (config.macro_dir(), config.bindings_path()) {
                        (Ok(dir), Ok(path)) => (dir, path),
                        (Err(e), _) | (_, Err(e)) => {
                            error!("Failed to resolve storage paths: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                let store = match MacroStore::new(&macro_dir) {
                    Ok(s) => Arc::new(s),
                    Err(e) => {
                        error!("Failed to open macro store: {:?}", e);
                        std::process::exit(1);
                    }
                };

                // Hook manager on the main thread -- tao's event loop pumps
                // the platform messages needed for hotkey delivery.
                let host = match HookHost::new(Arc::clone(&targets)) {
                    Ok(h) => h,
                    Err(e) => {
                        error!("Failed to create hotkey manager: {:?}", e);
                        std::process::exit(1);
                    }
                };
                hook_host = Some(host);

                let presenter: Arc<dyn Presenter> = Arc::new(DesktopPresenter::new(
                    Arc::clone(&store),
                    config.behaviour.desktop_notifications,
                ));
                hook_presenter = Some(Arc::clone(&presenter));

                let recorder = Arc::new(Recorder::new(CaptureOptions {
                    record_mouse_moves: config.capture.record_mouse_moves,
                }));
                let player = Arc::new(Player::new());
                let registry = Arc::new(HotkeyRegistry::new(bindings_path, hook_tx.clone()));

                let (command_tx, command_rx) = mpsc::channel(32);
                let (shutdown_tx, shutdown_rx) = watch::channel(false);

                // Console surface reads stdin on its own thread.
                {
                    let surface =
                        ConsoleSurface::new(command_tx.clone(), Arc::clone(&presenter));
                    std::thread::spawn(move || surface.run());
                }

                let targets = Arc::clone(&targets);
                let hook_tx = hook_tx.clone();

                // Tokio runtime on a separate thread; the hook host and the
                // event loop stay here on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        if let Err(e) = registry.bind_all_from_storage().await {
                            error!(error = ?e, "Failed to bind persisted hotkeys");
                            presenter.notify_error("Hotkey Error", &e.to_string());
                        }

                        let listener = HotkeyListener::new(targets, command_tx);

                        let app = App {
                            store,
                            recorder,
                            player,
                            registry,
                            presenter,
                            command_rx,
                            shutdown_tx,
                        };

                        tokio::join!(
                            async {
                                if let Err(e) = listener.run(shutdown_rx).await {
                                    error!(error = ?e, "Hotkey listener error");
                                }
                            },
                            async {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        );
                    });

                    // App loop ended: take the event loop down with it.
                    let _ = hook_tx.send(HookCommand::Shutdown);
                });
            }
            _ => {}
        }
    });
}
