//! Interactive console surface.
//!
//! A minimal line-oriented stand-in for the presentation layer: it parses
//! trigger commands from stdin and feeds them to the application loop. The
//! engine itself only ever sees [`AppCommand`]s and the [`Presenter`] trait,
//! so richer surfaces can replace this without touching the core.

use crate::{AppCommand, Presenter};

use std::{io::Write, sync::Arc};

use tokio::sync::mpsc;
use tracing::warn;

const HELP: &str = "\
commands:
  record [name]        record a new macro (recording ends on Escape release)
  play [name]          play a stored macro
  stop                 stop the active playback
  bind [name]          assign a global hotkey (e.g. ctrl+alt+1)
  rebind [name]        replace a macro's hotkey
  rename [name]        rename a macro
  list                 show stored macros
  help                 show this help
  quit                 exit";

enum Flow {
    Continue,
    Quit,
}

/// Reads trigger commands from stdin and forwards them as [`AppCommand`]s.
pub struct ConsoleSurface {
    command_tx: mpsc::Sender<AppCommand>,
    presenter: Arc<dyn Presenter>,
}

impl ConsoleSurface {
    /// Create a surface feeding `command_tx`.
    pub fn new(command_tx: mpsc::Sender<AppCommand>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            command_tx,
            presenter,
        }
    }

    /// Read lines until quit or EOF. Blocking; run on a dedicated thread.
    pub fn run(&self) {
        println!("auto-macro ready. Type 'help' for commands.");

        let stdin = std::io::stdin();
        let mut line = String::new();

        loop {
            print!("auto-macro> ");
            let _ = std::io::stdout().flush();

            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) => {
                    // EOF: treat like quit so the process shuts down cleanly.
                    self.send(AppCommand::Shutdown);
                    break;
                }
                Ok(_) => {
                    if let Flow::Quit = self.handle_line(line.trim()) {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read console input");
                    self.send(AppCommand::Shutdown);
                    break;
                }
            }
        }
    }

    fn handle_line(&self, line: &str) -> Flow {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_string());

        match command {
            "" => {}
            "record" => {
                let name = argument.or_else(|| {
                    self.presenter
                        .prompt_for_string("Macro Name", "Enter a name for the new macro")
                });
                if let Some(name) = name {
                    self.send(AppCommand::StartCapture { name });
                }
            }
            "play" => {
                if let Some(name) = argument.or_else(|| self.pick_macro()) {
                    self.send(AppCommand::Play { name });
                }
            }
            "stop" => self.send(AppCommand::StopPlayback),
            "bind" => {
                let Some(name) = argument.or_else(|| self.pick_macro()) else {
                    return Flow::Continue;
                };
                let prompt = format!("Assign a hotkey for '{name}' (e.g. ctrl+alt+1)");
                if let Some(combo) = self.presenter.prompt_for_string("Hotkey", &prompt) {
                    self.send(AppCommand::AssignHotkey { name, combo });
                }
            }
            "rebind" => {
                let Some(name) = argument.or_else(|| self.pick_macro()) else {
                    return Flow::Continue;
                };
                let prompt = format!("Enter a new hotkey for '{name}' (e.g. ctrl+alt+2)");
                if let Some(combo) = self.presenter.prompt_for_string("Rebind Hotkey", &prompt) {
                    self.send(AppCommand::RebindHotkey { name, combo });
                }
            }
            "rename" => {
                let Some(old) = argument.or_else(|| self.pick_macro()) else {
                    return Flow::Continue;
                };
                let prompt = format!("Enter a new name for '{old}'");
                if let Some(new) = self.presenter.prompt_for_string("Rename Macro", &prompt) {
                    self.send(AppCommand::RenameMacro { old, new });
                }
            }
            "list" => self.send(AppCommand::ListMacros),
            "help" => println!("{HELP}"),
            "quit" | "exit" => {
                self.send(AppCommand::Shutdown);
                return Flow::Quit;
            }
            other => println!("unknown command '{other}', type 'help'"),
        }

        Flow::Continue
    }

    /// Number-or-name selector over the stored macros.
    fn pick_macro(&self) -> Option<String> {
        let names = self.presenter.list_available_macro_names();
        if names.is_empty() {
            self.presenter.notify_error("Error", "No macros stored yet.");
            return None;
        }

        for (i, name) in names.iter().enumerate() {
            println!("  {}: {name}", i + 1);
        }

        let answer = self
            .presenter
            .prompt_for_string("Select Macro", "Enter a macro name or number")?;

        match answer.parse::<usize>() {
            Ok(n) if n >= 1 && n <= names.len() => Some(names[n - 1].clone()),
            _ => Some(answer),
        }
    }

    fn send(&self, command: AppCommand) {
        if let Err(e) = self.command_tx.blocking_send(command) {
            warn!(error = %e, "Application loop is gone, dropping command");
        }
    }
}
