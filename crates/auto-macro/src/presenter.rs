//! Seam to the external presentation layer.
//!
//! The engine never assumes a specific UI toolkit; it needs exactly these
//! four operations. The default implementation pairs stdout/stdin with
//! desktop notifications.

use std::{
    io::{BufRead, Write},
    sync::Arc,
};

use auto_macro_core::MacroStore;
use notify_rust::Notification;
use tracing::{debug, warn};

/// Operations the engine needs from the presentation layer.
pub trait Presenter: Send + Sync {
    /// Ask the user for a string. `None` means cancelled or empty.
    fn prompt_for_string(&self, title: &str, message: &str) -> Option<String>;

    /// Show the user a result.
    fn notify_info(&self, title: &str, message: &str);

    /// Show the user an error.
    fn notify_error(&self, title: &str, message: &str);

    /// Names available for a selector, in display order.
    fn list_available_macro_names(&self) -> Vec<String>;
}

/// Default presenter: console prompts plus desktop notifications.
pub struct DesktopPresenter {
    store: Arc<MacroStore>,
    desktop_notifications: bool,
}

impl DesktopPresenter {
    /// Create a presenter listing names from `store`.
    pub fn new(store: Arc<MacroStore>, desktop_notifications: bool) -> Self {
        Self {
            store,
            desktop_notifications,
        }
    }

    /// Best-effort desktop toast. A headless environment without a
    /// notification daemon is not an error worth surfacing.
    fn toast(&self, title: &str, message: &str) {
        if !self.desktop_notifications {
            return;
        }

        if let Err(e) = Notification::new().summary(title).body(message).show() {
            debug!(error = %e, "Desktop notification failed");
        }
    }
}

impl Presenter for DesktopPresenter {
    fn prompt_for_string(&self, title: &str, message: &str) -> Option<String> {
        println!("{title}: {message}");
        print!("> ");
        let _ = std::io::stdout().flush();

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).ok()?;

        let line = line.trim();
        (!line.is_empty()).then(|| line.to_string())
    }

    fn notify_info(&self, title: &str, message: &str) {
        println!("[{title}] {message}");
        self.toast(title, message);
    }

    fn notify_error(&self, title: &str, message: &str) {
        eprintln!("[{title}] {message}");
        self.toast(title, message);
    }

    fn list_available_macro_names(&self) -> Vec<String> {
        self.store.list().unwrap_or_else(|e| {
            warn!(error = %e, "Could not list stored macros");
            Vec::new()
        })
    }
}
