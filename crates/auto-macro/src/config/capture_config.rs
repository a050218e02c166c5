use crate::config::default_record_mouse_moves;

use serde::{Deserialize, Serialize};

/// Capture behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Whether pointer motion is recorded. Clicks always carry their
    /// position either way; disabling this keeps macros small.
    #[serde(default = "default_record_mouse_moves")]
    pub record_mouse_moves: bool,
}
