use crate::config::default_desktop_notifications;

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Whether results and errors also surface as desktop notifications.
    #[serde(default = "default_desktop_notifications")]
    pub desktop_notifications: bool,
}
