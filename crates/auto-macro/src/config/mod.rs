mod behaviour_config;
mod capture_config;
#[allow(clippy::module_inception)]
mod config;
mod storage_config;

pub(crate) use {
    behaviour_config::BehaviourConfig, capture_config::CaptureConfig, config::Config,
    storage_config::StorageConfig,
};

pub(crate) const DEFAULT_DESKTOP_NOTIFICATIONS: bool = true;
pub(crate) const DEFAULT_RECORD_MOUSE_MOVES: bool = true;

pub(crate) fn default_desktop_notifications() -> bool {
    DEFAULT_DESKTOP_NOTIFICATIONS
}

pub(crate) fn default_record_mouse_moves() -> bool {
    DEFAULT_RECORD_MOUSE_MOVES
}
