use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Storage location overrides.
///
/// Both default to the platform data directory when unset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per macro.
    #[serde(default)]
    pub macro_dir: Option<PathBuf>,
    /// File holding the full hotkey binding set.
    #[serde(default)]
    pub bindings_file: Option<PathBuf>,
}
