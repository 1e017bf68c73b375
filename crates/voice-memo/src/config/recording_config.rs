use crate::config::default_recording_path;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Recording slot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// The single recording file, overwritten by every recording.
    #[serde(default = "default_recording_path")]
    pub file_path: PathBuf,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            file_path: default_recording_path(),
        }
    }
}
