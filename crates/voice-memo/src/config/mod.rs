mod recording_config;
#[allow(clippy::module_inception)]
mod config;
mod timing_config;
mod visualization_config;

pub(crate) use {
    config::Config, recording_config::RecordingConfig, timing_config::TimingConfig,
    visualization_config::VisualizationConfig,
};

use std::path::PathBuf;

use directories::ProjectDirs;

pub(crate) const QUALIFIER: &str = "com";
pub(crate) const ORGANIZATION: &str = "voice-memo";
pub(crate) const APPLICATION: &str = "Voice-Memo";

pub(crate) const RECORDING_FILE_NAME: &str = "recording.wav";
pub(crate) const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;
pub(crate) const DEFAULT_SAMPLE_INTERVAL_MS: u64 = DEFAULT_TICK_INTERVAL_MS;
pub(crate) const DEFAULT_HISTORY_LEN: usize = 64;
pub(crate) const DEFAULT_MAX_AMPLITUDE: u32 = voice_memo_core::FULL_SCALE_AMPLITUDE;
pub(crate) const DEFAULT_SPARKLINE_WIDTH: usize = 16;

pub(crate) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// `<data dir>/recording.wav`, or a relative path when the platform has no
/// data directory.
pub(crate) fn default_recording_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(RECORDING_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(RECORDING_FILE_NAME))
}

pub(crate) fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

pub(crate) fn default_sample_interval_ms() -> u64 {
    DEFAULT_SAMPLE_INTERVAL_MS
}

pub(crate) fn default_history_len() -> usize {
    DEFAULT_HISTORY_LEN
}

pub(crate) fn default_max_amplitude() -> u32 {
    DEFAULT_MAX_AMPLITUDE
}

pub(crate) fn default_sparkline_width() -> usize {
    DEFAULT_SPARKLINE_WIDTH
}
