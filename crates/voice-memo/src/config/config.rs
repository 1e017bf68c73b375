//! Configuration management for voice-memo.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, validation, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{RecordingConfig, TimingConfig, VisualizationConfig, project_dirs},
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
///
/// Every section and field falls back to its default when missing, so a
/// partial file written by hand still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Recording slot.
    #[serde(default)]
    pub recording: RecordingConfig,
    /// Ticker and sampler intervals.
    #[serde(default)]
    pub timing: TimingConfig,
    /// Amplitude history and sparkline.
    #[serde(default)]
    pub visualization: VisualizationConfig,
}

impl Config {
    /// Load configuration from disk, creating the default if not found.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load and validate `path`, writing the default there if it is missing.
    #[track_caller]
    #[instrument]
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            info!(config_path = ?path, "No config found, creating default");
            let config = Config::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to read config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config: Config = toml::from_str(&contents).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        config.validate()?;

        info!(config_path = ?path, "Configuration loaded");

        Ok(config)
    }

    /// Reject values that would stall the ticker or sampler or empty the
    /// visualization.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        let invalid = |reason: &str| AppError::ConfigError {
            reason: reason.to_string(),
            location: ErrorLocation::from(Location::caller()),
        };

        if self.timing.tick_interval_ms == 0 {
            return Err(invalid("timing.tick_interval_ms must be greater than 0"));
        }
        if self.timing.sample_interval_ms == 0 {
            return Err(invalid("timing.sample_interval_ms must be greater than 0"));
        }
        if self.visualization.history_len == 0 {
            return Err(invalid("visualization.history_len must be greater than 0"));
        }
        if self.visualization.max_amplitude == 0 {
            return Err(invalid("visualization.max_amplitude must be greater than 0"));
        }
        if self.visualization.sparkline_width == 0 {
            return Err(invalid(
                "visualization.sparkline_width must be greater than 0",
            ));
        }
        if self.recording.file_path.file_name().is_none() {
            return Err(invalid("recording.file_path must name a file"));
        }

        Ok(())
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to serialize config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to create temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::ConfigError {
                reason: format!("Failed to write temp config file: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        temp_file.sync_all().map_err(|e| AppError::ConfigError {
            reason: format!("Failed to sync temp config file: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        fs::rename(&temp_path, path).map_err(|e| AppError::ConfigError {
            reason: format!("Failed to rename temp config to final: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Create the directory holding the recording file.
    #[track_caller]
    pub fn ensure_recording_dir(&self) -> AppResult<()> {
        if let Some(dir) = self.recording_dir()
            && !dir.as_os_str().is_empty()
            && !dir.exists()
        {
            fs::create_dir_all(dir)?;
            debug!(recording_dir = ?dir, "Created recording directory");
        }
        Ok(())
    }

    /// Directory holding the recording file.
    pub fn recording_dir(&self) -> Option<&Path> {
        self.recording.file_path.parent()
    }

    #[track_caller]
    fn config_path() -> AppResult<PathBuf> {
        let proj_dirs = project_dirs().ok_or_else(|| AppError::ConfigError {
            reason: "Failed to get config directory".to_string(),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let config_dir = proj_dirs.config_dir();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            debug!(config_dir = ?config_dir, "Created config directory");
        }

        Ok(config_dir.join("config.toml"))
    }
}
