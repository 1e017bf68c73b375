use crate::config::{default_history_len, default_max_amplitude, default_sparkline_width};

use serde::{Deserialize, Serialize};

/// Amplitude visualization configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualizationConfig {
    /// Number of samples kept in the history.
    #[serde(default = "default_history_len")]
    pub history_len: usize,
    /// Amplitude mapped to the top of the scale; reads are clamped to it.
    #[serde(default = "default_max_amplitude")]
    pub max_amplitude: u32,
    /// Characters of history shown in the tray tooltip.
    #[serde(default = "default_sparkline_width")]
    pub sparkline_width: usize,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            history_len: default_history_len(),
            max_amplitude: default_max_amplitude(),
            sparkline_width: default_sparkline_width(),
        }
    }
}
