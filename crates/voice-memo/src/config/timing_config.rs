use crate::config::{default_sample_interval_ms, default_tick_interval_ms};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Periodic update intervals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Elapsed-time display refresh interval in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Amplitude sampling interval in milliseconds.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

impl TimingConfig {
    /// Elapsed-time refresh interval.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Amplitude sampling interval.
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}
