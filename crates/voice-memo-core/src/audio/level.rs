use crate::{CoreResult, MemoError};

use std::{
    panic::Location,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, Ordering},
    },
};

use error_location::ErrorLocation;

/// Level reported for a full-scale sample (16-bit PCM peak).
pub const FULL_SCALE_AMPLITUDE: u32 = i16::MAX as u32;

#[derive(Debug)]
struct MeterState {
    peak: AtomicU32,
    open: AtomicBool,
}

/// Peak-hold input level shared between an audio callback and its readers.
///
/// The callback folds each buffer into the held peak; [`take_peak`] returns
/// the loudest level since the previous read and resets it. Reads fail once
/// the owning capture has been closed.
///
/// [`take_peak`]: LevelMeter::take_peak
#[derive(Debug, Clone)]
pub struct LevelMeter {
    state: Arc<MeterState>,
}

impl LevelMeter {
    /// Create an open meter holding zero.
    pub fn new() -> Self {
        Self {
            state: Arc::new(MeterState {
                peak: AtomicU32::new(0),
                open: AtomicBool::new(true),
            }),
        }
    }

    /// Fold a buffer of `-1.0..=1.0` samples into the held peak.
    ///
    /// Allocation-free; safe to call from a real-time callback.
    pub fn record(&self, samples: &[f32]) {
        let peak = samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        self.record_peak((peak.clamp(0.0, 1.0) * FULL_SCALE_AMPLITUDE as f32) as u32);
    }

    /// Raise the held peak to `level` if it is louder.
    pub fn record_peak(&self, level: u32) {
        self.state.peak.fetch_max(level, Ordering::Relaxed);
    }

    /// Loudest level since the last read, resetting it to zero.
    #[track_caller]
    pub fn take_peak(&self) -> CoreResult<u32> {
        if !self.state.open.load(Ordering::Acquire) {
            return Err(MemoError::CapabilityReadFailed {
                reason: "capture handle is closed".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(self.state.peak.swap(0, Ordering::Relaxed))
    }

    /// Mark the owning capture closed. Later reads fail.
    pub fn close(&self) {
        self.state.open.store(false, Ordering::Release);
    }

    /// Whether the owning capture is still open.
    pub fn is_open(&self) -> bool {
        self.state.open.load(Ordering::Acquire)
    }
}

impl Default for LevelMeter {
    fn default() -> Self {
        Self::new()
    }
}
