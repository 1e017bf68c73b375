use crate::VisualizationSink;

use std::{collections::VecDeque, sync::Mutex};

use tracing::error;

/// Block characters from quietest to loudest.
const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Bounded amplitude history keeping the newest `capacity` samples.
pub struct AmplitudeHistory {
    capacity: usize,
    max_amplitude: u32,
    levels: Mutex<VecDeque<u32>>,
}

impl AmplitudeHistory {
    /// Create an empty history. `max_amplitude` scales the sparkline.
    pub fn new(capacity: usize, max_amplitude: u32) -> Self {
        Self {
            capacity,
            max_amplitude,
            levels: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Copy of the stored levels, oldest first.
    pub fn snapshot(&self) -> Vec<u32> {
        self.lock().iter().copied().collect()
    }

    /// Number of stored samples.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no samples are stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Render the newest `width` samples as block characters.
    pub fn sparkline(&self, width: usize) -> String {
        let levels = self.lock();
        let skip = levels.len().saturating_sub(width);
        let top = self.max_amplitude.max(1) as u64;
        let steps = (SPARK_LEVELS.len() - 1) as u64;

        levels
            .iter()
            .skip(skip)
            .map(|&level| {
                let index = (u64::from(level.min(self.max_amplitude)) * steps) / top;
                SPARK_LEVELS[index as usize]
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<u32>> {
        // History is plain data; a poisoned lock still holds valid levels.
        self.levels.lock().unwrap_or_else(|e| {
            error!("Amplitude history lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }
}

impl VisualizationSink for AmplitudeHistory {
    fn append(&self, level: u32) {
        if self.capacity == 0 {
            return;
        }
        let mut levels = self.lock();
        while levels.len() >= self.capacity {
            levels.pop_front();
        }
        levels.push_back(level);
    }

    fn clear(&self) {
        self.lock().clear();
    }
}
