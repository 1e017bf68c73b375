use crate::{CoreResult, LevelMeter, RepeatingTask, VisualizationSink};

use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

/// Where the sampler reads amplitudes from.
#[derive(Debug, Clone)]
pub enum AmplitudeSource {
    /// Peak level of the open capture handle.
    Capture(LevelMeter),
    /// No level available (playback); always reads zero.
    Silence,
}

impl AmplitudeSource {
    /// Read the current amplitude.
    pub fn read(&self) -> CoreResult<u32> {
        match self {
            AmplitudeSource::Capture(meter) => meter.take_peak(),
            AmplitudeSource::Silence => Ok(0),
        }
    }

    /// Whether this source reads a live capture level.
    pub fn is_capture(&self) -> bool {
        matches!(self, AmplitudeSource::Capture(_))
    }
}

struct SamplerSession {
    source_is_capture: bool,
    task: RepeatingTask,
}

/// Periodically forwards amplitudes to a [`VisualizationSink`].
pub struct AmplitudeSampler {
    sink: Arc<dyn VisualizationSink>,
    interval: Duration,
    max_amplitude: u32,
    session: Option<SamplerSession>,
}

impl AmplitudeSampler {
    /// Create a stopped sampler. Reads are clamped to `0..=max_amplitude`.
    pub fn new(sink: Arc<dyn VisualizationSink>, interval: Duration, max_amplitude: u32) -> Self {
        Self {
            sink,
            interval,
            max_amplitude,
            session: None,
        }
    }

    /// Start sampling `source`, replacing any running session.
    pub fn start(&mut self, source: AmplitudeSource) {
        self.stop();

        let source_is_capture = source.is_capture();
        let sink = Arc::clone(&self.sink);
        let max_amplitude = self.max_amplitude;

        let task = RepeatingTask::start("amplitude-sampler", self.interval, move || {
            let level = match source.read() {
                Ok(level) => level.min(max_amplitude),
                Err(e) => {
                    warn!(error = %e, "Amplitude read failed, sampling silence");
                    0
                }
            };
            sink.append(level);
        });

        self.session = Some(SamplerSession {
            source_is_capture,
            task,
        });
    }

    /// Halt sampling. History is kept.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            session.task.cancel();
            debug!("Sampler stopped");
        }
    }

    /// Halt sampling and discard the sink's history.
    pub fn clear(&mut self) {
        self.stop();
        self.sink.clear();
    }

    /// Whether sampling is active.
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the active session reads the capture level.
    ///
    /// `None` when stopped.
    pub fn samples_capture(&self) -> Option<bool> {
        self.session.as_ref().map(|s| s.source_is_capture)
    }
}
