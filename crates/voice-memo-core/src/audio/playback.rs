use crate::{
    Capability, CoreResult, MemoError, PlaybackCapability, PlaybackCompletion, PlaybackHandle,
    audio::{Resampler, wav},
};

use std::{
    panic::Location,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use cpal::{
    Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{error, info, instrument, warn};

/// One-shot completion shared between the output callback and the handle.
///
/// Whichever of [`fire`](Self::fire) and [`disarm`](Self::disarm) runs first
/// wins; the completion callback runs at most once and never after a disarm.
pub(crate) struct CompletionSignal {
    done: AtomicBool,
    callback: Mutex<Option<PlaybackCompletion>>,
}

impl CompletionSignal {
    pub(crate) fn new(callback: PlaybackCompletion) -> Self {
        Self {
            done: AtomicBool::new(false),
            callback: Mutex::new(Some(callback)),
        }
    }

    /// Report that the end of the recording was reached.
    pub(crate) fn fire(&self) {
        if self.done.swap(true, Ordering::AcqRel) {
            return;
        }
        let callback = self
            .callback
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(callback) = callback {
            callback();
        }
    }

    /// Suppress the completion. Returns `true` if it had not fired yet.
    pub(crate) fn disarm(&self) -> bool {
        !self.done.swap(true, Ordering::AcqRel)
    }
}

/// Playback of the recording file through the default cpal output device.
///
/// The file is decoded up front, converted to the device rate when the two
/// differ, and copied to every output channel.
#[derive(Debug, Default)]
pub struct CpalPlayback;

impl CpalPlayback {
    /// Create a playback capability. The device is resolved on each open.
    pub fn new() -> Self {
        Self
    }
}

impl PlaybackCapability for CpalPlayback {
    #[instrument(skip(self, on_completed))]
    fn open(
        &mut self,
        source: &Path,
        on_completed: PlaybackCompletion,
    ) -> CoreResult<Box<dyn PlaybackHandle>> {
        let recording = wav::read_mono(source)?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(MemoError::CapabilityOpenFailed {
                capability: Capability::Playback,
                reason: "No output device found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let supported = device
            .default_output_config()
            .map_err(|e| MemoError::CapabilityOpenFailed {
                capability: Capability::Playback,
                reason: format!("Failed to get output config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let channels = usize::from(supported.channels().max(1));
        let config: StreamConfig = supported.into();

        let samples = if recording.sample_rate == config.sample_rate {
            recording.samples
        } else {
            Resampler::new(recording.sample_rate, config.sample_rate)?
                .resample(&recording.samples)?
        };
        let total_frames = samples.len();

        let signal = Arc::new(CompletionSignal::new(on_completed));
        let callback_signal = Arc::clone(&signal);
        let mut position = 0usize;

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        frame.fill(samples.get(position).copied().unwrap_or(0.0));
                        position = position.saturating_add(1);
                    }
                    if position >= total_frames {
                        callback_signal.fire();
                    }
                },
                |err| {
                    error!("Audio output stream error: {}", err);
                },
                None,
            )
            .map_err(|e| MemoError::CapabilityOpenFailed {
                capability: Capability::Playback,
                reason: format!("Failed to build output stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| MemoError::CapabilityOpenFailed {
            capability: Capability::Playback,
            reason: format!("Failed to start output stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(
            path = ?source,
            frames = total_frames,
            output_rate = config.sample_rate,
            "Playback started"
        );

        Ok(Box::new(CpalPlaybackHandle {
            stream: Some(stream),
            signal,
        }))
    }
}

struct CpalPlaybackHandle {
    stream: Option<Stream>,
    signal: Arc<CompletionSignal>,
}

impl CpalPlaybackHandle {
    fn release(&mut self) {
        // Disarm first so tearing down the stream cannot report completion.
        self.signal.disarm();

        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                warn!("Failed to pause output stream before release: {}", e);
            }
            drop(stream);
        }
    }
}

impl PlaybackHandle for CpalPlaybackHandle {
    fn close(mut self: Box<Self>) -> CoreResult<()> {
        self.release();
        info!("Playback stopped");
        Ok(())
    }
}

impl Drop for CpalPlaybackHandle {
    fn drop(&mut self) {
        self.release();
    }
}
