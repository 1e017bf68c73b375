use crate::{
    Capability, CaptureCapability, CaptureHandle, CoreResult, LevelMeter, MemoError,
    audio::WavFileWriter,
};

use std::{
    panic::Location,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use cpal::{
    Device, Stream, StreamConfig,
    traits::{DeviceTrait, HostTrait, StreamTrait},
};
use error_location::ErrorLocation;
use tracing::{error, info, instrument, warn};

/// Microphone capture through the default cpal input device.
///
/// Each [`open`](CaptureCapability::open) builds a fresh input stream whose
/// callback feeds a [`LevelMeter`] and a WAV writer thread.
pub struct CpalCapture {
    device: Device,
    config: StreamConfig,
}

impl CpalCapture {
    /// Bind to the default input device and its default configuration.
    #[track_caller]
    #[instrument]
    pub fn new() -> CoreResult<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or(MemoError::CapabilityOpenFailed {
                capability: Capability::Capture,
                reason: "No microphone found".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let config = device
            .default_input_config()
            .map_err(|e| MemoError::CapabilityOpenFailed {
                capability: Capability::Capture,
                reason: format!("Failed to get input config: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            sample_rate = config.sample_rate(),
            channels = config.channels(),
            "CpalCapture initialized"
        );

        Ok(Self {
            device,
            config: config.into(),
        })
    }

    /// Input sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}

impl CaptureCapability for CpalCapture {
    #[instrument(skip(self))]
    fn open(&mut self, destination: &Path) -> CoreResult<Box<dyn CaptureHandle>> {
        // On any error below, the writer and stream drop here and release
        // themselves; nothing escapes a failed open.
        let writer =
            WavFileWriter::create(destination, self.config.sample_rate, self.config.channels)?;
        let samples = writer.sender();

        let meter = LevelMeter::new();
        let callback_meter = meter.clone();

        let shutdown = Arc::new(AtomicBool::new(false));
        let callback_shutdown = Arc::clone(&shutdown);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Once close() raises the flag nothing more reaches the
                    // meter or the file, even if the backend fires one more
                    // callback before the stream is torn down.
                    if callback_shutdown.load(Ordering::Acquire) {
                        return;
                    }
                    callback_meter.record(data);
                    samples.write(data);
                },
                |err| {
                    error!("Audio input stream error: {}", err);
                },
                None,
            )
            .map_err(|e| MemoError::CapabilityOpenFailed {
                capability: Capability::Capture,
                reason: format!("Failed to build input stream: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        stream.play().map_err(|e| MemoError::CapabilityOpenFailed {
            capability: Capability::Capture,
            reason: format!("Failed to start input stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!(path = ?destination, "Audio capture started");

        Ok(Box::new(CpalCaptureHandle {
            stream: Some(stream),
            writer: Some(writer),
            meter,
            shutdown,
        }))
    }
}

struct CpalCaptureHandle {
    stream: Option<Stream>,
    writer: Option<WavFileWriter>,
    meter: LevelMeter,
    shutdown: Arc<AtomicBool>,
}

impl CpalCaptureHandle {
    fn release(&mut self) -> CoreResult<()> {
        self.shutdown.store(true, Ordering::Release);
        self.meter.close();

        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                warn!("Failed to pause input stream before release: {}", e);
            }
            drop(stream);
        }

        match self.writer.take() {
            Some(writer) => writer.finalize(),
            None => Ok(()),
        }
    }
}

impl CaptureHandle for CpalCaptureHandle {
    fn level_meter(&self) -> LevelMeter {
        self.meter.clone()
    }

    fn close(mut self: Box<Self>) -> CoreResult<()> {
        let result = self.release();
        info!(ok = result.is_ok(), "Audio capture stopped");
        result
    }
}

impl Drop for CpalCaptureHandle {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            error!(error = %e, "Failed to release capture handle");
        }
    }
}
