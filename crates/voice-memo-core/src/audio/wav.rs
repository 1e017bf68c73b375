use crate::{Capability, CoreResult, MemoError};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    thread::JoinHandle,
};

use error_location::ErrorLocation;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tokio::sync::mpsc;
use tracing::{debug, error, instrument};

/// Recordings are stored as 16-bit mono PCM.
const BITS_PER_SAMPLE: u16 = 16;

enum WavCommand {
    Write(Vec<f32>),
    Finalize,
}

/// Mono 16-bit WAV encoder running on a dedicated thread.
///
/// Interleaved input is downmixed to mono before encoding. File I/O never
/// happens on the audio callback thread; the callback only queues buffers
/// through a [`WavSampleSender`].
pub struct WavFileWriter {
    tx: mpsc::UnboundedSender<WavCommand>,
    thread: Option<JoinHandle<CoreResult<()>>>,
    path: PathBuf,
}

/// Cloneable queue into a [`WavFileWriter`], usable from any thread.
#[derive(Clone)]
pub struct WavSampleSender {
    tx: mpsc::UnboundedSender<WavCommand>,
}

impl WavSampleSender {
    /// Queue an interleaved buffer. Returns `false` once the writer is gone.
    pub fn write(&self, samples: &[f32]) -> bool {
        self.tx.send(WavCommand::Write(samples.to_vec())).is_ok()
    }
}

impl WavFileWriter {
    /// Create (or truncate) `path` and start the writer thread.
    #[track_caller]
    #[instrument]
    pub fn create(path: &Path, sample_rate: u32, channels: u16) -> CoreResult<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: BITS_PER_SAMPLE,
            sample_format: SampleFormat::Int,
        };

        let mut writer =
            WavWriter::create(path, spec).map_err(|e| MemoError::CapabilityOpenFailed {
                capability: Capability::Capture,
                reason: format!("Failed to create {}: {}", path.display(), e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let frame_len = usize::from(channels.max(1));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let thread = std::thread::Builder::new()
            .name("wav-writer".to_string())
            .spawn(move || {
                let mut write_error: Option<String> = None;

                while let Some(cmd) = rx.blocking_recv() {
                    match cmd {
                        WavCommand::Write(samples) => {
                            if write_error.is_some() {
                                continue;
                            }
                            for frame in samples.chunks(frame_len) {
                                let mono = frame.iter().sum::<f32>() / frame.len() as f32;
                                if let Err(e) = writer.write_sample(to_pcm16(mono)) {
                                    write_error = Some(e.to_string());
                                    break;
                                }
                            }
                        }
                        WavCommand::Finalize => break,
                    }
                }

                let finalized = writer.finalize();

                match (write_error, finalized) {
                    (Some(reason), _) => Err(MemoError::CapabilityReleaseFailed {
                        capability: Capability::Capture,
                        reason: format!("Failed to write sample: {}", reason),
                        location: ErrorLocation::from(Location::caller()),
                    }),
                    (None, Err(e)) => Err(MemoError::CapabilityReleaseFailed {
                        capability: Capability::Capture,
                        reason: format!("Failed to finalize WAV: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    }),
                    (None, Ok(())) => Ok(()),
                }
            })
            .map_err(|e| MemoError::CapabilityOpenFailed {
                capability: Capability::Capture,
                reason: format!("Failed to spawn WAV writer thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(path = ?path, sample_rate, channels, "WAV writer started");

        Ok(Self {
            tx,
            thread: Some(thread),
            path: path.to_path_buf(),
        })
    }

    /// Queue handle for the audio callback.
    pub fn sender(&self) -> WavSampleSender {
        WavSampleSender {
            tx: self.tx.clone(),
        }
    }

    /// Flush queued buffers, write the header and close the file.
    #[track_caller]
    pub fn finalize(mut self) -> CoreResult<()> {
        self.join()
    }

    #[track_caller]
    fn join(&mut self) -> CoreResult<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        // Buffers queued before this command are still written.
        let _ = self.tx.send(WavCommand::Finalize);

        let result = thread
            .join()
            .map_err(|_| MemoError::CapabilityReleaseFailed {
                capability: Capability::Capture,
                reason: "WAV writer thread panicked".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(path = ?self.path, ok = result.is_ok(), "WAV writer finished");
        result
    }
}

impl Drop for WavFileWriter {
    fn drop(&mut self) {
        if let Err(e) = self.join() {
            error!(path = ?self.path, error = %e, "WAV writer failed during drop");
        }
    }
}

/// A recording decoded to mono `f32` samples.
pub struct MonoRecording {
    /// Samples in `-1.0..=1.0`.
    pub samples: Vec<f32>,
    /// Sample rate of `samples`.
    pub sample_rate: u32,
}

/// Decode a WAV file of any PCM layout into mono `f32`.
#[track_caller]
#[instrument]
pub fn read_mono(path: &Path) -> CoreResult<MonoRecording> {
    let open_failed = |reason: String| MemoError::CapabilityOpenFailed {
        capability: Capability::Playback,
        reason,
        location: ErrorLocation::from(Location::caller()),
    };

    let reader = WavReader::open(path)
        .map_err(|e| open_failed(format!("Failed to open {}: {}", path.display(), e)))?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| open_failed(format!("Failed to decode samples: {}", e)))?,
        SampleFormat::Int => {
            let scale = (1i64 << spec.bits_per_sample.saturating_sub(1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| open_failed(format!("Failed to decode samples: {}", e)))?
        }
    };

    let samples = downmix(&interleaved, spec.channels);

    debug!(
        sample_rate = spec.sample_rate,
        channels = spec.channels,
        frames = samples.len(),
        "Recording decoded"
    );

    Ok(MonoRecording {
        samples,
        sample_rate: spec.sample_rate,
    })
}

/// Average interleaved frames into one channel.
pub(crate) fn downmix(interleaved: &[f32], channels: u16) -> Vec<f32> {
    let frame_len = usize::from(channels.max(1));
    if frame_len == 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(frame_len)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16
}
