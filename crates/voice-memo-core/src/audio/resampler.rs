use crate::{CoreResult, MemoError};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

/// Frames fed to rubato per call.
const CHUNK_FRAMES: usize = 1024;

/// Mono sample-rate converter used to match a recording to the output device.
pub struct Resampler {
    resampler: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32, output_rate: u32) -> CoreResult<Self> {
        let resampler = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            CHUNK_FRAMES,
            2, // sub-chunks
            1, // mono
            FixedSync::Input,
        )
        .map_err(|e| MemoError::Resampling {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        debug!(input_rate, output_rate, "Playback resampler initialized");

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
        })
    }

    /// Convert a whole mono buffer.
    ///
    /// The filter delay is trimmed from the front and flushed from the tail,
    /// so the output lines up with the input and keeps its full duration.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn resample(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        let expected_len =
            (samples.len() as f64 * self.output_rate as f64 / self.input_rate as f64) as usize;
        let delay = self.resampler.output_delay();
        let mut output = Vec::with_capacity(expected_len + delay + CHUNK_FRAMES);

        for chunk in samples.chunks(CHUNK_FRAMES) {
            self.process_chunk(chunk, &mut output)?;
        }

        // Push the delayed tail out with silence. Bounded so a resampler that
        // stops producing output cannot spin forever.
        let silence = [0.0f32; CHUNK_FRAMES];
        let max_flushes = delay / CHUNK_FRAMES + 2;
        for _ in 0..max_flushes {
            if output.len() >= expected_len + delay {
                break;
            }
            self.process_chunk(&silence, &mut output)?;
        }

        output.drain(..delay.min(output.len()));
        output.truncate(expected_len);

        debug!(
            input_len = samples.len(),
            output_len = output.len(),
            input_rate = self.input_rate,
            output_rate = self.output_rate,
            delay,
            "Recording resampled"
        );

        Ok(output)
    }

    #[track_caller]
    fn process_chunk(&mut self, chunk: &[f32], output: &mut Vec<f32>) -> CoreResult<()> {
        let mut padded = chunk.to_vec();
        padded.resize(CHUNK_FRAMES, 0.0);

        let input = InterleavedSlice::new(&padded, 1, CHUNK_FRAMES).map_err(|e| {
            MemoError::Resampling {
                reason: format!("Failed to create input adapter: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let max_frames = self.resampler.output_frames_max();
        let mut scratch = vec![0.0f32; max_frames];

        let mut target = InterleavedSlice::new_mut(&mut scratch, 1, max_frames).map_err(|e| {
            MemoError::Resampling {
                reason: format!("Failed to create output adapter: {}", e),
                location: ErrorLocation::from(Location::caller()),
            }
        })?;

        let (_consumed, written) = self
            .resampler
            .process_into_buffer(&input, &mut target, None)
            .map_err(|e| MemoError::Resampling {
                reason: format!("Resampling failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        output.extend_from_slice(&scratch[..written]);
        Ok(())
    }
}
