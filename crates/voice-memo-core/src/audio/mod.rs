mod capability;
pub(crate) mod capture;
mod level;
pub(crate) mod playback;
mod resampler;
pub(crate) mod wav;

pub(crate) use {resampler::Resampler, wav::WavFileWriter};

pub use {
    capability::{
        CaptureCapability, CaptureHandle, PlaybackCapability, PlaybackCompletion, PlaybackHandle,
    },
    capture::CpalCapture,
    level::{FULL_SCALE_AMPLITUDE, LevelMeter},
    playback::CpalPlayback,
};
