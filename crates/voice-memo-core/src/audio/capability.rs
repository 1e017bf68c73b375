//! Boundary traits for the audio engine.
//!
//! The controller owns whatever handle `open` returns and is the only caller
//! of `close`. Both `close` methods consume the handle, so a handle cannot be
//! released twice.

use crate::{CoreResult, LevelMeter};

use std::path::Path;

/// Invoked once when playback reaches the end of the recording.
pub type PlaybackCompletion = Box<dyn FnOnce() + Send + 'static>;

/// Opens microphone capture into a file.
pub trait CaptureCapability {
    /// Start capturing into `destination`, overwriting it.
    ///
    /// On error nothing is left open.
    fn open(&mut self, destination: &Path) -> CoreResult<Box<dyn CaptureHandle>>;
}

/// A capture in progress.
pub trait CaptureHandle {
    /// Reader for the current input level of this capture.
    fn level_meter(&self) -> LevelMeter;

    /// Stop capturing and finish the file.
    fn close(self: Box<Self>) -> CoreResult<()>;
}

/// Opens playback of a file.
pub trait PlaybackCapability {
    /// Start playing `source`.
    ///
    /// `on_completed` runs exactly once when the end is reached, unless the
    /// handle is closed first. On error nothing is left open and
    /// `on_completed` is never called.
    fn open(
        &mut self,
        source: &Path,
        on_completed: PlaybackCompletion,
    ) -> CoreResult<Box<dyn PlaybackHandle>>;
}

/// A playback in progress.
pub trait PlaybackHandle {
    /// Stop playing and release the output device.
    fn close(self: Box<Self>) -> CoreResult<()>;
}
