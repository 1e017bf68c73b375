//! Voice Memo Core Library
//!
//! Recording/playback control core: a four-state machine that owns the audio
//! handles and drives an elapsed-time ticker and an amplitude sampler, plus
//! cpal/hound/rubato implementations of the audio capabilities.
//!
//! # Example
//!
//! ```no_run
//! use voice_memo_core::{
//!     AmplitudeHistory, AmplitudeSampler, CoreResult, CpalCapture, CpalPlayback, DisplaySink,
//!     ElapsedTicker, MemoController, MemoEvent, MonotonicClock,
//! };
//!
//! use std::{path::PathBuf, sync::Arc, time::Duration};
//!
//! struct Stdout;
//!
//! impl DisplaySink for Stdout {
//!     fn set_text(&self, text: &str) {
//!         println!("{text}");
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> CoreResult<()> {
//!     let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
//!     let interval = Duration::from_secs(1);
//!     let ticker = ElapsedTicker::new(Arc::new(MonotonicClock), Arc::new(Stdout), interval);
//!     let history = Arc::new(AmplitudeHistory::new(64, 32767));
//!     let sampler = AmplitudeSampler::new(history, interval, 32767);
//!
//!     let mut controller = MemoController::new(
//!         Box::new(CpalCapture::new()?),
//!         Box::new(CpalPlayback::new()),
//!         PathBuf::from("memo.wav"),
//!         ticker,
//!         sampler,
//!         tx,
//!     );
//!
//!     controller.handle(MemoEvent::PrimaryButton)?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!     controller.handle(MemoEvent::PrimaryButton)?;
//!     Ok(())
//! }
//! ```

mod audio;
mod error;
mod machine;
mod sink;
mod state;
mod timing;

pub use {
    audio::{
        CaptureCapability, CaptureHandle, CpalCapture, CpalPlayback, FULL_SCALE_AMPLITUDE,
        LevelMeter, PlaybackCapability, PlaybackCompletion, PlaybackHandle,
    },
    error::{Capability, MemoError, Result as CoreResult},
    machine::{MemoController, MemoEvent, OpenHandle},
    sink::{AmplitudeHistory, DisplaySink, VisualizationSink},
    state::{PrimaryControl, RecordingState, StateHolder, StateObserver},
    timing::{
        AmplitudeSampler, AmplitudeSource, Clock, ElapsedTicker, MonotonicClock, RepeatingTask,
        ZERO_ELAPSED, format_elapsed,
    },
};
