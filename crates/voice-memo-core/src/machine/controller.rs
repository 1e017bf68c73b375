use crate::{
    AmplitudeSampler, AmplitudeSource, CaptureCapability, CaptureHandle, CoreResult,
    ElapsedTicker, MemoEvent, PlaybackCapability, PlaybackCompletion, PlaybackHandle,
    RecordingState, StateHolder, StateObserver,
};

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

/// Which handle is open, tagged with its session id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenHandle {
    /// A capture handle is writing the recording file.
    Capture(Uuid),
    /// A playback handle is reading the recording file.
    Playback(Uuid),
}

enum ActiveHandle {
    Capture {
        handle: Box<dyn CaptureHandle>,
        session_id: Uuid,
    },
    Playback {
        handle: Box<dyn PlaybackHandle>,
        session_id: Uuid,
    },
}

/// Recording/playback state machine.
///
/// Owns the only open audio handle and both periodic processes. Each
/// transition applies its side effects in a fixed order: audio capability,
/// elapsed-time ticker, amplitude sampler, then the published state.
///
/// All operations take `&mut self`, so transitions never interleave. Playback
/// completion arrives asynchronously as a [`MemoEvent::PlaybackCompleted`] on
/// the channel given to [`MemoController::new`] and must be fed back through
/// [`MemoController::handle`].
pub struct MemoController {
    capture: Box<dyn CaptureCapability>,
    playback: Box<dyn PlaybackCapability>,
    recording_path: PathBuf,
    ticker: ElapsedTicker,
    sampler: AmplitudeSampler,
    state: StateHolder,
    active: Option<ActiveHandle>,
    events: mpsc::UnboundedSender<MemoEvent>,
}

impl MemoController {
    /// Create a controller in [`RecordingState::BeforeRecording`].
    pub fn new(
        capture: Box<dyn CaptureCapability>,
        playback: Box<dyn PlaybackCapability>,
        recording_path: PathBuf,
        ticker: ElapsedTicker,
        sampler: AmplitudeSampler,
        events: mpsc::UnboundedSender<MemoEvent>,
    ) -> Self {
        info!(path = ?recording_path, "MemoController initialized");

        Self {
            capture,
            playback,
            recording_path,
            ticker,
            sampler,
            state: StateHolder::default(),
            active: None,
            events,
        }
    }

    /// Register a state observer; it is notified with the current state first.
    pub fn subscribe(&mut self, observer: Box<dyn StateObserver>) {
        self.state.subscribe(observer);
    }

    /// Current state.
    pub fn state(&self) -> RecordingState {
        self.state.get()
    }

    /// The open handle, if any.
    pub fn open_handle(&self) -> Option<OpenHandle> {
        self.active.as_ref().map(|active| match active {
            ActiveHandle::Capture { session_id, .. } => OpenHandle::Capture(*session_id),
            ActiveHandle::Playback { session_id, .. } => OpenHandle::Playback(*session_id),
        })
    }

    /// The elapsed-time ticker.
    pub fn ticker(&self) -> &ElapsedTicker {
        &self.ticker
    }

    /// The amplitude sampler.
    pub fn sampler(&self) -> &AmplitudeSampler {
        &self.sampler
    }

    /// File every recording is written to and played from.
    pub fn recording_path(&self) -> &Path {
        &self.recording_path
    }

    /// Apply one event.
    ///
    /// # Errors
    ///
    /// `CapabilityOpenFailed` when a handle could not be opened; the state is
    /// unchanged. `CapabilityReleaseFailed` when a handle did not close
    /// cleanly; the transition has still completed.
    #[track_caller]
    #[instrument(skip(self), fields(state = ?self.state.get()))]
    pub fn handle(&mut self, event: MemoEvent) -> CoreResult<()> {
        match event {
            MemoEvent::PrimaryButton => self.press_primary(),
            MemoEvent::Reset => self.reset(),
            MemoEvent::PlaybackCompleted { session_id } => self.playback_completed(session_id),
        }
    }

    /// Record, stop or play depending on the current state.
    #[track_caller]
    pub fn press_primary(&mut self) -> CoreResult<()> {
        match self.state.get() {
            RecordingState::BeforeRecording => self.start_recording(),
            RecordingState::OnRecording | RecordingState::OnPlaying => self.stop_active(),
            RecordingState::AfterRecording => self.start_playback(),
        }
    }

    /// Discard the recording session and return to `BeforeRecording`.
    ///
    /// Ignored unless [`RecordingState::reset_enabled`].
    #[track_caller]
    pub fn reset(&mut self) -> CoreResult<()> {
        let state = self.state.get();
        if !state.reset_enabled() {
            debug!(?state, "Reset ignored");
            return Ok(());
        }

        let released = self.release_active();
        self.ticker.clear();
        self.sampler.clear();
        self.state.set(RecordingState::BeforeRecording);

        info!("Recorder reset");
        released
    }

    /// End-of-playback notification for `session_id`.
    ///
    /// Acts like a manual stop if `session_id` is the open playback, otherwise
    /// the signal is stale and ignored.
    #[track_caller]
    pub fn playback_completed(&mut self, session_id: Uuid) -> CoreResult<()> {
        let current = matches!(
            self.active,
            Some(ActiveHandle::Playback { session_id: open, .. }) if open == session_id
        );
        if !current {
            debug!(session_id = %session_id, "Stale playback completion ignored");
            return Ok(());
        }

        info!(session_id = %session_id, "Playback completed");
        self.stop_active()
    }

    /// Release any open handle and stop both periodic processes.
    ///
    /// An interrupted recording or playback leaves the recorder in
    /// `AfterRecording`.
    #[track_caller]
    pub fn shutdown(&mut self) -> CoreResult<()> {
        let was_active = self.active.is_some();
        let released = self.release_active();
        self.ticker.stop();
        self.sampler.stop();
        if was_active {
            self.state.set(RecordingState::AfterRecording);
        }

        info!(was_active, "MemoController shut down");
        released
    }

    #[track_caller]
    fn start_recording(&mut self) -> CoreResult<()> {
        let session_id = Uuid::new_v4();
        let handle = self.capture.open(&self.recording_path)?;
        let meter = handle.level_meter();
        self.active = Some(ActiveHandle::Capture { handle, session_id });

        self.ticker.start();
        self.sampler.start(AmplitudeSource::Capture(meter));
        self.state.set(RecordingState::OnRecording);

        info!(session_id = %session_id, path = ?self.recording_path, "Recording started");
        Ok(())
    }

    #[track_caller]
    fn start_playback(&mut self) -> CoreResult<()> {
        let session_id = Uuid::new_v4();
        let events = self.events.clone();
        let on_completed: PlaybackCompletion = Box::new(move || {
            if events
                .send(MemoEvent::PlaybackCompleted { session_id })
                .is_err()
            {
                debug!(session_id = %session_id, "Controller gone, completion dropped");
            }
        });

        let handle = self.playback.open(&self.recording_path, on_completed)?;
        self.active = Some(ActiveHandle::Playback { handle, session_id });

        self.ticker.start();
        self.sampler.start(AmplitudeSource::Silence);
        self.state.set(RecordingState::OnPlaying);

        info!(session_id = %session_id, path = ?self.recording_path, "Playback started");
        Ok(())
    }

    #[track_caller]
    fn stop_active(&mut self) -> CoreResult<()> {
        let released = self.release_active();
        self.ticker.stop();
        self.sampler.stop();
        self.state.set(RecordingState::AfterRecording);
        released
    }

    /// Close the open handle. The handle is consumed even if closing fails.
    fn release_active(&mut self) -> CoreResult<()> {
        let (result, kind, session_id) = match self.active.take() {
            Some(ActiveHandle::Capture { handle, session_id }) => {
                (handle.close(), "capture", session_id)
            }
            Some(ActiveHandle::Playback { handle, session_id }) => {
                (handle.close(), "playback", session_id)
            }
            None => return Ok(()),
        };

        match &result {
            Ok(()) => info!(session_id = %session_id, kind, "Handle released"),
            Err(e) => error!(session_id = %session_id, kind, error = %e, "Handle release failed"),
        }
        result
    }
}
