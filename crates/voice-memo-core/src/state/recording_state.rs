/// Recorder state driving which controls are enabled and which icon is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    /// Nothing recorded yet, or the last recording was reset.
    #[default]
    BeforeRecording,
    /// Microphone capture in progress.
    OnRecording,
    /// A recording exists and nothing is playing.
    AfterRecording,
    /// The recording is being played back.
    OnPlaying,
}

/// Action offered by the primary button in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryControl {
    /// Start a new recording.
    Record,
    /// Stop the running recording or playback.
    Stop,
    /// Play the last recording.
    Play,
}

impl RecordingState {
    /// Whether the reset control accepts input in this state.
    pub fn reset_enabled(self) -> bool {
        matches!(
            self,
            RecordingState::AfterRecording | RecordingState::OnPlaying
        )
    }

    /// Primary button action for this state.
    pub fn primary_control(self) -> PrimaryControl {
        match self {
            RecordingState::BeforeRecording => PrimaryControl::Record,
            RecordingState::OnRecording | RecordingState::OnPlaying => PrimaryControl::Stop,
            RecordingState::AfterRecording => PrimaryControl::Play,
        }
    }

    /// Short human-readable status.
    pub fn label(self) -> &'static str {
        match self {
            RecordingState::BeforeRecording => "Ready",
            RecordingState::OnRecording => "Recording",
            RecordingState::AfterRecording => "Recorded",
            RecordingState::OnPlaying => "Playing",
        }
    }
}

impl PrimaryControl {
    /// Menu label for the control.
    pub fn label(self) -> &'static str {
        match self {
            PrimaryControl::Record => "Record",
            PrimaryControl::Stop => "Stop",
            PrimaryControl::Play => "Play",
        }
    }
}
