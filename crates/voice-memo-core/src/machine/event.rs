use uuid::Uuid;

/// Input to [`MemoController::handle`](crate::MemoController::handle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoEvent {
    /// The record / stop / play control was activated.
    PrimaryButton,
    /// The reset control was activated.
    Reset,
    /// Playback of session `session_id` reached the end of the recording.
    PlaybackCompleted {
        /// Session tag of the playback handle that finished.
        session_id: Uuid,
    },
}
