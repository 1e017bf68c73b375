/// Commands sent from the hotkey handler to the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Record, stop or play, depending on the recorder state.
    PrimaryButton,
    /// Discard the recording and return to the initial state.
    Reset,
    /// Show the directory holding the recording file.
    OpenRecordingFolder,
    /// Request application shutdown.
    Shutdown,
}
