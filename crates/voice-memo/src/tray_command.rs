use voice_memo_core::RecordingState;

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` is `!Send`),
/// so all tray mutations and process lifecycle events flow through this enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayCommand {
    /// Switch icon, primary item text and reset enablement.
    SetState(RecordingState),
    /// Show a new elapsed time (`MM:SS`).
    SetElapsed(String),
    /// Show a new amplitude sparkline.
    SetLevels(String),
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
