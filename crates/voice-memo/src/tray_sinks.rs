//! Core sinks and observers that forward recorder output to the tray.
//!
//! They run on the runtime thread (the sampler and ticker call them from
//! their tasks) and hand everything to the UI thread as [`TrayCommand`]s.

use crate::TrayCommand;

use std::sync::{Arc, Mutex};

use tao::event_loop::EventLoopProxy;
use tracing::debug;
use voice_memo_core::{
    AmplitudeHistory, DisplaySink, RecordingState, StateObserver, VisualizationSink,
};

/// Delivers [`TrayCommand`]s to the thread owning the tray icon.
pub trait TraySender: Send + Sync {
    /// Queue `command`. Dropped silently once the UI thread is gone.
    fn send(&self, command: TrayCommand);
}

impl TraySender for Mutex<EventLoopProxy<TrayCommand>> {
    fn send(&self, command: TrayCommand) {
        let proxy = self.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = proxy.send_event(command) {
            debug!(error = %e, "Event loop closed, tray command dropped");
        }
    }
}

/// Elapsed time display shown in the tray title and tooltip.
pub struct TrayDisplay {
    tray: Arc<dyn TraySender>,
}

impl TrayDisplay {
    /// Display that sends every text to `tray`.
    pub fn new(tray: Arc<dyn TraySender>) -> Self {
        Self { tray }
    }
}

impl DisplaySink for TrayDisplay {
    fn set_text(&self, text: &str) {
        self.tray.send(TrayCommand::SetElapsed(text.to_string()));
    }
}

/// Amplitude history rendered as a sparkline in the tray tooltip.
pub struct TrayVisualization {
    history: AmplitudeHistory,
    width: usize,
    tray: Arc<dyn TraySender>,
}

impl TrayVisualization {
    /// Keep `history_len` levels and publish the newest `width` as a sparkline.
    pub fn new(
        history_len: usize,
        max_amplitude: u32,
        width: usize,
        tray: Arc<dyn TraySender>,
    ) -> Self {
        Self {
            history: AmplitudeHistory::new(history_len, max_amplitude),
            width,
            tray,
        }
    }

    fn publish(&self) {
        self.tray
            .send(TrayCommand::SetLevels(self.history.sparkline(self.width)));
    }
}

impl VisualizationSink for TrayVisualization {
    fn append(&self, level: u32) {
        self.history.append(level);
        self.publish();
    }

    fn clear(&self) {
        self.history.clear();
        self.publish();
    }
}

/// Mirrors the recorder state into the tray icon and menu.
pub struct TrayStateObserver {
    tray: Arc<dyn TraySender>,
}

impl TrayStateObserver {
    /// Observer that forwards every state to `tray`.
    pub fn new(tray: Arc<dyn TraySender>) -> Self {
        Self { tray }
    }
}

impl StateObserver for TrayStateObserver {
    fn state_changed(&self, state: RecordingState) {
        self.tray.send(TrayCommand::SetState(state));
    }
}
