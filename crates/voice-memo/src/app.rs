use crate::{
    AppCommand, AppResult, MenuIds, TrayCommand, TrayDisplay, TraySender, TrayStateObserver,
    TrayVisualization, config::Config,
};

use std::{path::PathBuf, sync::Arc};

use notify_rust::Notification;
use tokio::sync::{mpsc, watch};
use tracing::{error, info, instrument, warn};
use tray_icon::menu::MenuEvent;
use voice_memo_core::{
    AmplitudeSampler, CpalCapture, CpalPlayback, ElapsedTicker, MemoController, MemoError,
    MemoEvent, MonotonicClock,
};

/// Main application state.
///
/// Runs on the runtime thread and owns the recorder. Tray updates go back to
/// the main thread through `tray` because `TrayIcon` is `!Send` and must
/// remain on the UI thread.
pub struct App {
    controller: MemoController,
    memo_rx: mpsc::UnboundedReceiver<MemoEvent>,
    tray: Arc<dyn TraySender>,
    command_tx: mpsc::Sender<AppCommand>,
    command_rx: mpsc::Receiver<AppCommand>,
    shutdown_tx: watch::Sender<bool>,
    menu_ids: MenuIds,
    recording_dir: Option<PathBuf>,
}

impl App {
    /// Wire the recorder to the default audio devices and the tray.
    ///
    /// Must be called inside the runtime that will run [`App::run`].
    #[track_caller]
    #[instrument(skip_all)]
    pub fn new(
        config: &Config,
        tray: Arc<dyn TraySender>,
        menu_ids: MenuIds,
    ) -> AppResult<Self> {
        let visualization = &config.visualization;

        let ticker = ElapsedTicker::new(
            Arc::new(MonotonicClock),
            Arc::new(TrayDisplay::new(Arc::clone(&tray))),
            config.timing.tick_interval(),
        );
        let sampler = AmplitudeSampler::new(
            Arc::new(TrayVisualization::new(
                visualization.history_len,
                visualization.max_amplitude,
                visualization.sparkline_width,
                Arc::clone(&tray),
            )),
            config.timing.sample_interval(),
            visualization.max_amplitude,
        );

        let (memo_tx, memo_rx) = mpsc::unbounded_channel();
        let mut controller = MemoController::new(
            Box::new(CpalCapture::new()?),
            Box::new(CpalPlayback::new()),
            config.recording.file_path.clone(),
            ticker,
            sampler,
            memo_tx,
        );
        controller.subscribe(Box::new(TrayStateObserver::new(Arc::clone(&tray))));

        let (command_tx, command_rx) = mpsc::channel(32);
        let (shutdown_tx, _) = watch::channel(false);

        Ok(Self {
            controller,
            memo_rx,
            tray,
            command_tx,
            command_rx,
            shutdown_tx,
            menu_ids,
            recording_dir: config.recording_dir().map(PathBuf::from),
        })
    }

    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> AppResult<()> {
        info!("Voice Memo starting");

        // MenuEvent::receiver() returns a crossbeam_channel::Receiver which
        // has a blocking recv(). When tray_event_rx is dropped, the next
        // blocking_send() fails and the forwarder exits.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                Some(event) = tray_event_rx.recv() => {
                    if let Some(cmd) = self.command_for_menu(&event) {
                        if cmd == AppCommand::Shutdown {
                            info!("Exit requested from tray menu");
                            break;
                        }
                        self.handle_command(cmd);
                    }
                }

                Some(cmd) = self.command_rx.recv() => {
                    if cmd == AppCommand::Shutdown {
                        info!("Shutdown requested");
                        break;
                    }
                    self.handle_command(cmd);
                }

                Some(event) = self.memo_rx.recv() => {
                    self.dispatch(event);
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        // Release the microphone or speaker before the UI thread exits.
        if let Err(e) = self.controller.shutdown() {
            error!(error = ?e, "Failed to release audio on shutdown");
        }

        drop(tray_event_rx);

        match tokio::time::timeout(std::time::Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => info!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => info!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        let _ = self.shutdown_tx.send(true);
        self.tray.send(TrayCommand::Shutdown);
        info!("Voice Memo shut down successfully");

        Ok(())
    }

    /// Sender for commands into this app, e.g. from the hotkey handler.
    pub fn command_sender(&self) -> mpsc::Sender<AppCommand> {
        self.command_tx.clone()
    }

    /// Receiver that changes to `true` once [`App::run`] has finished.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    fn command_for_menu(&self, event: &MenuEvent) -> Option<AppCommand> {
        let id = &event.id;
        if *id == self.menu_ids.primary {
            Some(AppCommand::PrimaryButton)
        } else if *id == self.menu_ids.reset {
            Some(AppCommand::Reset)
        } else if *id == self.menu_ids.open_folder {
            Some(AppCommand::OpenRecordingFolder)
        } else if *id == self.menu_ids.exit {
            Some(AppCommand::Shutdown)
        } else {
            None
        }
    }

    #[instrument(skip(self))]
    fn handle_command(&mut self, cmd: AppCommand) {
        match cmd {
            AppCommand::PrimaryButton => self.dispatch(MemoEvent::PrimaryButton),
            AppCommand::Reset => self.dispatch(MemoEvent::Reset),
            AppCommand::OpenRecordingFolder => self.open_recording_folder(),
            AppCommand::Shutdown => {}
        }
    }

    fn dispatch(&mut self, event: MemoEvent) {
        if let Err(e) = self.controller.handle(event) {
            report_failure(&e);
        }
    }

    fn open_recording_folder(&self) {
        let Some(dir) = &self.recording_dir else {
            warn!("Recording path has no parent directory");
            return;
        };

        match open::that(dir) {
            Ok(()) => info!(dir = ?dir, "Opened recording folder"),
            Err(e) => error!(dir = ?dir, error = ?e, "Failed to open recording folder"),
        }
    }
}

/// Log a recorder error; open failures are also shown to the user.
fn report_failure(e: &MemoError) {
    error!(error = %e, "Recorder operation failed");

    if let MemoError::CapabilityOpenFailed {
        capability, reason, ..
    } = e
    {
        let shown = Notification::new()
            .summary("Voice Memo")
            .body(&format!("Could not start {}: {}", capability, reason))
            .show();
        if let Err(e) = shown {
            warn!(error = ?e, "Failed to show notification");
        }
    }
}
