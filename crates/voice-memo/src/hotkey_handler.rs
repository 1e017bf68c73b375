//! Global hotkeys for the recorder controls.
//!
//! Registers CTRL+SHIFT+R (primary button) and CTRL+SHIFT+Backspace (reset)
//! and forwards presses to the main application as [`AppCommand`]s.

use crate::{AppCommand, AppError, AppResult};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Ids of the registered hotkeys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyIds {
    /// Record / stop / play.
    pub primary: u32,
    /// Reset.
    pub reset: u32,
}

/// Forwards global hotkey presses to the application.
pub struct HotkeyHandler {
    ids: HotkeyIds,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Register the recorder hotkeys.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao`/`winit` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkeys to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkeys() -> AppResult<(GlobalHotKeyManager, HotkeyIds)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let modifiers = Some(Modifiers::CONTROL | Modifiers::SHIFT);
        let primary = HotKey::new(modifiers, Code::KeyR);
        let reset = HotKey::new(modifiers, Code::Backspace);

        manager
            .register(primary)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register CTRL+SHIFT+R: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        manager
            .register(reset)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register CTRL+SHIFT+Backspace: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(
            primary = "CTRL+SHIFT+R",
            reset = "CTRL+SHIFT+Backspace",
            "Global hotkeys registered"
        );

        Ok((
            manager,
            HotkeyIds {
                primary: primary.id(),
                reset: reset.id(),
            },
        ))
    }

    /// Create a handler for previously registered hotkeys.
    ///
    /// This struct is `Send` and can live on any thread; it only listens on
    /// the global [`GlobalHotKeyEvent`] channel.
    pub fn new(ids: HotkeyIds, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self { ids, command_tx }
    }

    /// Command bound to hotkey `id`, if it is one of ours.
    pub fn command_for(&self, id: u32) -> Option<AppCommand> {
        if id == self.ids.primary {
            Some(AppCommand::PrimaryButton)
        } else if id == self.ids.reset {
            Some(AppCommand::Reset)
        } else {
            None
        }
    }

    /// Run the hotkey handler event loop until a shutdown signal is received.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // Shutdown: when event_rx is dropped (loop breaks), the next
        // event_tx.blocking_send() fails, breaking the blocking loop.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    // Key release fires a second event; act on press only.
                    if event.state != HotKeyState::Pressed {
                        continue;
                    }
                    if let Some(command) = self.command_for(event.id) {
                        self.forward(command).await?;
                    }
                }
            }
        }

        drop(event_rx);

        // The blocking task may be stuck in recv() if no hotkey event arrives
        // after shutdown; it is cleaned up by the runtime on process exit.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn forward(&self, command: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", command, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(?command, "Hotkey forwarded");
        Ok(())
    }
}
