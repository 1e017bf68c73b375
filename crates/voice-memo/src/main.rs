//! Voice Memo: system-tray voice recorder with global hotkey control.

mod app;
mod app_command;
mod config;
mod error;
mod hotkey_handler;
mod icon_renderer;
mod tray_command;
mod tray_manager;
mod tray_sinks;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    tray_command::TrayCommand,
    tray_manager::{MenuIds, TrayManager},
    tray_sinks::{TrayDisplay, TraySender, TrayStateObserver, TrayVisualization},
};

use crate::config::Config;

use std::sync::{Arc, Mutex};

use global_hotkey::GlobalHotKeyManager;
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "voice_memo=debug,voice_memo_core=debug";

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    // Persists across event loop iterations; dropping it unregisters the hotkeys.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => {
                let updated = match cmd {
                    TrayCommand::SetState(state) => tray_manager.update_state(state),
                    TrayCommand::SetElapsed(elapsed) => tray_manager.set_elapsed(elapsed),
                    TrayCommand::SetLevels(levels) => tray_manager.set_levels(levels),
                    TrayCommand::Shutdown => {
                        *control_flow = ControlFlow::ExitWithCode(0);
                        Ok(())
                    }
                };
                if let Err(e) = updated {
                    error!(error = ?e, "Failed to update tray icon");
                }
                return;
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let config = match Config::load() {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to load config: {:?}", e);
                        std::process::exit(1);
                    }
                };

                if let Err(e) = config.ensure_recording_dir() {
                    error!("Failed to create recording directory: {:?}", e);
                    std::process::exit(1);
                }

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                // Register hotkeys on the main thread; tao's event loop pumps
                // the Windows messages needed for WM_HOTKEY delivery.
                let (manager, hotkey_ids) = match HotkeyHandler::register_hotkeys() {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("Failed to register hotkeys: {:?}", e);
                        std::process::exit(1);
                    }
                };
                hotkey_manager = Some(manager);

                let tray: Arc<dyn TraySender> = Arc::new(Mutex::new(tray_proxy.clone()));
                let menu_ids = tray_manager.menu_ids().clone();

                // The recorder holds audio streams that must stay on the
                // thread that built them, so it gets a single-threaded runtime.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Builder::new_current_thread()
                        .enable_all()
                        .build()
                    {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let app = match App::new(&config, Arc::clone(&tray), menu_ids) {
                            Ok(app) => app,
                            Err(e) => {
                                error!(error = ?e, "Failed to initialize recorder");
                                tray.send(TrayCommand::Shutdown);
                                return;
                            }
                        };

                        let hotkey_handler = HotkeyHandler::new(hotkey_ids, app.command_sender());
                        let shutdown_rx = app.shutdown_receiver();

                        tokio::join!(
                            async {
                                if let Err(e) = hotkey_handler.run(shutdown_rx).await {
                                    error!(error = ?e, "Hotkey handler error");
                                }
                            },
                            async {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        );
                    });
                });
            }
            _ => {}
        }

        // Keep hotkey_manager alive in the closure for the app's lifetime.
        let _ = &hotkey_manager;
    });
}
