//! System tray icon with state-based updates.
//!
//! Shows the recorder state as an icon, the elapsed time as the tray title
//! and a tooltip with the status, elapsed time and amplitude sparkline. The
//! context menu carries the primary control, Reset, Open Recording Folder and
//! Exit.

use crate::{AppError, AppResult, icon_renderer::render_icon};

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{info, instrument};
use tray_icon::menu::{Menu, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};
use voice_memo_core::{RecordingState, ZERO_ELAPSED};

/// Ids of the tray menu items, handed to the runtime thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuIds {
    /// Record / Stop / Play.
    pub primary: MenuId,
    /// Reset.
    pub reset: MenuId,
    /// Open Recording Folder.
    pub open_folder: MenuId,
    /// Exit.
    pub exit: MenuId,
}

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    primary_item: MenuItem,
    reset_item: MenuItem,
    menu_ids: MenuIds,
    state: RecordingState,
    elapsed: String,
    levels: String,
}

/// Tooltip text: `Voice Memo - <status> <MM:SS> <sparkline>`.
pub fn tooltip(state: RecordingState, elapsed: &str, levels: &str) -> String {
    let mut text = format!("Voice Memo - {} {}", state.label(), elapsed);
    if !levels.is_empty() {
        text.push(' ');
        text.push_str(levels);
    }
    text
}

impl TrayManager {
    /// Create a new tray manager in the initial recorder state.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let state = RecordingState::default();
        let menu = Menu::new();

        let primary_item = MenuItem::new(state.primary_control().label(), true, None);
        let reset_item = MenuItem::new("Reset", state.reset_enabled(), None);
        let open_folder_item = MenuItem::new("Open Recording Folder", true, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let menu_ids = MenuIds {
            primary: primary_item.id().clone(),
            reset: reset_item.id().clone(),
            open_folder: open_folder_item.id().clone(),
            exit: exit_item.id().clone(),
        };

        menu.append_items(&[
            &primary_item,
            &reset_item,
            &PredefinedMenuItem::separator(),
            &open_folder_item,
            &PredefinedMenuItem::separator(),
            &exit_item,
        ])
        .map_err(|e| AppError::TrayError {
            reason: format!("Failed to build tray menu: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let icon = Self::load_icon(state)?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(tooltip(state, ZERO_ELAPSED, ""))
            .with_menu(Box::new(menu))
            .with_icon(icon)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            primary_item,
            reset_item,
            menu_ids,
            state,
            elapsed: ZERO_ELAPSED.to_string(),
            levels: String::new(),
        })
    }

    /// Switch icon, primary item text and reset enablement to `state`.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, state: RecordingState) -> AppResult<()> {
        self.state = state;

        let icon = Self::load_icon(state)?;
        self.tray_icon
            .set_icon(Some(icon))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.primary_item.set_text(state.primary_control().label());
        self.reset_item.set_enabled(state.reset_enabled());

        self.refresh_tooltip()
    }

    /// Show a new elapsed time.
    #[track_caller]
    pub fn set_elapsed(&mut self, elapsed: String) -> AppResult<()> {
        self.tray_icon.set_title(Some(&elapsed));
        self.elapsed = elapsed;
        self.refresh_tooltip()
    }

    /// Show a new amplitude sparkline.
    #[track_caller]
    pub fn set_levels(&mut self, levels: String) -> AppResult<()> {
        self.levels = levels;
        self.refresh_tooltip()
    }

    /// Ids of the menu items.
    pub fn menu_ids(&self) -> &MenuIds {
        &self.menu_ids
    }

    #[track_caller]
    fn refresh_tooltip(&self) -> AppResult<()> {
        self.tray_icon
            .set_tooltip(Some(tooltip(self.state, &self.elapsed, &self.levels)))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    #[track_caller]
    fn load_icon(state: RecordingState) -> AppResult<Icon> {
        let rgba = render_icon(state);
        let (width, height) = (rgba.width(), rgba.height());

        Icon::from_rgba(rgba.into_raw(), width, height).map_err(|e| AppError::TrayError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
