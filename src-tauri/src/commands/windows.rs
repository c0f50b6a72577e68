//! Window management commands
//!
//! Commands for opening the settings and about windows. Bubble windows are
//! managed by the overlay surface, not here.

use crate::config::{
    ABOUT_PAGE, ABOUT_WINDOW_HEIGHT, ABOUT_WINDOW_LABEL, ABOUT_WINDOW_WIDTH, SETTINGS_PAGE,
    SETTINGS_WINDOW_HEIGHT, SETTINGS_WINDOW_LABEL, SETTINGS_WINDOW_MIN_HEIGHT,
    SETTINGS_WINDOW_MIN_WIDTH, SETTINGS_WINDOW_WIDTH,
};
use crate::error::Result;
use tauri::{Manager, WebviewUrl, WebviewWindowBuilder};

/// Configuration for creating a new window
pub struct WindowConfig {
    pub label: &'static str,
    pub url: &'static str,
    pub title: &'static str,
    pub width: f64,
    pub height: f64,
    pub min_width: f64,
    pub min_height: f64,
    pub resizable: bool,
}

/// Create a new window with the given configuration
/// Returns Ok(true) if a new window was created, Ok(false) if existing window was focused
pub fn create_or_focus_window(app: &tauri::AppHandle, config: WindowConfig) -> Result<bool> {
    if let Some(window) = app.get_webview_window(config.label) {
        match window.is_visible() {
            Ok(_) => {
                tracing::debug!("Window already open, focusing: {}", config.label);
                let _ = window.unminimize();
                let _ = window.show();
                let _ = window.set_focus();
                return Ok(false);
            }
            Err(_) => {
                tracing::debug!(
                    "Window exists but is invalid, will create new one: {}",
                    config.label
                );
            }
        }
    }

    tracing::debug!("Creating new window: {}", config.label);
    WebviewWindowBuilder::new(app, config.label, WebviewUrl::App(config.url.into()))
        .title(config.title)
        .inner_size(config.width, config.height)
        .min_inner_size(config.min_width, config.min_height)
        .resizable(config.resizable)
        .decorations(true)
        .always_on_top(true)
        .center()
        .build()?;

    tracing::info!("Window created successfully: {}", config.label);
    Ok(true)
}

/// Show the settings window, creating it if needed
pub fn show_settings_window(app: &tauri::AppHandle) -> Result<bool> {
    tracing::info!("Opening settings window");

    let config = WindowConfig {
        label: SETTINGS_WINDOW_LABEL,
        url: SETTINGS_PAGE,
        title: "Settings - Floatpet",
        width: SETTINGS_WINDOW_WIDTH,
        height: SETTINGS_WINDOW_HEIGHT,
        min_width: SETTINGS_WINDOW_MIN_WIDTH,
        min_height: SETTINGS_WINDOW_MIN_HEIGHT,
        resizable: true,
    };

    create_or_focus_window(app, config)
}

/// Show the about window, creating it if needed
pub fn show_about_window(app: &tauri::AppHandle) -> Result<bool> {
    tracing::info!("Opening about window");

    let config = WindowConfig {
        label: ABOUT_WINDOW_LABEL,
        url: ABOUT_PAGE,
        title: "About - Floatpet",
        width: ABOUT_WINDOW_WIDTH,
        height: ABOUT_WINDOW_HEIGHT,
        min_width: ABOUT_WINDOW_WIDTH,
        min_height: ABOUT_WINDOW_HEIGHT,
        resizable: false,
    };

    create_or_focus_window(app, config)
}

// Window creation from a synchronous command deadlocks on Windows

#[tauri::command]
pub async fn open_settings_window(app: tauri::AppHandle) -> Result<()> {
    show_settings_window(&app)?;
    Ok(())
}

#[tauri::command]
pub async fn open_about_window(app: tauri::AppHandle) -> Result<()> {
    show_about_window(&app)?;
    Ok(())
}

/// Close the calling window (settings "Cancel", about "OK")
#[tauri::command]
pub fn close_window(window: tauri::WebviewWindow) -> Result<()> {
    tracing::debug!("Closing window: {}", window.label());
    window.close()?;
    Ok(())
}
