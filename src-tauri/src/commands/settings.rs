//! Settings-related commands
//!
//! Commands for reading and changing the overlay settings from the settings
//! window. Every successful change notifies the tray and all windows through
//! the settings store subscription installed at startup.

use crate::app::AppState;
use crate::error::Result;
use floatpet_core::placement::Point;
use floatpet_core::settings::{Settings, SettingsUpdate, TextStyle, Tone};
use serde::Serialize;
use tauri::State;

/// Key and display label of one selectable option
#[derive(Debug, Clone, Serialize)]
pub struct OptionLabel {
    pub key: &'static str,
    pub label: &'static str,
}

/// Choices for the style and tone dropdowns
#[derive(Debug, Clone, Serialize)]
pub struct TextOptions {
    pub styles: Vec<OptionLabel>,
    pub tones: Vec<OptionLabel>,
}

pub fn text_options() -> TextOptions {
    TextOptions {
        styles: TextStyle::ALL
            .into_iter()
            .map(|style| OptionLabel {
                key: style.key(),
                label: style.label(),
            })
            .collect(),
        tones: Tone::ALL
            .into_iter()
            .map(|tone| OptionLabel {
                key: tone.key(),
                label: tone.label(),
            })
            .collect(),
    }
}

#[tauri::command]
pub fn get_settings(state: State<'_, AppState>) -> Settings {
    state.orchestrator.settings().snapshot()
}

#[tauri::command]
pub fn get_text_options() -> TextOptions {
    text_options()
}

/// Apply a full settings window submission ("OK")
#[tauri::command]
pub fn apply_settings(state: State<'_, AppState>, update: SettingsUpdate) -> Result<Settings> {
    let settings = state.orchestrator.settings();
    settings.apply(update)?;
    tracing::info!("Settings applied from settings window");
    Ok(settings.snapshot())
}

#[tauri::command]
pub fn reset_position(state: State<'_, AppState>) -> Point {
    let settings = state.orchestrator.settings();
    settings.reset_position();
    settings.position()
}
