//! Tauri commands exposed to the frontend
//!
//! This module organizes commands into logical submodules:
//! - `bubbles`: Bubble content and pointer forwarding
//! - `settings`: Overlay settings
//! - `windows`: Settings and about windows

pub mod bubbles;
pub mod settings;
pub mod windows;

// Re-export all commands for convenient registration in lib.rs
pub use bubbles::*;
pub use settings::*;
pub use windows::*;

/// Application information structure
#[derive(Debug, serde::Serialize)]
pub struct AppInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
}

pub fn app_info() -> AppInfo {
    AppInfo {
        name: "Floatpet",
        version: env!("CARGO_PKG_VERSION"),
        description: env!("CARGO_PKG_DESCRIPTION"),
    }
}

/// Get application information for the about window
#[tauri::command]
pub fn get_app_info() -> AppInfo {
    app_info()
}
