//! Shell configuration constants
//!
//! Window labels, pages and sizes used by the desktop shell. Overlay
//! behaviour lives in `floatpet_core::config`.

// ===== Logging =====

/// Matches the bundle identifier in tauri.conf.json
pub const APP_IDENTIFIER: &str = "com.swatto.floatpet";

/// Base name of the daily rolling log file
pub const LOG_FILE_NAME: &str = "floatpet.log";

/// Overrides the log directory when set
pub const LOG_DIR_ENV: &str = "FLOATPET_LOG_DIR";

pub const DEFAULT_LOG_FILTER: &str = "floatpet=debug,floatpet_core=debug,info";

// ===== Window Labels =====

pub const SETTINGS_WINDOW_LABEL: &str = "settings";
pub const ABOUT_WINDOW_LABEL: &str = "about";

/// Bubble windows are labelled `bubble-<id>`
pub const BUBBLE_LABEL_PREFIX: &str = "bubble-";

pub const TRAY_ID: &str = "main-tray";
pub const TRAY_TOOLTIP: &str = "Floatpet";

// ===== Pages =====

pub const BUBBLE_PAGE: &str = "bubble.html";
pub const SETTINGS_PAGE: &str = "settings.html";
pub const ABOUT_PAGE: &str = "about.html";

// ===== Window Dimensions =====

/// Settings window size in logical pixels
pub const SETTINGS_WINDOW_WIDTH: f64 = 420.0;
pub const SETTINGS_WINDOW_HEIGHT: f64 = 620.0;
pub const SETTINGS_WINDOW_MIN_WIDTH: f64 = 380.0;
pub const SETTINGS_WINDOW_MIN_HEIGHT: f64 = 480.0;

pub const ABOUT_WINDOW_WIDTH: f64 = 360.0;
pub const ABOUT_WINDOW_HEIGHT: f64 = 300.0;

// ===== Tray =====

/// Presence values offered in the tray submenu
pub const PRESENCE_STEPS: [u8; 11] = [0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

// ===== Events =====

/// Emitted to every window with the new settings snapshot
pub const SETTINGS_CHANGED_EVENT: &str = "settings-changed";

/// Emitted to a bubble window to start a fade animation
pub const BUBBLE_FADE_EVENT: &str = "bubble-fade";

pub fn bubble_label(id: u64) -> String {
    format!("{}{}", BUBBLE_LABEL_PREFIX, id)
}

/// Bubble id from a window label, if it is a bubble window
pub fn bubble_id_from_label(label: &str) -> Option<u64> {
    label.strip_prefix(BUBBLE_LABEL_PREFIX)?.parse().ok()
}
