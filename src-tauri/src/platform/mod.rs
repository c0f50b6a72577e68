//! Platform-specific functionality
//!
//! Foreground window title lookup for the activity monitor. Only Windows
//! has a real implementation; elsewhere the sentinel title is reported,
//! which classifies as general activity.

use floatpet_core::activity::WindowTitleSource;
use floatpet_core::Result;

/// Reads the title of the window that currently has focus
#[derive(Debug, Clone, Copy, Default)]
pub struct ForegroundWindow;

impl WindowTitleSource for ForegroundWindow {
    fn active_window_title(&self) -> Result<String> {
        active_window_title()
    }
}

#[cfg(target_os = "windows")]
fn active_window_title() -> Result<String> {
    use windows::Win32::UI::WindowsAndMessaging::{GetForegroundWindow, GetWindowTextW};

    let mut buffer = [0u16; 512];

    // SAFETY: the handle is only passed back to GetWindowTextW, which
    // tolerates stale handles, and the buffer outlives the call.
    let len = unsafe {
        let hwnd = GetForegroundWindow();
        if hwnd.is_invalid() {
            return Ok(String::new());
        }
        GetWindowTextW(hwnd, &mut buffer)
    };

    let len = usize::try_from(len).unwrap_or(0).min(buffer.len());
    Ok(String::from_utf16_lossy(&buffer[..len]))
}

#[cfg(not(target_os = "windows"))]
fn active_window_title() -> Result<String> {
    Ok(floatpet_core::activity::UNKNOWN_WINDOW_TITLE.to_string())
}
