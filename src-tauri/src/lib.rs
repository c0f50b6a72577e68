//! Floatpet desktop shell
//!
//! Hosts the overlay core in a Tauri application: a tray icon with live
//! controls, one transparent window per bubble, and the settings and about
//! windows.

pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod surface;
pub mod tray;

use anyhow::Context;
use tauri::{Manager, RunEvent};

/// Build and run the application until the user exits
pub fn run() -> anyhow::Result<()> {
    let app = tauri::Builder::default()
        .setup(|app| {
            tracing::info!("Running app setup");
            app::setup(app)?;
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::get_app_info,
            commands::get_settings,
            commands::get_text_options,
            commands::apply_settings,
            commands::reset_position,
            commands::get_bubble,
            commands::bubble_pointer_down,
            commands::bubble_pointer_move,
            commands::bubble_pointer_up,
            commands::display_now,
            commands::open_settings_window,
            commands::open_about_window,
            commands::close_window,
        ])
        .build(tauri::generate_context!())
        .context("Failed to build the application")?;

    app.run(|handle, event| match event {
        // Closing the last settings window or bubble must not end the process
        RunEvent::ExitRequested {
            code: None, api, ..
        } => api.prevent_exit(),
        RunEvent::Exit => {
            if let Some(state) = handle.try_state::<app::AppState>() {
                state.orchestrator.shutdown();
            }
            tracing::info!("Floatpet exited");
            logging::shutdown();
        }
        _ => {}
    });

    Ok(())
}
