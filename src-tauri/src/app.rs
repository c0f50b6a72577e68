//! Application state and initialization
//!
//! This module wires the overlay core to the desktop: the Tauri-backed
//! bubble surface, the foreground window source, the tray menu and the
//! settings change fan-out. Everything is made available through AppState.

use std::sync::Arc;

use floatpet_core::phrases::{FallbackPhrases, PhraseBook, PhraseLibrary};
use floatpet_core::{Orchestrator, Settings, SettingsStore};
use tauri::{App, AppHandle, Emitter, Manager};

use crate::config::SETTINGS_CHANGED_EVENT;
use crate::error::Result;
use crate::platform::ForegroundWindow;
use crate::surface::TauriSurface;
use crate::tray::{setup_tray, TrayMenu};

/// Central application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub tray: Arc<TrayMenu>,
}

/// Embedded phrase book, or the single fallback line if it fails to parse
fn load_phrases() -> Box<dyn PhraseLibrary> {
    match PhraseBook::builtin() {
        Ok(book) => Box::new(book),
        Err(e) => {
            tracing::error!("Failed to load built-in phrase book, using fallback: {}", e);
            Box::new(FallbackPhrases::default())
        }
    }
}

/// Mirror every settings change onto the tray and the open windows
fn on_settings_changed(app: &AppHandle, tray: &TrayMenu, settings: &Settings) {
    tracing::debug!("Settings changed: {:?}", settings);
    tray.sync(settings);

    if let Err(e) = app.emit(SETTINGS_CHANGED_EVENT, settings) {
        tracing::warn!("Failed to emit {} event: {}", SETTINGS_CHANGED_EVENT, e);
    }
}

/// Application setup - called once on startup
pub fn setup(app: &mut App) -> Result<()> {
    tracing::info!("Initializing overlay");

    let handle = app.handle().clone();

    // Timers and bubble lifecycles run on Tauri's tokio runtime
    let runtime = tauri::async_runtime::block_on(async { tokio::runtime::Handle::current() });

    let settings = SettingsStore::default();
    let orchestrator = Orchestrator::new(
        settings.clone(),
        Arc::new(TauriSurface::new(handle.clone())),
        load_phrases(),
        Arc::new(ForegroundWindow),
        runtime,
    );

    let tray = Arc::new(TrayMenu::build(&handle)?);
    tray.sync(&settings.snapshot());
    setup_tray(&handle, &tray)?;

    {
        let handle = handle.clone();
        let tray = Arc::clone(&tray);
        settings.subscribe(move |settings| on_settings_changed(&handle, &tray, settings));
    }

    app.manage(AppState {
        orchestrator: orchestrator.clone(),
        tray,
    });

    orchestrator.start();

    tracing::info!(
        "Overlay started: presence {}, {} message(s) per batch",
        settings.presence(),
        settings.message_count()
    );

    Ok(())
}
