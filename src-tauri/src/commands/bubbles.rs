//! Bubble window commands
//!
//! Bubble pages identify themselves by their window label, so pointer
//! commands take the calling window instead of an id.

use crate::app::AppState;
use crate::config::bubble_id_from_label;
use crate::error::{AppError, Result};
use floatpet_core::bubble::{BubbleId, BubbleView, PointerButton, PointerOutcome};
use floatpet_core::placement::Point;
use floatpet_core::Orchestrator;
use tauri::async_runtime::JoinHandle;
use tauri::{State, WebviewWindow};

fn calling_bubble(window: &WebviewWindow) -> Result<BubbleId> {
    bubble_id_from_label(window.label())
        .ok_or_else(|| AppError::Generic(format!("{} is not a bubble window", window.label())))
}

/// Text and look of a bubble, fetched by its page on load
#[tauri::command]
pub fn get_bubble(state: State<'_, AppState>, id: BubbleId) -> Result<BubbleView> {
    state
        .orchestrator
        .bubble(id)
        .ok_or(AppError::BubbleNotFound(id))
}

/// Pointer pressed on a bubble. Coordinates are physical screen pixels.
#[tauri::command]
pub fn bubble_pointer_down(
    window: WebviewWindow,
    state: State<'_, AppState>,
    button: i16,
    x: i32,
    y: i32,
) -> Result<()> {
    let id = calling_bubble(&window)?;
    let outcome =
        state
            .orchestrator
            .pointer_pressed(id, PointerButton::from(button), Point::new(x, y));

    if let PointerOutcome::ContextMenu(at) = outcome {
        tracing::debug!("Context menu for bubble {} at ({}, {})", id, at.x, at.y);
        window.popup_menu(state.tray.menu())?;
    }

    Ok(())
}

#[tauri::command]
pub fn bubble_pointer_move(
    window: WebviewWindow,
    state: State<'_, AppState>,
    x: i32,
    y: i32,
) -> Result<()> {
    let id = calling_bubble(&window)?;
    state.orchestrator.pointer_moved(id, Point::new(x, y));
    Ok(())
}

#[tauri::command]
pub fn bubble_pointer_up(
    window: WebviewWindow,
    state: State<'_, AppState>,
    button: i16,
) -> Result<()> {
    let id = calling_bubble(&window)?;
    state
        .orchestrator
        .pointer_released(id, PointerButton::from(button));
    Ok(())
}

/// Run an immediate batch on a blocking worker.
/// Window creation waits on the main thread, so it must not run there or on
/// an async worker.
pub fn display_in_background(orchestrator: Orchestrator) -> JoinHandle<()> {
    tauri::async_runtime::spawn_blocking(move || orchestrator.display_now())
}

/// Show a batch right away and restart the display timer
#[tauri::command]
pub async fn display_now(state: State<'_, AppState>) -> Result<()> {
    display_in_background(state.orchestrator.clone()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ForegroundWindow;
    use floatpet_core::phrases::FallbackPhrases;
    use floatpet_core::placement::Rect;
    use floatpet_core::surface::{BubbleSurface, Fade};
    use floatpet_core::{Result, SettingsStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Default)]
    struct CountingSurface {
        opened: AtomicUsize,
    }

    impl BubbleSurface for CountingSurface {
        fn work_area(&self) -> Result<Rect> {
            Ok(Rect::new(0, 0, 1920, 1080))
        }

        fn cursor_position(&self) -> Result<Point> {
            Ok(Point::new(960, 540))
        }

        fn open(&self, _bubble: &BubbleView) -> Result<()> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn fade(&self, _id: BubbleId, _fade: Fade, _duration: Duration) -> Result<()> {
            Ok(())
        }

        fn move_to(&self, _id: BubbleId, _position: Point) -> Result<()> {
            Ok(())
        }

        fn close(&self, _id: BubbleId) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_display_in_background_shows_a_batch() {
        let runtime = tauri::async_runtime::block_on(async { tokio::runtime::Handle::current() });
        let surface = Arc::new(CountingSurface::default());
        let orchestrator = Orchestrator::new(
            SettingsStore::default(),
            surface.clone(),
            Box::new(FallbackPhrases::default()),
            Arc::new(ForegroundWindow),
            runtime,
        );

        tauri::async_runtime::block_on(display_in_background(orchestrator.clone())).unwrap();

        assert_eq!(surface.opened.load(Ordering::SeqCst), 2);
        assert_eq!(orchestrator.live_count(), 2);
        orchestrator.shutdown();
    }
}
