//! Bubble windows
//!
//! Each bubble is its own transparent, undecorated, always-on-top webview
//! window. The page fetches its text and look with `get_bubble` and runs
//! the opacity animations itself when told to by a fade event.
//!
//! Positions and sizes cross this boundary in physical pixels.

use std::time::Duration;

use floatpet_core::bubble::{BubbleId, BubbleView};
use floatpet_core::placement::{Point, Rect};
use floatpet_core::surface::{BubbleSurface, Fade};
use floatpet_core::{CoreError, Result};
use serde::Serialize;
use tauri::{
    AppHandle, Emitter, Manager, Monitor, PhysicalPosition, PhysicalSize, WebviewUrl,
    WebviewWindowBuilder,
};

use crate::config::{bubble_label, BUBBLE_FADE_EVENT, BUBBLE_PAGE};

fn surface_error(e: tauri::Error) -> CoreError {
    CoreError::Surface(e.to_string())
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
struct FadePayload {
    direction: &'static str,
    duration_ms: u64,
}

/// Desktop surface backed by Tauri webview windows
#[derive(Clone)]
pub struct TauriSurface {
    app: AppHandle,
}

impl TauriSurface {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }

    fn primary_monitor(&self) -> Result<Monitor> {
        self.app
            .primary_monitor()
            .map_err(surface_error)?
            .ok_or_else(|| CoreError::Surface("No primary monitor".to_string()))
    }
}

impl BubbleSurface for TauriSurface {
    fn work_area(&self) -> Result<Rect> {
        let monitor = self.primary_monitor()?;
        let area = monitor.work_area();
        Ok(Rect::new(
            area.position.x,
            area.position.y,
            area.size.width,
            area.size.height,
        ))
    }

    fn cursor_position(&self) -> Result<Point> {
        let cursor = self.app.cursor_position().map_err(surface_error)?;
        Ok(Point::new(cursor.x.round() as i32, cursor.y.round() as i32))
    }

    fn scale_factor(&self) -> Result<f64> {
        Ok(self.primary_monitor()?.scale_factor())
    }

    fn open(&self, bubble: &BubbleView) -> Result<()> {
        let label = bubble_label(bubble.id);
        let url = format!("{}?id={}", BUBBLE_PAGE, bubble.id);

        tracing::debug!(
            "Creating bubble window {} at ({}, {})",
            label,
            bubble.position.x,
            bubble.position.y
        );

        let window = WebviewWindowBuilder::new(&self.app, &label, WebviewUrl::App(url.into()))
            .title("Floatpet")
            .resizable(false)
            .decorations(false)
            .transparent(true)
            .shadow(false)
            .always_on_top(true)
            .skip_taskbar(true)
            .focused(false)
            .visible(false)
            .build()
            .map_err(surface_error)?;

        let placed = window
            .set_size(PhysicalSize::new(bubble.size.width, bubble.size.height))
            .and_then(|_| {
                window.set_position(PhysicalPosition::new(bubble.position.x, bubble.position.y))
            })
            .and_then(|_| window.show());

        if let Err(e) = placed {
            let _ = window.destroy();
            return Err(surface_error(e));
        }

        Ok(())
    }

    fn fade(&self, id: BubbleId, fade: Fade, duration: Duration) -> Result<()> {
        let payload = FadePayload {
            direction: match fade {
                Fade::In => "in",
                Fade::Out => "out",
            },
            duration_ms: duration.as_millis() as u64,
        };

        self.app
            .emit_to(bubble_label(id).as_str(), BUBBLE_FADE_EVENT, payload)
            .map_err(surface_error)
    }

    fn move_to(&self, id: BubbleId, position: Point) -> Result<()> {
        let window = self
            .app
            .get_webview_window(&bubble_label(id))
            .ok_or_else(|| CoreError::Surface(format!("No window for bubble {}", id)))?;

        window
            .set_position(PhysicalPosition::new(position.x, position.y))
            .map_err(surface_error)
    }

    fn close(&self, id: BubbleId) -> Result<()> {
        match self.app.get_webview_window(&bubble_label(id)) {
            Some(window) => window.destroy().map_err(surface_error),
            None => {
                tracing::debug!("Bubble window {} already gone", id);
                Ok(())
            }
        }
    }
}
