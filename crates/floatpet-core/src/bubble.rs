//! Floating text bubbles
//!
//! A bubble is a short-lived on-screen element:
//! `Created -> Showing (fade in) -> Held -> FadingOut -> Closed`.
//! The state machine here is purely logical; the orchestrator drives it
//! with timers and mirrors each step onto the desktop surface.

use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use crate::config::{
    BUBBLE_GLYPH_WIDTH, BUBBLE_LINE_HEIGHT, BUBBLE_MAX_WIDTH, BUBBLE_MIN_HEIGHT,
    BUBBLE_MIN_WIDTH, BUBBLE_PADDING, BUBBLE_PALETTE, FADE_DURATION, MAX_HOLD_MS, MIN_HOLD_MS,
};
use crate::error::LifecycleError;
use crate::placement::{Point, Size};

pub type BubbleId = u64;

/// Lifecycle state of a bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BubbleState {
    Created,
    Showing,
    Held,
    FadingOut,
    Closed,
}

/// Background decoration, purely cosmetic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundStyle {
    Solid,
    Gradient,
    Bordered,
    Banded,
}

const BACKGROUND_STYLES: [BackgroundStyle; 4] = [
    BackgroundStyle::Solid,
    BackgroundStyle::Gradient,
    BackgroundStyle::Bordered,
    BackgroundStyle::Banded,
];

/// Everything the desktop surface needs to render a bubble
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleView {
    pub id: BubbleId,
    pub text: String,
    pub background: BackgroundStyle,
    /// RGBA
    pub color: [u8; 4],
    /// Window size in physical pixels
    pub size: Size,
    pub position: Point,
    pub state: BubbleState,
    pub fade_ms: u64,
    pub hold_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Bubble {
    id: BubbleId,
    text: String,
    background: BackgroundStyle,
    color: [u8; 4],
    hold: Duration,
    size: Size,
    position: Point,
    state: BubbleState,
}

impl Bubble {
    /// Create a bubble with a random look and hold duration
    pub fn new<R: Rng + ?Sized>(id: BubbleId, text: impl Into<String>, rng: &mut R) -> Self {
        let text = text.into();
        let size = estimate_size(&text);

        Self {
            id,
            background: BACKGROUND_STYLES[rng.gen_range(0..BACKGROUND_STYLES.len())],
            color: BUBBLE_PALETTE[rng.gen_range(0..BUBBLE_PALETTE.len())],
            hold: Duration::from_millis(rng.gen_range(MIN_HOLD_MS..=MAX_HOLD_MS)),
            text,
            size,
            position: Point::default(),
            state: BubbleState::Created,
        }
    }

    pub fn id(&self) -> BubbleId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn background(&self) -> BackgroundStyle {
        self.background
    }

    pub fn color(&self) -> [u8; 4] {
        self.color
    }

    /// How long the bubble stays fully visible
    pub fn hold(&self) -> Duration {
        self.hold
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn move_to(&mut self, position: Point) {
        self.position = position;
    }

    /// Resize for a display with `factor` physical pixels per logical pixel
    pub fn scale_to(&mut self, factor: f64) {
        self.size = estimate_size(&self.text).scaled(factor);
    }

    pub fn state(&self) -> BubbleState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state == BubbleState::Closed
    }

    pub fn view(&self) -> BubbleView {
        BubbleView {
            id: self.id,
            text: self.text.clone(),
            background: self.background,
            color: self.color,
            size: self.size,
            position: self.position,
            state: self.state,
            fade_ms: FADE_DURATION.as_millis() as u64,
            hold_ms: self.hold.as_millis() as u64,
        }
    }

    fn transition(
        &mut self,
        action: &'static str,
        from: BubbleState,
        to: BubbleState,
    ) -> Result<(), LifecycleError> {
        if self.state != from {
            return Err(LifecycleError::InvalidTransition {
                id: self.id,
                action,
                state: self.state,
            });
        }
        tracing::trace!("Bubble {}: {:?} -> {:?}", self.id, from, to);
        self.state = to;
        Ok(())
    }

    /// Start fading in
    pub fn show(&mut self) -> Result<(), LifecycleError> {
        self.transition("show", BubbleState::Created, BubbleState::Showing)
    }

    pub fn finish_fade_in(&mut self) -> Result<(), LifecycleError> {
        self.transition("finish fade-in", BubbleState::Showing, BubbleState::Held)
    }

    /// Hold elapsed, start fading out
    pub fn finish_hold(&mut self) -> Result<(), LifecycleError> {
        self.transition("finish hold", BubbleState::Held, BubbleState::FadingOut)
    }

    pub fn finish_fade_out(&mut self) -> Result<(), LifecycleError> {
        self.transition("finish fade-out", BubbleState::FadingOut, BubbleState::Closed)
    }

    /// Force the bubble closed from any state, e.g. on shutdown.
    /// Returns false when it was already closed.
    pub fn force_close(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.state = BubbleState::Closed;
        true
    }
}

/// Rough size for `text` in logical pixels, wrapping at `BUBBLE_MAX_WIDTH`
pub fn estimate_size(text: &str) -> Size {
    let glyphs = text.chars().count() as u32;
    let per_line = ((BUBBLE_MAX_WIDTH - BUBBLE_PADDING) / BUBBLE_GLYPH_WIDTH).max(1);
    let lines = glyphs.div_ceil(per_line).max(1);

    let width = if lines > 1 {
        BUBBLE_MAX_WIDTH
    } else {
        glyphs * BUBBLE_GLYPH_WIDTH + BUBBLE_PADDING
    };
    let height = lines * BUBBLE_LINE_HEIGHT + BUBBLE_PADDING;

    Size::new(width.max(BUBBLE_MIN_WIDTH), height.max(BUBBLE_MIN_HEIGHT))
}

/// Pointer button as reported by the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

impl From<i16> for PointerButton {
    /// DOM `MouseEvent.button` numbering
    fn from(button: i16) -> Self {
        match button {
            0 => PointerButton::Primary,
            2 => PointerButton::Secondary,
            _ => PointerButton::Other,
        }
    }
}

/// What a pointer event resulted in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Ignored,
    DragStarted,
    /// The bubble's top-left moved here
    Moved(Point),
    DragEnded,
    /// Show the context menu at this screen point
    ContextMenu(Point),
}

/// Tracks a primary-button drag over one bubble
#[derive(Debug, Clone, Copy, Default)]
pub struct DragTracker {
    grab_offset: Option<(i32, i32)>,
}

impl DragTracker {
    pub fn is_dragging(&self) -> bool {
        self.grab_offset.is_some()
    }

    pub fn press(&mut self, button: PointerButton, pointer: Point, window: Point) -> PointerOutcome {
        match button {
            PointerButton::Primary => {
                self.grab_offset = Some((pointer.x - window.x, pointer.y - window.y));
                PointerOutcome::DragStarted
            }
            PointerButton::Secondary => PointerOutcome::ContextMenu(pointer),
            PointerButton::Other => PointerOutcome::Ignored,
        }
    }

    pub fn moved(&self, pointer: Point) -> PointerOutcome {
        match self.grab_offset {
            Some((dx, dy)) => PointerOutcome::Moved(Point::new(pointer.x - dx, pointer.y - dy)),
            None => PointerOutcome::Ignored,
        }
    }

    pub fn release(&mut self, button: PointerButton) -> PointerOutcome {
        if button == PointerButton::Primary && self.grab_offset.take().is_some() {
            PointerOutcome::DragEnded
        } else {
            PointerOutcome::Ignored
        }
    }
}
