//! Desktop surface abstraction
//!
//! The orchestrator never touches windows directly. Whatever hosts the
//! bubbles (a webview shell, a test recorder) implements [`BubbleSurface`].

use std::time::Duration;

use crate::bubble::{BubbleId, BubbleView};
use crate::error::Result;
use crate::placement::{Point, Rect};

/// Direction of an opacity animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fade {
    In,
    Out,
}

pub trait BubbleSurface: Send + Sync {
    /// Usable area of the primary monitor
    fn work_area(&self) -> Result<Rect>;

    fn cursor_position(&self) -> Result<Point>;

    /// Physical pixels per logical pixel on the monitor bubbles open on.
    /// Work area, cursor and bubble positions are all physical.
    fn scale_factor(&self) -> Result<f64> {
        Ok(1.0)
    }

    /// Create the on-screen element for a bubble, fully transparent.
    /// `bubble.size` is in physical pixels.
    fn open(&self, bubble: &BubbleView) -> Result<()>;

    /// Animate opacity over `duration`
    fn fade(&self, id: BubbleId, fade: Fade, duration: Duration) -> Result<()>;

    fn move_to(&self, id: BubbleId, position: Point) -> Result<()>;

    /// Destroy the element. Called exactly once per opened bubble.
    fn close(&self, id: BubbleId) -> Result<()>;
}
