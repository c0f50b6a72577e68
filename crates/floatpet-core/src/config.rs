//! Behaviour configuration constants
//!
//! Central location for timing, placement and validation boundaries used
//! throughout the overlay.

use std::time::Duration;

use crate::placement::Point;

// ===== Presence & Interval =====

/// Lowest accepted presence value (bubbles appear rarely)
pub const MIN_PRESENCE: u8 = 0;
/// Highest accepted presence value (bubbles appear often)
pub const MAX_PRESENCE: u8 = 100;
/// Presence applied on every launch
pub const DEFAULT_PRESENCE: u8 = 70;

/// Display interval at presence 0, in seconds
pub const MAX_INTERVAL_SECS: f64 = 120.0;
/// Display interval at presence 100, in seconds
pub const MIN_INTERVAL_SECS: f64 = 5.0;

/// Relative jitter applied around the base interval (0.2 = ±20%)
pub const INTERVAL_JITTER: f64 = 0.2;

// ===== Message Batching =====

/// Fewest bubbles spawned per display tick
pub const MIN_MESSAGE_COUNT: u8 = 1;
/// Most bubbles spawned per display tick
pub const MAX_MESSAGE_COUNT: u8 = 5;
/// Message count applied on every launch
pub const DEFAULT_MESSAGE_COUNT: u8 = 2;

// ===== Placement =====

/// Fixed position used until the user drags a bubble somewhere else
pub const DEFAULT_FIXED_POSITION: Point = Point { x: 100, y: 100 };

/// Probability that a random placement snaps one axis to a screen edge
pub const EDGE_SNAP_PROBABILITY: f64 = 0.3;

/// Gap between the pointer and a bubble in mouse-follow mode, in pixels
pub const MOUSE_FOLLOW_MARGIN: i32 = 30;

// ===== Bubble Appearance =====

/// Minimum bubble width in logical pixels
pub const BUBBLE_MIN_WIDTH: u32 = 200;
/// Minimum bubble height in logical pixels
pub const BUBBLE_MIN_HEIGHT: u32 = 80;
/// Width at which bubble text wraps onto a new line
pub const BUBBLE_MAX_WIDTH: u32 = 360;
/// Approximate advance of one glyph at the bubble font size
pub const BUBBLE_GLYPH_WIDTH: u32 = 16;
/// Height of one wrapped line of bubble text
pub const BUBBLE_LINE_HEIGHT: u32 = 24;
/// Horizontal + vertical padding around the text
pub const BUBBLE_PADDING: u32 = 40;

/// Translucent background palette, RGBA
pub const BUBBLE_PALETTE: [[u8; 4]; 6] = [
    [255, 200, 200, 220], // pink
    [200, 255, 200, 220], // light green
    [200, 200, 255, 220], // light blue
    [255, 255, 200, 220], // light yellow
    [255, 200, 255, 220], // light purple
    [200, 255, 255, 220], // light cyan
];

// ===== Bubble Timing =====

/// Duration of both the fade-in and fade-out animations
pub const FADE_DURATION: Duration = Duration::from_millis(300);

/// Shortest time a bubble stays fully visible, in milliseconds
pub const MIN_HOLD_MS: u64 = 3_000;
/// Longest time a bubble stays fully visible, in milliseconds
pub const MAX_HOLD_MS: u64 = 6_000;

// ===== Activity Detection =====

/// How often the foreground window title is re-classified
pub const ACTIVITY_REFRESH_PERIOD: Duration = Duration::from_secs(2);
