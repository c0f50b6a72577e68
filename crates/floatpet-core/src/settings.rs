//! Settings store
//!
//! Holds the user-tunable overlay parameters for the lifetime of the
//! process. Nothing is written to disk: every launch starts from the
//! defaults below.
//!
//! Every successful write synchronously notifies all subscribers with the
//! new snapshot. Rejected writes leave the state untouched and notify no one.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{
    DEFAULT_FIXED_POSITION, DEFAULT_MESSAGE_COUNT, DEFAULT_PRESENCE, INTERVAL_JITTER,
    MAX_INTERVAL_SECS, MAX_MESSAGE_COUNT, MAX_PRESENCE, MIN_INTERVAL_SECS, MIN_MESSAGE_COUNT,
    MIN_PRESENCE,
};
use crate::error::SettingsError;
use crate::placement::{PlacementMode, Point};

/// Writing style of the phrases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    Funny,
    Provocative,
    SelfMockery,
    Clever,
}

impl TextStyle {
    pub const ALL: [TextStyle; 4] = [
        TextStyle::Funny,
        TextStyle::Provocative,
        TextStyle::SelfMockery,
        TextStyle::Clever,
    ];

    pub fn key(self) -> &'static str {
        match self {
            TextStyle::Funny => "funny",
            TextStyle::Provocative => "provocative",
            TextStyle::SelfMockery => "self_mockery",
            TextStyle::Clever => "clever",
        }
    }

    /// Human readable name for menus and the settings window
    pub fn label(self) -> &'static str {
        match self {
            TextStyle::Funny => "Funny",
            TextStyle::Provocative => "Provocative",
            TextStyle::SelfMockery => "Self-mockery",
            TextStyle::Clever => "Clever",
        }
    }
}

impl fmt::Display for TextStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for TextStyle {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextStyle::ALL
            .into_iter()
            .find(|style| style.key() == s.trim())
            .ok_or_else(|| SettingsError::UnknownStyle(s.to_string()))
    }
}

/// Tone of voice applied on top of the style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Normal,
    Sarcastic,
    Encouraging,
    Reminder,
    Questioning,
    Whispering,
}

impl Tone {
    pub const ALL: [Tone; 6] = [
        Tone::Normal,
        Tone::Sarcastic,
        Tone::Encouraging,
        Tone::Reminder,
        Tone::Questioning,
        Tone::Whispering,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Tone::Normal => "normal",
            Tone::Sarcastic => "sarcastic",
            Tone::Encouraging => "encouraging",
            Tone::Reminder => "reminder",
            Tone::Questioning => "questioning",
            Tone::Whispering => "whispering",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tone::Normal => "Normal",
            Tone::Sarcastic => "Sarcastic",
            Tone::Encouraging => "Encouraging",
            Tone::Reminder => "Reminder",
            Tone::Questioning => "Questioning",
            Tone::Whispering => "Whispering",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Tone {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tone::ALL
            .into_iter()
            .find(|tone| tone.key() == s.trim())
            .ok_or_else(|| SettingsError::UnknownTone(s.to_string()))
    }
}

/// Overlay settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// How often bubbles appear, 0 (rarely) to 100 (often)
    pub presence: u8,
    /// Bubbles spawned per display tick, 1 to 5
    pub message_count: u8,
    pub edge_adsorption: bool,
    pub mouse_following: bool,
    /// Whether bubbles appear at `position` instead of being placed
    pub fixed_position: bool,
    pub position: Point,
    pub text_style: TextStyle,
    pub tone: Tone,
    pub autostart: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            presence: DEFAULT_PRESENCE,
            message_count: DEFAULT_MESSAGE_COUNT,
            edge_adsorption: true,
            mouse_following: false,
            fixed_position: false,
            position: DEFAULT_FIXED_POSITION,
            text_style: TextStyle::Funny,
            tone: Tone::Normal,
            autostart: false,
        }
    }
}

impl Settings {
    /// Placement strategy implied by the position flags.
    /// Fixed position wins over mouse following, which wins over random.
    pub fn placement_mode(&self) -> PlacementMode {
        if self.fixed_position {
            PlacementMode::Fixed(self.position)
        } else if self.mouse_following {
            PlacementMode::FollowMouse
        } else {
            PlacementMode::Random {
                edge_snap: self.edge_adsorption,
            }
        }
    }
}

/// Everything the settings window submits on "OK"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub presence: i32,
    pub message_count: i32,
    pub edge_adsorption: bool,
    pub mouse_following: bool,
    pub fixed_position: bool,
    pub text_style: TextStyle,
    pub tone: Tone,
    pub autostart: bool,
}

/// Base display interval for a presence value, before jitter
pub fn base_interval(presence: u8) -> Duration {
    let presence = f64::from(presence.min(MAX_PRESENCE));
    let secs = MAX_INTERVAL_SECS
        - (presence / f64::from(MAX_PRESENCE)) * (MAX_INTERVAL_SECS - MIN_INTERVAL_SECS);
    Duration::from_secs_f64(secs)
}

/// Uniformly jitter `base` by up to ±`INTERVAL_JITTER`
pub fn jittered<R: Rng + ?Sized>(base: Duration, rng: &mut R) -> Duration {
    let secs = base.as_secs_f64();
    let spread = secs * INTERVAL_JITTER;
    Duration::from_secs_f64(rng.gen_range((secs - spread)..=(secs + spread)))
}

fn check_range(field: &'static str, value: i32, min: u8, max: u8) -> Result<u8, SettingsError> {
    if (i32::from(min)..=i32::from(max)).contains(&value) {
        Ok(value as u8)
    } else {
        Err(SettingsError::OutOfRange {
            field,
            value: i64::from(value),
            min: i64::from(min),
            max: i64::from(max),
        })
    }
}

/// Handle returned by [`SettingsStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&Settings) + Send + Sync>;

struct Inner {
    settings: Settings,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

/// Shared, observable settings
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<Mutex<Inner>>,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                settings,
                listeners: Vec::new(),
                next_subscription: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Listeners run outside the lock, so a poisoned guard still holds consistent data
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a change listener. It runs on the thread performing the write.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&Settings) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        let id = SubscriptionId(inner.next_subscription);
        inner.next_subscription += 1;
        inner.listeners.push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.lock().listeners.retain(|(sub, _)| *sub != id);
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> Settings {
        self.lock().settings.clone()
    }

    fn update(&self, apply: impl FnOnce(&mut Settings)) {
        let (snapshot, listeners) = {
            let mut inner = self.lock();
            apply(&mut inner.settings);
            let listeners: Vec<Listener> =
                inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
            (inner.settings.clone(), listeners)
        };

        for listener in listeners {
            listener(&snapshot);
        }
    }

    pub fn presence(&self) -> u8 {
        self.lock().settings.presence
    }

    /// Set presence (0-100)
    pub fn set_presence(&self, value: i32) -> Result<(), SettingsError> {
        let value = check_range("presence", value, MIN_PRESENCE, MAX_PRESENCE)?;
        self.update(|s| s.presence = value);
        Ok(())
    }

    pub fn message_count(&self) -> u8 {
        self.lock().settings.message_count
    }

    /// Set bubbles per tick (1-5)
    pub fn set_message_count(&self, count: i32) -> Result<(), SettingsError> {
        let count = check_range("message_count", count, MIN_MESSAGE_COUNT, MAX_MESSAGE_COUNT)?;
        self.update(|s| s.message_count = count);
        Ok(())
    }

    pub fn edge_adsorption(&self) -> bool {
        self.lock().settings.edge_adsorption
    }

    pub fn set_edge_adsorption(&self, enabled: bool) {
        self.update(|s| s.edge_adsorption = enabled);
    }

    pub fn mouse_following(&self) -> bool {
        self.lock().settings.mouse_following
    }

    pub fn set_mouse_following(&self, enabled: bool) {
        self.update(|s| s.mouse_following = enabled);
    }

    pub fn fixed_position(&self) -> bool {
        self.lock().settings.fixed_position
    }

    pub fn set_fixed_position(&self, enabled: bool) {
        self.update(|s| s.fixed_position = enabled);
    }

    pub fn position(&self) -> Point {
        self.lock().settings.position
    }

    pub fn set_position(&self, position: Point) {
        self.update(|s| s.position = position);
    }

    /// Move the fixed point back to its launch default
    pub fn reset_position(&self) {
        self.set_position(DEFAULT_FIXED_POSITION);
    }

    pub fn text_style(&self) -> TextStyle {
        self.lock().settings.text_style
    }

    pub fn set_text_style(&self, style: TextStyle) {
        self.update(|s| s.text_style = style);
    }

    pub fn tone(&self) -> Tone {
        self.lock().settings.tone
    }

    pub fn set_tone(&self, tone: Tone) {
        self.update(|s| s.tone = tone);
    }

    pub fn autostart(&self) -> bool {
        self.lock().settings.autostart
    }

    pub fn set_autostart(&self, enabled: bool) {
        self.update(|s| s.autostart = enabled);
    }

    /// Apply a full settings window submission.
    /// Either every field is applied with a single notification, or none is.
    pub fn apply(&self, update: SettingsUpdate) -> Result<(), SettingsError> {
        let presence = check_range("presence", update.presence, MIN_PRESENCE, MAX_PRESENCE)?;
        let count = check_range(
            "message_count",
            update.message_count,
            MIN_MESSAGE_COUNT,
            MAX_MESSAGE_COUNT,
        )?;

        self.update(|s| {
            s.presence = presence;
            s.message_count = count;
            s.edge_adsorption = update.edge_adsorption;
            s.mouse_following = update.mouse_following;
            s.fixed_position = update.fixed_position;
            s.text_style = update.text_style;
            s.tone = update.tone;
            s.autostart = update.autostart;
        });
        Ok(())
    }

    pub fn placement_mode(&self) -> PlacementMode {
        self.lock().settings.placement_mode()
    }

    /// Jittered display interval for the current presence.
    /// Recomputed on every call so presence changes apply to the next tick.
    pub fn display_interval(&self) -> Duration {
        self.display_interval_with(&mut rand::thread_rng())
    }

    pub fn display_interval_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        jittered(base_interval(self.presence()), rng)
    }
}
