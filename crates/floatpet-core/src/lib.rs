//! Floatpet core library
//!
//! Toolkit-independent logic of the Floatpet overlay: settings, activity
//! detection, phrase selection, bubble placement and lifecycle, and the
//! timers that tie them together. The desktop shell plugs in through
//! [`surface::BubbleSurface`] and [`activity::WindowTitleSource`].

pub mod activity;
pub mod bubble;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod phrases;
pub mod placement;
pub mod scheduler;
pub mod settings;
pub mod surface;

pub use error::{CoreError, LifecycleError, Result, SettingsError};
pub use orchestrator::Orchestrator;
pub use settings::{Settings, SettingsStore, SettingsUpdate};
