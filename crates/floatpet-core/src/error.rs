//! Error types for the overlay core
//!
//! All errors use thiserror for structured error handling.

use thiserror::Error;

use crate::bubble::BubbleState;

/// Rejected settings write. State is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("Unknown text style: {0}")]
    UnknownStyle(String),

    #[error("Unknown tone: {0}")]
    UnknownTone(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

/// Illegal bubble lifecycle step
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("Bubble {id}: cannot {action} while {state:?}")]
    InvalidTransition {
        id: u64,
        action: &'static str,
        state: BubbleState,
    },

    #[error("Bubble not found: {0}")]
    NotFound(u64),
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    #[error("Surface error: {0}")]
    Surface(String),

    #[error("Phrase library error: {0}")]
    Phrases(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
