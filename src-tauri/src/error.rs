//! Error types for the Floatpet shell
//!
//! All errors use thiserror for structured error handling.
//! These errors can be serialized to the frontend.

use floatpet_core::SettingsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("Tauri error: {0}")]
    Tauri(#[from] tauri::Error),

    #[error("Bubble not found: {0}")]
    BubbleNotFound(u64),

    #[error("{0}")]
    Generic(String),
}

impl serde::Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_message() {
        let error = AppError::from(SettingsError::OutOfRange {
            field: "presence",
            value: 140,
            min: 0,
            max: 100,
        });

        let json = serde_json::to_string(&error).unwrap();
        assert!(json.starts_with('"'));
        assert!(json.contains("presence"));
        assert!(json.contains("140"));
    }

    #[test]
    fn test_bubble_not_found_message() {
        assert_eq!(AppError::BubbleNotFound(7).to_string(), "Bubble not found: 7");
    }
}
