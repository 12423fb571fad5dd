//! Error types for FreshKeep
//!
//! All errors use thiserror for structured error handling.
//! These errors serialize to their display string so a presentation
//! layer can show them directly in a dialog.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot {action} item {id}: item is {status}")]
    InvalidTransition {
        id: String,
        action: &'static str,
        status: &'static str,
    },

    #[error("AI provider error: {0}")]
    Ai(String),

    #[error("Image search error: {0}")]
    ImageSearch(String),

    #[error("Configuration error: {0}")]
    Config(String),

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
    fn test_serializes_as_display_string() {
        let err = AppError::Validation("Name is required".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, r#""Validation error: Name is required""#);
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = AppError::InvalidTransition {
            id: "42".to_string(),
            action: "mark as bought",
            status: "active",
        };
        assert_eq!(err.to_string(), "Cannot mark as bought item 42: item is active");
    }
}
