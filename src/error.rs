// src/error.rs

//! Unified error handling for the schedule crawler.

use std::fmt;

use thiserror::Error;

/// Result type alias for schedule operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Subject name is blank or the "0" sentinel
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Origin answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    Status { url: String, status: u16 },

    /// The caller cancelled the operation
    #[error("Operation cancelled")]
    Cancelled,

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Regular expression failed to compile
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Expected content missing from a fetched page
    #[error("Not found: {0}")]
    NotFound(String),

    /// Cache store failure
    #[error("Cache error: {0}")]
    Cache(String),
}

impl AppError {
    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a cache error.
    pub fn cache(message: impl fmt::Display) -> Self {
        Self::Cache(message.to_string())
    }

    /// Whether this error came from a cancelled operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether this error was raised by request validation.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = AppError::Status {
            url: "https://example.com".to_string(),
            status: 503,
        };
        assert_eq!(err.to_string(), "HTTP status 503 for https://example.com");
    }

    #[test]
    fn test_predicates() {
        assert!(AppError::Cancelled.is_cancelled());
        assert!(AppError::bad_request("empty").is_bad_request());
        assert!(!AppError::not_found("x").is_cancelled());
    }
}
