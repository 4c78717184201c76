//! Error types for fencetag operations.
//!
//! The attribution engine itself never fails: scanning, normalizing,
//! classifying and reattaching all degrade to neutral results. Errors only
//! come from the outer layers, namely HTML→Markdown conversion, selector
//! parsing, configuration loading and serialization.
//!
//! # Example
//!
//! ```rust
//! use fencetag_core::{FencetagError, Result};
//!
//! fn check_threshold(value: f64) -> Result<f64> {
//!     if !(0.0..=1.0).contains(&value) {
//!         return Err(FencetagError::ConfigError(format!("min_confidence out of range: {value}")));
//!     }
//!     Ok(value)
//! }
//! # assert!(check_threshold(0.3).is_ok());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for conversion and configuration operations.
#[derive(Error, Debug)]
pub enum FencetagError {
    /// The HTML→Markdown converter failed.
    ///
    /// Wraps the I/O error reported by the `htmd` converter.
    #[error("Failed to convert HTML to Markdown: {0}")]
    ConversionError(String),

    /// HTML parsing errors.
    ///
    /// Returned for invalid CSS selectors; malformed markup itself is
    /// recovered by the parser and never reported.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// Invalid configuration values.
    ///
    /// Returned when a weight is negative or not finite, or a threshold
    /// lies outside `[0, 1]`.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Configuration file could not be deserialized.
    #[error("Failed to parse configuration: {0}")]
    ConfigParseError(#[from] serde_json::Error),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O errors while reading configuration or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Report serialization failed.
    #[error("Failed to serialize output: {0}")]
    Serialization(String),
}

/// Result type alias for FencetagError.
pub type Result<T> = std::result::Result<T, FencetagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FencetagError::ConfigError("bad weight".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("bad weight"));
    }

    #[test]
    fn test_conversion_error() {
        let err = FencetagError::ConversionError("unexpected EOF".to_string());
        assert!(err.to_string().contains("unexpected EOF"));
    }

    #[test]
    fn test_parse_error_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: FencetagError = parse_err.into();
        assert!(matches!(err, FencetagError::ConfigParseError(_)));
    }

    #[test]
    fn test_file_not_found() {
        let err = FencetagError::FileNotFound(PathBuf::from("/nope/config.json"));
        assert!(err.to_string().contains("/nope/config.json"));
    }
}
