//! # Error Types
//!
//! Custom error types for FunkinCTRL using `thiserror`.

use thiserror::Error;

/// Main error type for FunkinCTRL
#[derive(Debug, Error)]
pub enum FunkinCtrlError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Key injection backend errors
    #[error("Key injection error: {0}")]
    Injection(String),

    /// Sensor source errors
    #[error("Sensor error: {0}")]
    Sensor(String),

    /// Telemetry record (de)serialization errors
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for FunkinCTRL
pub type Result<T> = std::result::Result<T, FunkinCtrlError>;
