//! Error types for querycoord
//!
//! Provides the error type shared by all querycoord crates.

use thiserror::Error;

/// Result type alias for querycoord core operations
pub type Result<T> = std::result::Result<T, CoordError>;

/// Unified error type for querycoord
#[derive(Error, Debug)]
pub enum CoordError {
    // ===== Plan Errors =====
    #[error("Invalid balance plan: {0}")]
    InvalidPlan(String),

    // ===== I/O Errors =====
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ===== Serialization Errors =====
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CoordError {
    fn from(err: serde_json::Error) -> Self {
        CoordError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for CoordError {
    fn from(err: toml::de::Error) -> Self {
        CoordError::Serialization(err.to_string())
    }
}
