//! Error types for the cardscan-core library.
//!
//! Parsing never fails; these errors only surface while loading configuration
//! or compiling user-extended keyword tables.

use thiserror::Error;

/// Main error type for the cardscan library.
#[derive(Error, Debug)]
pub enum CardscanError {
    /// Configuration value out of range or otherwise unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// A keyword table could not be compiled into a pattern.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    /// Configuration file could not be parsed or serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the cardscan library.
pub type Result<T> = std::result::Result<T, CardscanError>;
