//! Error types for the urgency library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`UrgencyError`] enum.
//!
//! # Examples
//!
//! ```
//! use urgency::error::{UrgencyError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(UrgencyError::validation("priority must be 1, 2 or 3"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for urgency operations.
///
/// Prediction never surfaces an error to callers; the `Prediction` variant only
/// travels between the model and the engine, which turns it into a fallback.
#[derive(Error, Debug)]
pub enum UrgencyError {
    /// I/O errors (corpus files, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Caller supplied an out-of-range priority or empty text
    #[error("Validation error: {0}")]
    Validation(String),

    /// Training could not produce a model
    #[error("Training error: {0}")]
    Training(String),

    /// Vectorizing or classifying a document failed
    #[error("Prediction error: {0}")]
    Prediction(String),

    /// Corpus store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Background scheduler errors
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with UrgencyError.
pub type Result<T> = std::result::Result<T, UrgencyError>;

impl UrgencyError {
    /// Create a new validation error.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        UrgencyError::Validation(msg.into())
    }

    /// Create a new training error.
    pub fn training<S: Into<String>>(msg: S) -> Self {
        UrgencyError::Training(msg.into())
    }

    /// Create a new prediction error.
    pub fn prediction<S: Into<String>>(msg: S) -> Self {
        UrgencyError::Prediction(msg.into())
    }

    /// Create a new store error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        UrgencyError::Store(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        UrgencyError::Config(msg.into())
    }

    /// Create a new scheduler error.
    pub fn scheduler<S: Into<String>>(msg: S) -> Self {
        UrgencyError::Scheduler(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        UrgencyError::Other(msg.into())
    }

    /// True for failures raised while building a model.
    pub fn is_training(&self) -> bool {
        matches!(self, UrgencyError::Training(_))
    }
}
