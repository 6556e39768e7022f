//! Central error handling for the draping technique
//!
//! Provides a unified DrapeError enum with consistent categorization
//! across capability and validation failures. GPU-frame failures never
//! surface here: a frame that cannot proceed is skipped, not failed.

/// Centralized error type for all technique operations
#[derive(thiserror::Error, Debug)]
pub enum DrapeError {
    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl DrapeError {
    /// Convenience constructors for common error types
    pub fn unsupported<T: ToString>(msg: T) -> Self {
        DrapeError::Unsupported(msg.to_string())
    }

    pub fn validation<T: ToString>(msg: T) -> Self {
        DrapeError::Validation(msg.to_string())
    }
}

/// Result type alias for technique operations
pub type DrapeResult<T> = Result<T, DrapeError>;
