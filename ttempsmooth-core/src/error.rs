// ============================================================================
// ttempsmooth-core/src/error.rs
// ============================================================================
//
// ERROR HANDLING: Custom Error Types for ttempsmooth-core
//
// This module defines the error type used throughout the library. Almost
// every failure is a configuration-time failure: the constructor validates
// parameters and clip geometry once, after which the per-frame kernel has
// no numeric failure paths. The remaining per-frame errors come from the
// host side (frame lookup, frame geometry) and from the ordering contract
// of the best-match memory.

use thiserror::Error;

/// Error type for the temporal smoothing library.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A configuration parameter is outside its documented range.
    #[error("Invalid parameter '{field}': {message}")]
    InvalidParameter {
        field: &'static str,
        message: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The reference clip does not match the source clip.
    #[error("Reference clip mismatch: {0}")]
    ReferenceMismatch(String),

    /// A frame handed over by the host does not match the clip's geometry.
    #[error("Frame geometry error: {0}")]
    FrameGeometry(String),

    #[error("Frame {requested} is out of range (clip has {len} frames)")]
    FrameIndexOutOfRange { requested: usize, len: usize },

    /// The best-match memory was asked to skip or revisit frames.
    #[error("Out-of-order frame request: expected frame {expected}, got {requested}")]
    OutOfOrderFrame { expected: usize, requested: usize },

    #[error("Best-match memory is required for this configuration but none was supplied")]
    MissingMemory,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl CoreError {
    /// Shorthand for building an `InvalidParameter` error.
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        CoreError::InvalidParameter {
            field,
            message: message.into(),
        }
    }
}

/// Result type for ttempsmooth-core operations.
pub type CoreResult<T> = std::result::Result<T, CoreError>;
