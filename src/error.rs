//! Error types for zmat.

use thiserror::Error;

/// Errors that can occur while constructing matrices.
#[derive(Debug, Error)]
pub enum MatError {
    /// Requested dimension does not fit the u32 coordinate range
    #[error("dimension {dim} exceeds the u32 coordinate range")]
    DimensionTooLarge {
        /// The dimension that was requested
        dim: usize,
    },
}

/// Result type for matrix operations
pub type Result<T> = std::result::Result<T, MatError>;
