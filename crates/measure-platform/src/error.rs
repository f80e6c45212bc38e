//! Common error types for measure-platform.

use thiserror::Error;

/// Platform-level errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("not supported on this platform")]
    NotSupported,
    #[error("no connected display found")]
    NoDisplay,
    #[error("display does not report its physical size")]
    UnknownPhysicalSize,
    #[error("display query failed: {0}")]
    QueryFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
