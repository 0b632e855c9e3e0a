//! Common error types for Coordinet components.

use thiserror::Error;

/// Common errors across Coordinet components
///
/// Numeric degeneracy inside the Vivaldi update has no variant here:
/// the engine turns it into a no-op.
#[derive(Debug, Error)]
pub enum CoordinetError {
    /// Missing or malformed request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Heartbeat for a node the registry does not know
    #[error("Node not found: {0}")]
    NotFound(String),

    /// Peer or registry could not be reached
    #[error("Unreachable: {0}")]
    Unreachable(String),

    /// Timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Response body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoordinetError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Unreachable(_) => 502,
            Self::Timeout(_) => 504,
            Self::MalformedResponse(_) => 502,
            Self::Config(_) => 500,
        }
    }

    /// Returns true if the failed round can simply be retried next period
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unreachable(_) | Self::Timeout(_) | Self::MalformedResponse(_)
        )
    }
}
