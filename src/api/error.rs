//! Catalog API error types

use thiserror::Error;

/// Errors returned by the catalog HTTP collaborators
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection, TLS or timeout failure
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with a non-success status
    #[error("Request failed with status {0}")]
    Status(u16),

    /// Catalog answered successfully but without any songs
    #[error("No songs returned")]
    EmptyResult,

    /// Response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// The update endpoint could not provide a replacement link
    #[error("Link refresh rejected: {0}")]
    Rejected(String),
}

impl ApiError {
    /// Whether retrying the same request later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::Network(_))
            || matches!(self, ApiError::Status(code) if *code >= 500)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            ApiError::Status(status.as_u16())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Result type for catalog operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(ApiError::Network("reset".into()).is_transient());
        assert!(ApiError::Status(503).is_transient());
        assert!(!ApiError::Status(404).is_transient());
        assert!(!ApiError::EmptyResult.is_transient());
    }
}
