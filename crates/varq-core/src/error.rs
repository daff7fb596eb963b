//! Error types for varq.
//!
//! Every variant maps to an HTTP status code; server-class errors serialize
//! with a generic body while the details go to the logs.

use http::StatusCode;
use thiserror::Error;

/// Result type for varq operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for varq.
#[derive(Error, Debug)]
pub enum Error {
    // Request errors (4xx)
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    #[error("invalid sqon: {0}")]
    InvalidSqon(String),

    #[error("invalid sequence id: {0}")]
    InvalidSeqId(String),

    #[error("no partition found for sequence id {0}")]
    PartitionNotFound(i32),

    // Backend errors (500)
    #[error("database error: {0}")]
    Database(String),

    #[error("connection pool error: {0}")]
    ConnectionPool(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidBody(_) | Self::InvalidSqon(_) => StatusCode::BAD_REQUEST,

            Self::InvalidSeqId(_) | Self::PartitionNotFound(_) => StatusCode::NOT_FOUND,

            Self::Database(_) | Self::ConnectionPool(_) | Self::Internal(_) | Self::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Convert to a JSON error response body.
    ///
    /// Server-class errors are reported as a generic "internal server error";
    /// their details are logged, never returned to the client.
    pub fn to_json(&self) -> serde_json::Value {
        let message = if self.status_code().is_server_error() {
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        serde_json::json!({ "error": message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            Error::InvalidSqon("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidBody("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidSeqId("abc".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::PartitionNotFound(7).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::Database("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_error_body_keeps_message() {
        let json = Error::InvalidSqon("unauthorized or unknown field: foo".into()).to_json();
        assert!(json["error"].as_str().unwrap().contains("foo"));
    }

    #[test]
    fn test_server_error_body_is_generic() {
        let json = Error::Database("password=hunter2 rejected".into()).to_json();
        assert_eq!(json["error"], "internal server error");
    }
}
