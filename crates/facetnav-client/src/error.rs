//! Client error types.

use thiserror::Error;

/// Errors that can occur when fetching from the search backend.
///
/// Every variant surfaces as a single page-level error; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Non-success status.
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    /// No response in time.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Could not reach the backend.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Response body did not match the expected schema.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Request could not be built or sent.
    #[error("Request error: {0}")]
    Request(String),
}

impl FetchError {
    /// HTTP status, if the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Deserialization(e.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else if e.is_connect() {
            FetchError::Connection(e.to_string())
        } else if e.is_decode() {
            FetchError::Deserialization(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Http {
                status: status.as_u16(),
                url: e.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = FetchError::Http {
            status: 503,
            url: "http://localhost:8000/api/search/problem".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP error: 503 for http://localhost:8000/api/search/problem"
        );
        assert_eq!(err.status(), Some(503));
        assert_eq!(FetchError::Timeout("5s".to_string()).status(), None);
    }

    #[test]
    fn test_from_json_error() {
        let err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        assert!(matches!(FetchError::from(err), FetchError::Deserialization(_)));
    }
}
