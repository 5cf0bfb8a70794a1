//! Error types for node queries.

use std::error::Error;
use std::fmt;

/// Broad classification of a failed query.
///
/// Callers crawling many nodes use this to tell "node is down" apart from
/// "node answered garbage" in diagnostics without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Timeout, refused connection, TLS failure or non-200 status.
    Network,
    /// The node answered but the body is not the expected JSON shape.
    MalformedResponse,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Network => write!(f, "network"),
            ErrorKind::MalformedResponse => write!(f, "malformed response"),
        }
    }
}

/// Errors that can occur while querying a node.
#[derive(Debug)]
pub enum ClientError {
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The HTTP request itself failed (connect, TLS, body read).
    Http(reqwest::Error),
    /// The node answered with something other than `200 OK`.
    Status(reqwest::StatusCode),
    /// The body could not be decoded into the expected shape.
    MalformedResponse(serde_json::Error),
}

impl ClientError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Timeout | ClientError::Http(_) | ClientError::Status(_) => {
                ErrorKind::Network
            }
            ClientError::MalformedResponse(_) => ErrorKind::MalformedResponse,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Timeout => write!(f, "Request timed out"),
            ClientError::Http(err) => write!(f, "HTTP request failed: {err}"),
            ClientError::Status(status) => write!(f, "Unexpected HTTP status: {status}"),
            ClientError::MalformedResponse(err) => write!(f, "Malformed response: {err}"),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ClientError::Timeout => None,
            ClientError::Http(err) => Some(err),
            ClientError::Status(_) => None,
            ClientError::MalformedResponse(err) => Some(err),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Http(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::MalformedResponse(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ClientError::Timeout.kind(), ErrorKind::Network);
        assert_eq!(
            ClientError::Status(reqwest::StatusCode::BAD_GATEWAY).kind(),
            ErrorKind::Network
        );

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ClientError::from(json_err);
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(ClientError::Timeout.to_string(), "Request timed out");
        assert_eq!(
            ClientError::Status(reqwest::StatusCode::NOT_FOUND).to_string(),
            "Unexpected HTTP status: 404 Not Found"
        );
        assert_eq!(ErrorKind::MalformedResponse.to_string(), "malformed response");
    }
}
