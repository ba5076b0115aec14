//! Error types for ab-core
//!
//! HTTP failures reported by the API are classified into a closed set of
//! [`ErrorKind`]s. Everything else (transport failures, local validation,
//! configuration) has its own variant on [`Error`].

use thiserror::Error;

/// Result type alias for ab-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Closed taxonomy of API error statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    PayloadTooLarge,
    InvalidRequest,
    TooManyRequests,
    InternalServerError,
    BadGateway,
    ServiceUnavailable,
}

impl ErrorKind {
    /// Every kind, in status order
    pub const ALL: [ErrorKind; 10] = [
        ErrorKind::BadRequest,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::PayloadTooLarge,
        ErrorKind::InvalidRequest,
        ErrorKind::TooManyRequests,
        ErrorKind::InternalServerError,
        ErrorKind::BadGateway,
        ErrorKind::ServiceUnavailable,
    ];

    /// Map an HTTP status code to its kind, if the status is one the API documents
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            400 => Some(Self::BadRequest),
            401 => Some(Self::Unauthorized),
            403 => Some(Self::Forbidden),
            404 => Some(Self::NotFound),
            413 => Some(Self::PayloadTooLarge),
            422 => Some(Self::InvalidRequest),
            429 => Some(Self::TooManyRequests),
            500 => Some(Self::InternalServerError),
            502 => Some(Self::BadGateway),
            503 => Some(Self::ServiceUnavailable),
            _ => None,
        }
    }

    /// HTTP status code for this kind
    pub fn status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::PayloadTooLarge => 413,
            Self::InvalidRequest => 422,
            Self::TooManyRequests => 429,
            Self::InternalServerError => 500,
            Self::BadGateway => 502,
            Self::ServiceUnavailable => 503,
        }
    }

    /// Generic description used when the server sends no message
    pub fn description(self) -> &'static str {
        match self {
            Self::BadRequest => "the request was malformed",
            Self::Unauthorized => "the API key is missing or invalid",
            Self::Forbidden => "the API key lacks permission for this resource",
            Self::NotFound => "the requested resource was not found",
            Self::PayloadTooLarge => "the request payload is too large",
            Self::InvalidRequest => "the request data is invalid",
            Self::TooManyRequests => "the rate limit was exceeded",
            Self::InternalServerError => "the server encountered an internal error",
            Self::BadGateway => "the server gateway failed",
            Self::ServiceUnavailable => "the service is temporarily unavailable",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::BadRequest => "bad request",
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
            Self::NotFound => "not found",
            Self::PayloadTooLarge => "payload too large",
            Self::InvalidRequest => "invalid request",
            Self::TooManyRequests => "too many requests",
            Self::InternalServerError => "internal server error",
            Self::BadGateway => "bad gateway",
            Self::ServiceUnavailable => "service unavailable",
        };
        write!(f, "{name} ({})", self.status())
    }
}

/// Error type for ab-core operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("{kind}: {message}")]
    Api { kind: ErrorKind, message: String },

    #[error("unexpected status {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a classified API error
    pub fn api(kind: ErrorKind, message: impl Into<String>) -> Self {
        Error::Api {
            kind,
            message: message.into(),
        }
    }

    /// The classified kind, if this is an API error
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// HTTP status associated with this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { kind, .. } => Some(kind.status()),
            Error::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message carried by the error, without the kind prefix
    pub fn message(&self) -> String {
        match self {
            Error::Api { message, .. } | Error::UnexpectedStatus { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }

    /// Whether the request pipeline resubmits after this error.
    ///
    /// Only connection failures and gateway errors are transient; every
    /// other failure is raised to the caller immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Network(_)
                | Error::Api {
                    kind: ErrorKind::BadGateway,
                    ..
                }
        )
    }

    /// Process exit code for command-line consumers
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidInput(_) | Error::Config(_) => 2,
            Error::Network(_) => 3,
            Error::Api {
                kind: ErrorKind::Unauthorized | ErrorKind::Forbidden,
                ..
            } => 4,
            Error::Api {
                kind: ErrorKind::NotFound,
                ..
            } => 5,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_status(kind.status()), Some(kind));
        }
        assert_eq!(ErrorKind::from_status(200), None);
        assert_eq!(ErrorKind::from_status(504), None);
    }

    #[test]
    fn test_retryable_errors() {
        assert!(Error::Network("connection reset".into()).is_retryable());
        assert!(Error::api(ErrorKind::BadGateway, "gateway").is_retryable());

        assert!(!Error::api(ErrorKind::ServiceUnavailable, "down").is_retryable());
        assert!(!Error::api(ErrorKind::TooManyRequests, "slow down").is_retryable());
        assert!(!Error::api(ErrorKind::NotFound, "missing").is_retryable());
        assert!(!Error::InvalidInput("bad".into()).is_retryable());
    }

    #[test]
    fn test_display_includes_message() {
        let err = Error::api(ErrorKind::NotFound, "Could not find table Tasks");
        assert_eq!(
            err.to_string(),
            "not found (404): Could not find table Tasks"
        );
        assert_eq!(err.message(), "Could not find table Tasks");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Error::InvalidInput("x".into()).exit_code(), 2);
        assert_eq!(Error::Network("x".into()).exit_code(), 3);
        assert_eq!(Error::api(ErrorKind::Unauthorized, "x").exit_code(), 4);
        assert_eq!(Error::api(ErrorKind::NotFound, "x").exit_code(), 5);
        assert_eq!(Error::api(ErrorKind::BadRequest, "x").exit_code(), 1);
    }
}
