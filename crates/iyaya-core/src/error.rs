use thiserror::Error;

/// Closed classification of request outcomes.
///
/// Classification happens once, at the HTTP layer; downstream code matches
/// on the kind and never inspects error message strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// No connectivity, DNS failure, connection refused or reset.
    Network,
    /// The request did not complete within its deadline.
    Timeout,
    /// Missing token, expired session, or a refused refresh (401/403).
    Auth,
    /// The backend rejected the request (4xx other than 401/403).
    Validation,
    /// The backend failed (5xx).
    Server,
    /// Anything that does not fit the categories above.
    Unknown,
}

impl ErrorKind {
    /// Whether a request failing with this kind is worth retrying.
    ///
    /// Retrying with a stale token or an invalid payload is useless, so
    /// `Auth` and `Validation` are terminal.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::Server | Self::Unknown
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Auth => "auth",
            Self::Validation => "validation",
            Self::Server => "server",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Uniform error surfaced by every client operation.
#[derive(Debug, Error)]
#[error("{kind} error: {message}")]
pub struct ServiceError {
    kind: ErrorKind,
    message: String,
    status: Option<u16>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ServiceError {
    /// Create an error with an explicit kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: None,
        }
    }

    /// Create a new Network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Create a new Timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }

    /// Create a new Auth error.
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Auth, message)
    }

    /// Create a new Validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a new Server error.
    pub fn server(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Server, message)
    }

    /// Create a new Unknown error.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// Classify an HTTP status code into an error kind.
    ///
    /// 401 and 403 map to `Auth`, other 4xx to `Validation`, 5xx to
    /// `Server`; anything else is `Unknown`.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let kind = match status {
            401 | 403 => ErrorKind::Auth,
            400..=499 => ErrorKind::Validation,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        };
        Self {
            kind,
            message: message.into(),
            status: Some(status),
            source: None,
        }
    }

    /// Attach the HTTP status code that produced this error.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_source(
        mut self,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// The classified kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The HTTP status, when the error originated from a response.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// The short, user-presentable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the retry policy may re-run the failed operation.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Whether this failure means the session is gone.
    pub fn is_auth(&self) -> bool {
        self.kind == ErrorKind::Auth
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        Self::unknown(format!("invalid response payload: {err}")).with_source(err)
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_401_classifies_as_auth() {
        let err = ServiceError::from_status(401, "session expired");
        assert_eq!(err.kind(), ErrorKind::Auth);
        assert_eq!(err.status(), Some(401));
        assert!(!err.is_retryable());
    }

    #[test]
    fn status_403_classifies_as_auth() {
        assert_eq!(
            ServiceError::from_status(403, "forbidden").kind(),
            ErrorKind::Auth
        );
    }

    #[test]
    fn status_4xx_classifies_as_validation() {
        for status in [400, 404, 409, 422] {
            let err = ServiceError::from_status(status, "bad request");
            assert_eq!(err.kind(), ErrorKind::Validation, "status {status}");
            assert!(!err.is_retryable());
        }
    }

    #[test]
    fn status_5xx_classifies_as_server() {
        for status in [500, 502, 503] {
            let err = ServiceError::from_status(status, "boom");
            assert_eq!(err.kind(), ErrorKind::Server, "status {status}");
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn network_and_timeout_are_retryable() {
        assert!(ServiceError::network("offline").is_retryable());
        assert!(ServiceError::timeout("deadline elapsed").is_retryable());
        assert!(ServiceError::unknown("???").is_retryable());
    }

    #[test]
    fn display_includes_kind_and_message() {
        let err = ServiceError::server("upstream down");
        assert_eq!(err.to_string(), "server error: upstream down");
    }

    #[test]
    fn json_error_converts_to_unknown() {
        let parse_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: ServiceError = parse_err.into();
        assert_eq!(err.kind(), ErrorKind::Unknown);
    }
}
