use thiserror::Error;

/// Errors that abort a run before or while it is dispatched.
///
/// Failures of individual requests are never errors; they are recorded as
/// [`Status::ConnectionError`](crate::Status::ConnectionError) instead.
#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("a target URL is required (use `--url`)")]
    MissingUrl,
    #[error("the number of requests must be greater than zero")]
    ZeroRequests,
    #[error("the concurrency limit must be greater than zero")]
    ZeroConcurrency,
    #[error("cannot build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
    #[error("admission gate closed while dispatching")]
    GateClosed,
    #[error("dispatch loop failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ErrorKind {
    /// Whether this error was caused by invalid run parameters
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::MissingUrl | ErrorKind::ZeroRequests | ErrorKind::ZeroConcurrency
        )
    }
}

pub type Result<T> = std::result::Result<T, ErrorKind>;
