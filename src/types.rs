use serde::{Serialize, Serializer};
use std::fmt::{self, Display};

/// Aggregation key for a finished request: the numeric HTTP status code,
/// or `0` for a request that never got a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatusClass(u16);

impl StatusClass {
    /// Sentinel class for connection and transport failures
    pub const CONNECTION_FAILURE: StatusClass = StatusClass(0);

    pub fn as_u16(self) -> u16 {
        self.0
    }

    pub fn is_connection_failure(self) -> bool {
        self == Self::CONNECTION_FAILURE
    }
}

impl From<http::StatusCode> for StatusClass {
    fn from(code: http::StatusCode) -> Self {
        StatusClass(code.as_u16())
    }
}

impl Display for StatusClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_connection_failure() {
            write!(f, "Connection errors")
        } else {
            write!(f, "Status {}", self.0)
        }
    }
}

impl Serialize for StatusClass {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u16(self.0)
    }
}

/// Outcome of a single HTTP attempt
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    /// The server answered; every status code counts as an answer
    Http(http::StatusCode),
    /// The request could not be built or never got a response
    ConnectionError(String),
}

impl Status {
    pub fn class(&self) -> StatusClass {
        match self {
            Status::Http(code) => StatusClass::from(*code),
            Status::ConnectionError(_) => StatusClass::CONNECTION_FAILURE,
        }
    }

    pub fn is_connection_error(&self) -> bool {
        matches!(self, Status::ConnectionError(_))
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Http(code) => write!(f, "Status {}", code.as_u16()),
            Status::ConnectionError(e) => write!(f, "Connection error ({})", e),
        }
    }
}

impl From<reqwest::Error> for Status {
    fn from(e: reqwest::Error) -> Self {
        Status::ConnectionError(e.to_string())
    }
}

/// A finished request, tagged with its ordinal in the run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Response {
    pub request_num: usize,
    pub status: Status,
}

impl Response {
    pub fn new(request_num: usize, status: Status) -> Self {
        Response {
            request_num,
            status,
        }
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Request numbers are shown 1-based
        write!(f, "Request #{}: {}", self.request_num + 1, self.status)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_status_class_keeps_raw_code() {
        assert_eq!(Status::Http(StatusCode::OK).class().as_u16(), 200);
        assert_eq!(Status::Http(StatusCode::NOT_FOUND).class().as_u16(), 404);
        assert_eq!(
            Status::Http(StatusCode::INTERNAL_SERVER_ERROR).class().as_u16(),
            500
        );
    }

    #[test]
    fn test_connection_error_is_class_zero() {
        let status = Status::ConnectionError("connection refused".to_string());
        assert!(status.class().is_connection_failure());
        assert_eq!(status.class().as_u16(), 0);
    }

    #[test]
    fn test_response_display() {
        let ok = Response::new(0, Status::Http(StatusCode::OK));
        assert_eq!(ok.to_string(), "Request #1: Status 200");

        let failed = Response::new(4, Status::ConnectionError("refused".into()));
        assert_eq!(failed.to_string(), "Request #5: Connection error (refused)");
    }
}
