use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::{self, Display};
use std::time::Duration;

use crate::types::{Response, StatusClass};

/// Counts of finished requests per status class.
///
/// `add` bumps the class count and the total together, so the class
/// counts always sum up to `total`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ResponseStats {
    total: usize,
    statuses: BTreeMap<StatusClass, usize>,
}

impl ResponseStats {
    pub fn new() -> Self {
        ResponseStats::default()
    }

    pub fn add(&mut self, response: &Response) {
        *self.statuses.entry(response.status.class()).or_insert(0) += 1;
        self.total += 1;
    }

    /// Number of completed requests
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Count for a single status class, zero if it was never observed
    pub fn count(&self, class: StatusClass) -> usize {
        self.statuses.get(&class).copied().unwrap_or(0)
    }

    pub fn connection_errors(&self) -> usize {
        self.count(StatusClass::CONNECTION_FAILURE)
    }

    /// All observed classes with their counts, connection errors first
    pub fn statuses(&self) -> &BTreeMap<StatusClass, usize> {
        &self.statuses
    }
}

impl Extend<Response> for ResponseStats {
    fn extend<I: IntoIterator<Item = Response>>(&mut self, iter: I) {
        for response in iter {
            self.add(&response);
        }
    }
}

/// Outcome of a finished run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
    pub elapsed: Duration,
    #[serde(flatten)]
    pub stats: ResponseStats,
}

fn as_secs<S: serde::Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

impl Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Elapsed time: {:.2}s", self.elapsed.as_secs_f64())?;
        write!(f, "Total requests: {}", self.stats.total())?;
        for (class, count) in self.stats.statuses() {
            write!(f, "\n{}: {}", class, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::Status;
    use http::StatusCode;
    use pretty_assertions::assert_eq;

    fn ok(n: usize) -> Response {
        Response::new(n, Status::Http(StatusCode::OK))
    }

    #[test]
    fn test_stats() {
        let mut stats = ResponseStats::new();
        assert!(stats.is_empty());

        stats.add(&ok(0));
        stats.add(&Response::new(1, Status::Http(StatusCode::NOT_FOUND)));
        stats.add(&ok(2));
        stats.add(&Response::new(3, Status::ConnectionError("refused".into())));

        assert_eq!(stats.total(), 4);
        assert_eq!(stats.count(StatusCode::OK.into()), 2);
        assert_eq!(stats.count(StatusCode::NOT_FOUND.into()), 1);
        assert_eq!(stats.connection_errors(), 1);
        assert_eq!(stats.count(StatusCode::BAD_GATEWAY.into()), 0);
        assert_eq!(stats.statuses().values().sum::<usize>(), stats.total());
    }

    #[test]
    fn test_report_display() {
        let mut stats = ResponseStats::new();
        stats.extend(vec![
            ok(0),
            ok(1),
            Response::new(2, Status::Http(StatusCode::INTERNAL_SERVER_ERROR)),
            Response::new(3, Status::ConnectionError("timed out".into())),
        ]);
        let report = Report {
            elapsed: Duration::from_millis(1234),
            stats,
        };

        let expected = "Elapsed time: 1.23s\n\
                        Total requests: 4\n\
                        Connection errors: 1\n\
                        Status 200: 2\n\
                        Status 500: 1";
        assert_eq!(report.to_string(), expected);
    }

    #[test]
    fn test_report_json() {
        let mut stats = ResponseStats::new();
        stats.extend(vec![
            ok(0),
            Response::new(1, Status::ConnectionError("refused".into())),
        ]);
        let report = Report {
            elapsed: Duration::from_millis(500),
            stats,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "elapsed_secs": 0.5,
                "total": 2,
                "statuses": { "0": 1, "200": 1 }
            })
        );
    }
}
