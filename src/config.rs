use crate::error::{ErrorKind, Result};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Validated parameters of a single load run.
///
/// A `RunConfig` can only be obtained through [`RunConfig::new`], so every
/// value that reaches the [`Dispatcher`](crate::Dispatcher) has a non-empty
/// URL and non-zero request and concurrency counts.
///
/// The stored concurrency never exceeds the number of requests or
/// [`Semaphore::MAX_PERMITS`]; permits beyond either bound could never be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    url: String,
    requests: usize,
    concurrency: usize,
    pacing: Duration,
}

impl RunConfig {
    pub fn new<S: Into<String>>(url: S, requests: usize, concurrency: usize) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(ErrorKind::MissingUrl);
        }
        if requests == 0 {
            return Err(ErrorKind::ZeroRequests);
        }
        if concurrency == 0 {
            return Err(ErrorKind::ZeroConcurrency);
        }
        let concurrency = concurrency.min(requests).min(Semaphore::MAX_PERMITS);
        Ok(RunConfig {
            url,
            requests,
            concurrency,
            pacing: Duration::from_secs(0),
        })
    }

    /// Sleep for `pacing` after each request has released its permit
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> usize {
        self.requests
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }
}
