//! Helpers for exercising the dispatcher without a network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::client::Checker;
use crate::types::Status;

/// A [`Checker`] that answers from a fixed list of outcomes and records how
/// many checks run at the same time.
///
/// Request `n` gets outcome `n % outcomes.len()`, so the multiset of results
/// for a run only depends on the request count. Clones share their counters.
#[derive(Debug, Clone)]
pub struct FakeChecker {
    outcomes: Arc<Vec<Status>>,
    latency: Duration,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl FakeChecker {
    pub fn always(status: Status) -> Self {
        FakeChecker::sequence(vec![status])
    }

    /// # Panics
    ///
    /// Panics if `outcomes` is empty.
    pub fn sequence(outcomes: Vec<Status>) -> Self {
        assert!(!outcomes.is_empty(), "FakeChecker needs at least one outcome");
        FakeChecker {
            outcomes: Arc::new(outcomes),
            latency: Duration::from_millis(0),
            calls: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Hold every check open for `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of checks observed running at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Checker for FakeChecker {
    async fn check(&self, request_num: usize) -> Status {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if self.latency > Duration::from_millis(0) {
            tokio::time::sleep(self.latency).await;
        } else {
            tokio::task::yield_now().await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.outcomes[request_num % self.outcomes.len()].clone()
    }
}
