//! Admission control for in-flight requests.
//!
//! The gate is a thin wrapper around [`tokio::sync::Semaphore`], which hands
//! out permits in FIFO order. A [`Permit`] returns its slot when it is
//! dropped, so a permit can only ever be released once.

use crate::error::{ErrorKind, Result};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Counting pool of `limit` interchangeable permits
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

/// One admitted slot. The slot is returned when this value goes away.
#[derive(Debug)]
#[must_use = "dropping a permit releases it immediately"]
pub struct Permit {
    _permit: OwnedSemaphorePermit,
}

impl AdmissionGate {
    pub fn new(limit: usize) -> Self {
        AdmissionGate {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    /// Wait until a permit is free and take it.
    ///
    /// There is no timeout. The only error is a closed gate, which cannot
    /// happen while the gate is owned by a running dispatcher.
    pub async fn acquire(&self) -> Result<Permit> {
        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| ErrorKind::GateClosed)?;
        Ok(Permit { _permit: permit })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of permits that can be taken without waiting
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Number of permits currently held
    pub fn in_use(&self) -> usize {
        self.limit - self.available()
    }
}

impl Permit {
    /// Give the slot back to the gate
    pub fn release(self) {
        drop(self);
    }
}
