//! Completion barrier for the tasks of a run, with a single waiter and
//! many waitees.
//!
//! # Implementation Details
//!
//! This is a wrapper around [`tokio::sync::mpsc::channel`]. The [`WaitGroup`]
//! holds the unique [`Receiver`] and each [`WaitGuard`] holds a [`Sender`].
//! Nothing is ever sent; the receiver only observes that every sender has
//! been dropped. Because a guard is released by its destructor, the barrier
//! is decremented on every exit path of a task, including unwinding.

use futures::never::Never;
use tokio::sync::mpsc::{channel, Receiver, Sender};

/// Waiting side of the barrier.
///
/// A [`WaitGroup`] is single-use: [`WaitGroup::wait`] consumes it. Once all
/// [`WaitGuard`]s are gone, no new guards can be created.
#[derive(Debug)]
pub struct WaitGroup {
    recv: Receiver<Never>,
}

/// RAII guard held by one outstanding task.
///
/// Cloning a guard registers one more outstanding task.
#[derive(Clone, Debug)]
pub struct WaitGuard {
    _send: Sender<Never>,
}

impl WaitGroup {
    /// Creates a new [`WaitGroup`] and its first [`WaitGuard`].
    ///
    /// New guards are created by cloning the returned one.
    #[must_use]
    pub fn new() -> (Self, WaitGuard) {
        let (send, recv) = channel(1);
        (WaitGroup { recv }, WaitGuard { _send: send })
    }

    /// Waits until every associated [`WaitGuard`] has been dropped.
    pub async fn wait(mut self) {
        if let Some(never) = self.recv.recv().await {
            match never {}
        }
    }
}

#[cfg(test)]
mod test {
    use super::WaitGroup;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_wait_for_all_guards() {
        let (waiter, guard) = WaitGroup::new();
        let done = Arc::new(AtomicUsize::new(0));

        for i in 0..8u64 {
            let guard = guard.clone();
            let done = done.clone();
            tokio::spawn(async move {
                let _guard = guard;
                tokio::time::sleep(Duration::from_millis(5 * i)).await;
                done.fetch_add(1, Ordering::SeqCst);
            });
        }
        drop(guard);

        timeout(Duration::from_secs(5), waiter.wait())
            .await
            .expect("wait group did not complete");
        assert_eq!(done.load(Ordering::SeqCst), 8);
    }

    #[tokio::test]
    async fn test_outstanding_guard_blocks_waiter() {
        let (waiter, guard) = WaitGroup::new();
        let _extra = guard.clone();
        drop(guard);

        assert!(timeout(Duration::from_millis(50), waiter.wait())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_panicking_task_releases_guard() {
        let (waiter, guard) = WaitGroup::new();

        let task_guard = guard.clone();
        let handle = tokio::spawn(async move {
            let _guard = task_guard;
            panic!("task failed");
        });
        drop(guard);

        assert!(handle.await.is_err());
        assert!(timeout(Duration::from_secs(1), waiter.wait())
            .await
            .is_ok());
    }
}
