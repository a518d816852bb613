use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use crate::client::Checker;
use crate::config::RunConfig;
use crate::error::{ErrorKind, Result};
use crate::gate::AdmissionGate;
use crate::stats::{Report, ResponseStats};
use crate::types::Response;
use crate::waiter::WaitGroup;

/// Runs one load test: `requests` attempts, at most `concurrency` at a time.
///
/// Every request runs in its own task. The dispatching loop takes a permit
/// from the [`AdmissionGate`] before it spawns a task, so submission is
/// throttled as well as execution. Tasks hand their [`Response`] back over a
/// channel and the dispatcher folds them into [`ResponseStats`]; no task
/// writes to shared state.
#[derive(Debug)]
pub struct Dispatcher<C> {
    config: RunConfig,
    checker: Arc<C>,
    gate: AdmissionGate,
}

impl<C: Checker> Dispatcher<C> {
    pub fn new(config: RunConfig, checker: C) -> Self {
        let gate = AdmissionGate::new(config.concurrency());
        Dispatcher {
            config,
            checker: Arc::new(checker),
            gate,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub async fn run(&self) -> Result<Report> {
        self.run_with(|_| ()).await
    }

    /// Run all requests, calling `observer` once per recorded response.
    ///
    /// Returns only after every task has finished, pacing included.
    pub async fn run_with<F>(&self, mut observer: F) -> Result<Report>
    where
        F: FnMut(&Response),
    {
        let requests = self.config.requests();
        let pacing = self.config.pacing();
        info!(
            "Dispatching {} requests to {} (concurrency: {}, pacing: {:?})",
            requests,
            self.config.url(),
            self.config.concurrency(),
            pacing
        );

        let start = Instant::now();
        let (waiter, guard) = WaitGroup::new();
        let (send_resp, mut recv_resp) = mpsc::channel(self.config.concurrency());

        let gate = self.gate.clone();
        let checker = Arc::clone(&self.checker);
        let dispatch = tokio::spawn(async move {
            for request_num in 0..requests {
                let guard = guard.clone();
                let permit = gate.acquire().await?;
                let checker = Arc::clone(&checker);
                let send_resp = send_resp.clone();

                tokio::spawn(async move {
                    let _guard = guard;

                    let status = checker.check(request_num).await;
                    if send_resp
                        .send(Response::new(request_num, status))
                        .await
                        .is_err()
                    {
                        warn!("Request #{}: result dropped", request_num + 1);
                    }
                    drop(send_resp);
                    permit.release();

                    if !pacing.is_zero() {
                        tokio::time::sleep(pacing).await;
                    }
                });
            }
            Ok::<_, ErrorKind>(())
        });

        let mut stats = ResponseStats::new();
        while let Some(response) = recv_resp.recv().await {
            observer(&response);
            stats.add(&response);
        }
        dispatch.await??;
        waiter.wait().await;

        let elapsed = start.elapsed();
        if stats.total() != requests {
            warn!(
                "Only {} of {} requests recorded a result",
                stats.total(),
                requests
            );
        }
        debug!("Run finished after {:?}", elapsed);

        Ok(Report { elapsed, stats })
    }
}
