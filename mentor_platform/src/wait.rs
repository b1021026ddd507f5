//! Bounded wait on a unit of work running on its own task.
//!
//! The worker writes its result exactly once into a oneshot channel. The
//! single waiter re-checks at a fixed poll interval, emits a progress tick
//! for every interval that passes without a result, and gives up once the
//! maximum wait has elapsed since dispatch. Giving up does not cancel the
//! worker: it is detached and whatever it produces later is dropped.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::settings::SessionConfig;

/// How a waited-on unit of work ended, as read from its [`WaitOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPhase {
    Completed,
    Failed,
    TimedOut,
}

/// What the waiter observed.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitOutcome<T> {
    Completed(T),
    Failed(String),
    TimedOut { waited: Duration },
}

impl<T> WaitOutcome<T> {
    pub fn phase(&self) -> TaskPhase {
        match self {
            WaitOutcome::Completed(_) => TaskPhase::Completed,
            WaitOutcome::Failed(_) => TaskPhase::Failed,
            WaitOutcome::TimedOut { .. } => TaskPhase::TimedOut,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> WaitOutcome<U> {
        match self {
            WaitOutcome::Completed(value) => WaitOutcome::Completed(f(value)),
            WaitOutcome::Failed(message) => WaitOutcome::Failed(message),
            WaitOutcome::TimedOut { waited } => WaitOutcome::TimedOut { waited },
        }
    }
}

/// Timing policy for a bounded wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedWait {
    pub max_wait: Duration,
    pub poll_interval: Duration,
}

impl Default for BoundedWait {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(120),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl BoundedWait {
    pub fn new(max_wait: Duration, poll_interval: Duration) -> Self {
        Self {
            max_wait,
            poll_interval: poll_interval.max(Duration::from_millis(1)),
        }
    }

    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(
            Duration::from_secs(config.max_wait_seconds),
            Duration::from_millis(config.poll_interval_ms),
        )
    }

    /// Dispatch `work` and wait for it under this policy.
    pub async fn run<T, F, P>(&self, work: F, progress: P) -> WaitOutcome<T>
    where
        T: Send + 'static,
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
        P: FnMut(Duration),
    {
        AsyncTask::spawn(work).wait(self, progress).await
    }

    /// Dispatch blocking `work` on the blocking pool and wait for it.
    pub async fn run_blocking<T, F, P>(&self, work: F, progress: P) -> WaitOutcome<T>
    where
        T: Send + 'static,
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
        P: FnMut(Duration),
    {
        AsyncTask::spawn_blocking(work).wait(self, progress).await
    }
}

/// One dispatched unit of work and the receiving half of its result slot.
///
/// Waiting consumes the task, so a task has at most one waiter.
pub struct AsyncTask<T> {
    result: oneshot::Receiver<Result<T, String>>,
    worker: JoinHandle<()>,
    started_at: Instant,
}

impl<T: Send + 'static> AsyncTask<T> {
    /// Dispatch `work` onto the runtime. Must be called from within a tokio runtime.
    pub fn spawn<F>(work: F) -> Self
    where
        F: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let worker = tokio::spawn(async move {
            let outcome = work.await.map_err(|e| format!("{e:#}"));
            if tx.send(outcome).is_err() {
                debug!("Waiter gone, discarding late result");
            }
        });
        Self::running(rx, worker)
    }

    /// Dispatch blocking `work` onto the blocking pool.
    pub fn spawn_blocking<F>(work: F) -> Self
    where
        F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let worker = tokio::task::spawn_blocking(move || {
            let outcome = work().map_err(|e| format!("{e:#}"));
            if tx.send(outcome).is_err() {
                debug!("Waiter gone, discarding late result");
            }
        });
        Self::running(rx, worker)
    }

    fn running(result: oneshot::Receiver<Result<T, String>>, worker: JoinHandle<()>) -> Self {
        Self {
            result,
            worker,
            started_at: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Wait for the worker, calling `progress` with the elapsed time after
    /// every poll interval that passes without a result.
    pub async fn wait<P>(mut self, policy: &BoundedWait, mut progress: P) -> WaitOutcome<T>
    where
        P: FnMut(Duration),
    {
        let deadline = self.started_at + policy.max_wait;

        loop {
            let now = Instant::now();
            if now >= deadline {
                let waited = now - self.started_at;
                warn!(
                    "Gave up waiting after {:?}; worker left running in the background",
                    waited
                );
                // Dropping the handle detaches the worker without aborting it.
                drop(self.worker);
                return WaitOutcome::TimedOut { waited };
            }

            let slice = policy.poll_interval.min(deadline - now);
            match tokio::time::timeout(slice, &mut self.result).await {
                Ok(Ok(Ok(value))) => {
                    return WaitOutcome::Completed(value);
                }
                Ok(Ok(Err(message))) => {
                    error!("Worker failed: {}", message);
                    return WaitOutcome::Failed(message);
                }
                Ok(Err(_)) => {
                    let message = match self.worker.await {
                        Err(join_error) if join_error.is_panic() => {
                            "worker panicked before reporting a result".to_string()
                        }
                        _ => "worker stopped without reporting a result".to_string(),
                    };
                    error!("{}", message);
                    return WaitOutcome::Failed(message);
                }
                Err(_) => {
                    let elapsed = self.started_at.elapsed();
                    debug!("Still waiting on worker ({}s)", elapsed.as_secs());
                    progress(elapsed);
                }
            }
        }
    }
}
