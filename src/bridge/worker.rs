//! Background event-loop runner for UI-style callers.
//!
//! A GUI thread must never block on network I/O. The bridge pins one
//! scheduler to one dedicated worker thread for the application's
//! lifetime; any thread submits futures and receives a handle it may
//! block on or poll, while the submitting thread stays free to service
//! its own event loop.

use crate::{Error, Result};
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

type Job = BoxFuture<'static, ()>;

const DEFAULT_GRACE: Duration = Duration::from_secs(5);

/// Single-assignment result slot for one submitted call.
///
/// Created per submission, consumed once the result is observed. If the
/// bridge shuts down before the future completes, waiting yields
/// [`Error::Canceled`].
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Block the calling thread until the result is available.
    ///
    /// Must not be called from inside a runtime; it is meant for plain
    /// threads such as a GUI main loop's worker callbacks.
    pub fn wait(self) -> Result<T> {
        self.rx.blocking_recv().map_err(|_| Error::Canceled)
    }

    /// Non-blocking poll: `Ok(Some(v))` once finished, `Ok(None)` while
    /// pending, `Err(Canceled)` if the task was dropped.
    pub fn try_wait(&mut self) -> Result<Option<T>> {
        match self.rx.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(oneshot::error::TryRecvError::Empty) => Ok(None),
            Err(oneshot::error::TryRecvError::Closed) => Err(Error::Canceled),
        }
    }
}

/// Long-lived background loop: one worker thread, one scheduler.
///
/// Shutdown closes the submission channel, aborts whatever is still in
/// flight, and bounds the drain by a fixed grace period before the
/// worker exits.
pub struct AsyncBridge {
    tx: Option<mpsc::UnboundedSender<Job>>,
    worker: Option<JoinHandle<()>>,
}

impl AsyncBridge {
    pub fn new() -> Result<Self> {
        Self::with_grace(DEFAULT_GRACE)
    }

    pub fn with_grace(grace: Duration) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();

        let worker = std::thread::Builder::new()
            .name("api-bridge".into())
            .spawn(move || {
                runtime.block_on(async move {
                    let mut tasks = tokio::task::JoinSet::new();
                    loop {
                        tokio::select! {
                            job = rx.recv() => match job {
                                Some(job) => {
                                    tasks.spawn(job);
                                }
                                None => break,
                            },
                            Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
                        }
                    }
                    // Channel closed: cancel in-flight work rather than
                    // waiting for natural completion, bounded by grace.
                    if !tasks.is_empty() {
                        debug!(in_flight = tasks.len(), "bridge shutdown aborting tasks");
                        tasks.abort_all();
                        let drain = async {
                            while tasks.join_next().await.is_some() {}
                        };
                        let _ = tokio::time::timeout(grace, drain).await;
                    }
                });
            })?;

        Ok(Self {
            tx: Some(tx),
            worker: Some(worker),
        })
    }

    /// Schedule a future on the background loop.
    ///
    /// The returned handle resolves with the future's output; if the
    /// bridge is already shut down the handle resolves to
    /// [`Error::Canceled`].
    pub fn submit<F>(&self, future: F) -> TaskHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel();
        let job: Job = async move {
            let output = future.await;
            let _ = done_tx.send(output);
        }
        .boxed();

        if let Some(tx) = &self.tx {
            // A send failure means the worker is gone; the dropped job
            // closes the oneshot and the handle reports Canceled.
            let _ = tx.send(job);
        }
        TaskHandle { rx: done_rx }
    }

    /// Stop accepting work and join the worker.
    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for AsyncBridge {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_and_wait_round_trips() {
        let bridge = AsyncBridge::new().unwrap();
        let handle = bridge.submit(async { 21 * 2 });
        assert_eq!(handle.wait().unwrap(), 42);
        bridge.shutdown();
    }

    #[test]
    fn timers_run_on_the_background_loop() {
        let bridge = AsyncBridge::new().unwrap();
        let handle = bridge.submit(async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            "done"
        });
        assert_eq!(handle.wait().unwrap(), "done");
    }

    #[test]
    fn many_submissions_resolve_independently() {
        let bridge = AsyncBridge::new().unwrap();
        let handles: Vec<_> = (0..10u32).map(|i| bridge.submit(async move { i * i })).collect();
        let results: Vec<u32> = handles.into_iter().map(|h| h.wait().unwrap()).collect();
        assert_eq!(results, (0..10u32).map(|i| i * i).collect::<Vec<_>>());
    }

    #[test]
    fn try_wait_polls_without_blocking() {
        let bridge = AsyncBridge::new().unwrap();
        let mut handle = bridge.submit(async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            7
        });

        let mut seen = None;
        for _ in 0..100 {
            if let Some(v) = handle.try_wait().unwrap() {
                seen = Some(v);
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(seen, Some(7));
    }

    #[test]
    fn shutdown_aborts_in_flight_work() {
        let bridge = AsyncBridge::with_grace(Duration::from_millis(100)).unwrap();
        let pending = bridge.submit(async {
            // Far longer than the grace period; shutdown aborts it.
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        bridge.shutdown();
        assert!(matches!(pending.wait(), Err(Error::Canceled)));
    }
}
