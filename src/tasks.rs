//! Background task runner
//!
//! Work runs on the tokio worker pool (or the blocking pool); its outcome is
//! wrapped into a completion message and sent back to the interactive loop,
//! which is the only place state is mutated.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};

use crate::error::TaskError;

/// Outcome of a background task as seen by the interactive loop.
pub type TaskResult<T> = Result<T, TaskError>;

#[derive(Debug)]
pub struct TaskRunner<M> {
    completions: mpsc::UnboundedSender<M>,
}

impl<M> Clone for TaskRunner<M> {
    fn clone(&self) -> Self {
        Self {
            completions: self.completions.clone(),
        }
    }
}

impl<M: Send + 'static> TaskRunner<M> {
    /// Create a runner together with the receiving end drained by the interactive loop.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<M>) {
        let (completions, rx) = mpsc::unbounded_channel();
        (Self { completions }, rx)
    }

    /// Run an async unit of work on the worker pool.
    pub fn run<T, Fut, D>(&self, name: &'static str, work: Fut, deliver: D)
    where
        T: Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        D: FnOnce(TaskResult<T>) -> M + Send + 'static,
    {
        tracing::trace!(task = name, "Spawning background task");
        self.forward(name, tokio::spawn(work), deliver);
    }

    /// Run a blocking closure on the blocking pool.
    pub fn run_blocking<T, F, D>(&self, name: &'static str, work: F, deliver: D)
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
        D: FnOnce(TaskResult<T>) -> M + Send + 'static,
    {
        tracing::trace!(task = name, "Spawning blocking task");
        self.forward(name, tokio::task::spawn_blocking(work), deliver);
    }

    fn forward<T, D>(&self, name: &'static str, handle: JoinHandle<T>, deliver: D)
    where
        T: Send + 'static,
        D: FnOnce(TaskResult<T>) -> M + Send + 'static,
    {
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let outcome = handle.await.map_err(|e| join_failure(name, e));
            if let Err(ref e) = outcome {
                tracing::error!(task = name, error = %e, "Background task did not complete");
            }
            if completions.send(deliver(outcome)).is_err() {
                tracing::debug!(task = name, "Interactive loop gone, dropping task completion");
            }
        });
    }
}

fn join_failure(name: &'static str, error: JoinError) -> TaskError {
    if error.is_panic() {
        TaskError::Panicked { name }
    } else {
        TaskError::Cancelled { name }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    enum Done {
        Number(TaskResult<u32>),
        Text(TaskResult<String>),
    }

    #[tokio::test]
    async fn async_work_is_delivered() {
        let (runner, mut rx) = TaskRunner::new();
        runner.run("double", async { 21 * 2 }, Done::Number);

        assert_eq!(rx.recv().await, Some(Done::Number(Ok(42))));
    }

    #[tokio::test]
    async fn blocking_work_is_delivered() {
        let (runner, mut rx) = TaskRunner::new();
        runner.run_blocking("greet", || "hello".to_string(), Done::Text);

        assert_eq!(rx.recv().await, Some(Done::Text(Ok("hello".to_string()))));
    }

    #[tokio::test]
    async fn panicking_work_is_delivered_as_failure() {
        let (runner, mut rx) = TaskRunner::new();
        runner.run_blocking("explode", || -> u32 { panic!("boom") }, Done::Number);

        assert_eq!(
            rx.recv().await,
            Some(Done::Number(Err(TaskError::Panicked { name: "explode" })))
        );
    }

    #[tokio::test]
    async fn results_arrive_in_completion_order() {
        let (runner, mut rx) = TaskRunner::new();
        runner.run(
            "slow",
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                1
            },
            Done::Number,
        );
        runner.run("fast", async { 2 }, Done::Number);

        assert_eq!(rx.recv().await, Some(Done::Number(Ok(2))));
        assert_eq!(rx.recv().await, Some(Done::Number(Ok(1))));
    }
}
