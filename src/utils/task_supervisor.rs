use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use std::collections::HashMap;
use std::time::Duration;
use crate::error::{Error, Result};
use tracing::{info, error, warn};

/// Task Supervisor - Owns the lifecycle of background tasks
///
/// ## Purpose
/// Every long-running task (feed connections, aggregator, display, export)
/// is spawned through the supervisor and observes its shutdown token.
/// Unexpected termination is reported by `check_health`.
///
/// ## Usage
/// ```ignore
/// let mut supervisor = TaskSupervisor::new();
/// let token = supervisor.token();
///
/// supervisor.spawn("aggregator", async move {
///     aggregator.run(rx, token).await;
/// });
///
/// supervisor.shutdown(Duration::from_secs(10)).await;
/// ```
pub struct TaskSupervisor {
    tasks: HashMap<String, JoinHandle<()>>,
    shutdown: CancellationToken,
}

impl TaskSupervisor {
    pub fn new() -> Self {
        TaskSupervisor {
            tasks: HashMap::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Token cancelled when `shutdown` starts.
    pub fn token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Spawn a new background task and register it for monitoring
    pub fn spawn<F>(&mut self, name: impl Into<String>, future: F) -> &mut Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let handle = tokio::spawn(future);

        info!("Spawned background task: {}", name);
        if let Some(previous) = self.tasks.insert(name.clone(), handle) {
            warn!("Replaced running task {}, aborting previous instance", name);
            previous.abort();
        }
        self
    }

    /// Returns error if any task has terminated before shutdown
    pub fn check_health(&mut self) -> Result<()> {
        if self.shutdown.is_cancelled() {
            return Ok(());
        }

        let mut failed_tasks: Vec<String> = self
            .tasks
            .iter()
            .filter(|(_, handle)| handle.is_finished())
            .map(|(name, _)| name.clone())
            .collect();

        if failed_tasks.is_empty() {
            return Ok(());
        }

        failed_tasks.sort();
        for name in &failed_tasks {
            self.tasks.remove(name);
        }

        let error_msg = format!("Tasks terminated unexpectedly: {:?}", failed_tasks);
        error!("{}", error_msg);
        Err(Error::TaskFailure(error_msg))
    }

    /// Get count of active tasks
    pub fn active_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Cancel the shared token and wait for every task to finish.
    /// Tasks still running after `grace` are aborted.
    pub async fn shutdown(&mut self, grace: Duration) {
        info!("Shutting down {} background tasks", self.tasks.len());
        self.shutdown.cancel();

        let deadline = tokio::time::Instant::now() + grace;
        for (name, mut handle) in self.tasks.drain() {
            match tokio::time::timeout_at(deadline, &mut handle).await {
                Ok(Ok(())) => info!("Task {} stopped", name),
                Ok(Err(e)) => error!("Task {} failed: {}", name, e),
                Err(_) => {
                    warn!("Task {} did not stop within {:?}, aborting", name, grace);
                    handle.abort();
                }
            }
        }
    }
}

impl Default for TaskSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn shutdown_waits_for_cooperative_tasks() {
        let mut supervisor = TaskSupervisor::new();
        let token = supervisor.token();
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();

        supervisor.spawn("worker", async move {
            token.cancelled().await;
            let _ = done_tx.send(());
        });
        assert_eq!(supervisor.active_task_count(), 1);
        assert!(supervisor.check_health().is_ok());

        supervisor.shutdown(Duration::from_secs(1)).await;
        assert!(done_rx.await.is_ok());
        assert_eq!(supervisor.active_task_count(), 0);
    }

    #[tokio::test]
    async fn reports_tasks_that_exit_early() {
        let mut supervisor = TaskSupervisor::new();
        supervisor.spawn("short-lived", async {});
        supervisor.spawn("long-lived", std::future::pending::<()>());
        tokio::time::sleep(Duration::from_millis(20)).await;

        let err = supervisor.check_health().unwrap_err();
        assert!(matches!(err, Error::TaskFailure(msg) if msg.contains("short-lived")));
        assert_eq!(supervisor.active_task_count(), 1);

        supervisor.shutdown(Duration::from_millis(10)).await;
    }
}
