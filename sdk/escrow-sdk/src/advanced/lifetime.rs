use crate::error::{EscrowSdkError, Result};
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Shutdown signal and background tasks belonging to one activation.
///
/// Wallet and contract calls wrapped in [`Lifetime::guard`] resolve to
/// [`EscrowSdkError::Cancelled`] once [`Lifetime::shutdown`] runs, and
/// spawned tasks are aborted.
pub struct Lifetime {
    shutdown: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Lifetime {
    pub fn new() -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            shutdown,
            tasks: Mutex::new(Vec::new()),
        }
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Run `fut` unless shutdown happens first.
    pub async fn guard<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let mut signal = self.shutdown.subscribe();
        if *signal.borrow_and_update() {
            return Err(EscrowSdkError::Cancelled);
        }

        tokio::select! {
            res = fut => res,
            _ = async {
                let _ = signal.wait_for(|stopped| *stopped).await;
            } => Err(EscrowSdkError::Cancelled),
        }
    }

    /// Spawn a task that is aborted on shutdown. Does nothing after shutdown.
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_shut_down() {
            return;
        }
        let handle = tokio::spawn(fut);
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|t| !t.is_finished());
        tasks.push(handle);
    }

    /// Number of spawned tasks still running
    pub fn active_tasks(&self) -> usize {
        let tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        tasks.iter().filter(|t| !t.is_finished()).count()
    }

    pub fn shutdown(&self) {
        if self.shutdown.send_replace(true) {
            return;
        }
        let tasks = std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
        debug!(tasks = tasks.len(), "aborting background tasks");
        for task in tasks {
            task.abort();
        }
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Lifetime {
    fn drop(&mut self) {
        self.shutdown();
    }
}
