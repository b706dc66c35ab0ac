use std::future::Future;
use std::sync::Mutex;

use tokio::task::JoinHandle;
use tracing::debug;

/// Runs at most one background task at a time
///
/// Starting a new task aborts the previous one if it is still running,
/// which suits "latest request wins" work such as search-as-you-type.
#[derive(Debug, Default)]
pub struct OneWayTask {
    current: Mutex<Option<JoinHandle<()>>>,
}

impl OneWayTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `future`, aborting whatever this task was running before
    ///
    /// Must be called from within a tokio runtime.
    pub fn run<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = current.take() {
            if !previous.is_finished() {
                debug!("aborting previous one-way task");
                previous.abort();
            }
        }
        *current = Some(tokio::spawn(future));
    }

    /// Abort the running task, if any
    pub fn cancel(&self) {
        if let Some(handle) = self
            .current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}
