use crate::ProcessController;

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Last observed state of the foreign application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppStatus {
    /// No poll has completed yet
    Unknown,
    Running { pids: Vec<u32> },
    Stopped,
}

impl AppStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, AppStatus::Running { .. })
    }
}

/// Background poller publishing [`AppStatus`] changes.
///
/// Polling only reads the process table and never blocks switch operations.
pub struct StatusMonitor {
    status_rx: watch::Receiver<AppStatus>,
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl StatusMonitor {
    pub fn spawn(controller: Arc<ProcessController>, interval: Duration) -> Self {
        let (status_tx, status_rx) = watch::channel(AppStatus::Unknown);
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            loop {
                let pids: Vec<u32> = controller.scan().await.iter().map(|p| p.pid).collect();
                let status = if pids.is_empty() {
                    AppStatus::Stopped
                } else {
                    AppStatus::Running { pids }
                };

                status_tx.send_if_modified(|current| {
                    if *current == status {
                        return false;
                    }
                    info!("Application status: {status:?}");
                    *current = status;
                    true
                });

                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = shutdown_rx.changed() => break,
                }
            }
            debug!("Status monitor stopped");
        });

        Self {
            status_rx,
            shutdown_tx,
            handle: Some(handle),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<AppStatus> {
        self.status_rx.clone()
    }

    pub fn current(&self) -> AppStatus {
        self.status_rx.borrow().clone()
    }

    /// Stops polling and waits for the task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for StatusMonitor {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
