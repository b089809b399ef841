pub mod coordinator;

pub use coordinator::DispatchCoordinator;

use std::collections::BTreeMap;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::capture::CaptureEvent;
use crate::error::{ClipwiseError, Result};

/// Where the coordinator is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Idle,
    Building,
    AwaitingReply,
    UpdatingOutputs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchStatus {
    pub state: DispatchState,
    /// Cycles that have run all the way back to `Idle`.
    pub completed: u64,
}

/// A manual submission from the UI.
///
/// When `params` has no `content`, the most recent captured text is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub template: String,
    pub params: BTreeMap<String, String>,
}

/// Unit of work for the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchJob {
    Capture(CaptureEvent),
    Submit(Submission),
}

/// Handle to a running dispatch worker.
///
/// Jobs are queued FIFO and run one at a time; a job submitted while another
/// is in flight waits its turn rather than being rejected.
pub struct Dispatcher {
    jobs: mpsc::Sender<DispatchJob>,
    status: watch::Receiver<DispatchStatus>,
    worker: JoinHandle<()>,
}

impl Dispatcher {
    /// Start the worker on the current tokio runtime.
    pub fn spawn(mut coordinator: DispatchCoordinator, queue_capacity: usize) -> Self {
        let (jobs, mut rx) = mpsc::channel(queue_capacity.max(1));
        let status = coordinator.status();
        let worker = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                coordinator.dispatch(job).await;
            }
            tracing::debug!("dispatch queue closed, worker exiting");
        });
        Self {
            jobs,
            status,
            worker,
        }
    }

    /// A sender for producers outside the runtime, such as the capture thread.
    pub fn sender(&self) -> mpsc::Sender<DispatchJob> {
        self.jobs.clone()
    }

    pub fn status(&self) -> watch::Receiver<DispatchStatus> {
        self.status.clone()
    }

    /// Queue a job, waiting for room if the queue is full.
    pub async fn submit(&self, job: DispatchJob) -> Result<()> {
        self.jobs
            .send(job)
            .await
            .map_err(|_| ClipwiseError::DispatcherStopped)
    }

    /// Wait until `count` cycles have completed in total.
    pub async fn wait_completed(&self, count: u64) -> Result<()> {
        let mut status = self.status.clone();
        status
            .wait_for(|s| s.completed >= count)
            .await
            .map(|_| ())
            .map_err(|_| ClipwiseError::DispatcherStopped)
    }

    /// Stop accepting jobs and wait for queued ones to finish. Other senders
    /// handed out by `sender()` must be dropped for this to return.
    pub async fn shutdown(self) {
        drop(self.jobs);
        if let Err(e) = self.worker.await {
            tracing::warn!("dispatch worker ended abnormally: {}", e);
        }
    }

    /// Stop immediately, abandoning queued jobs.
    pub fn abort(self) {
        self.worker.abort();
    }
}
