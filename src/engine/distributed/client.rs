// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::engine::distributed::scheduler::{RunReply, SchedulerMessage, WorkerId};
use crate::engine::TaskContext;
use crate::errors::DispatchError;
use crate::workflow::{ExecutableGraph, Value};

/// Submission handle on a running scheduler.
///
/// Clients created for a worker know the worker's id, so a blocking nested
/// submission can tell the scheduler which worker is about to wait.
#[derive(Clone)]
pub(crate) struct ClusterClient {
    scheduler: mpsc::UnboundedSender<SchedulerMessage>,
    worker: Option<WorkerId>,
}

impl ClusterClient {
    pub(crate) fn new(scheduler: mpsc::UnboundedSender<SchedulerMessage>) -> Self {
        Self {
            scheduler,
            worker: None,
        }
    }

    pub(crate) fn for_worker(scheduler: mpsc::UnboundedSender<SchedulerMessage>, worker: WorkerId) -> Self {
        Self {
            scheduler,
            worker: Some(worker),
        }
    }

    pub(crate) fn worker(&self) -> Option<WorkerId> {
        self.worker
    }

    pub(crate) async fn submit(&self, graph: Arc<ExecutableGraph>, ctx: TaskContext) -> Result<Value, DispatchError> {
        let reply = self.send_submit(graph, ctx)?;
        reply.await.map_err(|_| scheduler_gone())?
    }

    /// Submit and park the calling thread until the run finishes.
    ///
    /// Must not be called from inside an async runtime.
    pub(crate) fn submit_blocking(&self, graph: Arc<ExecutableGraph>, ctx: TaskContext) -> Result<Value, DispatchError> {
        if let Some(worker) = self.worker {
            self.send(SchedulerMessage::WorkerBlocked { worker })?;
        }

        let outcome = match self.send_submit(graph, ctx) {
            Ok(reply) => reply.blocking_recv().map_err(|_| scheduler_gone()).and_then(|r| r),
            Err(e) => Err(e),
        };

        if let Some(worker) = self.worker {
            let (permit, granted) = oneshot::channel();
            if self.send(SchedulerMessage::WorkerResumed { worker, permit }).is_ok() {
                // An Err here means the scheduler stopped; the worker just
                // carries on with its task.
                let _ = granted.blocking_recv();
            }
        }
        outcome
    }

    fn send_submit(&self, graph: Arc<ExecutableGraph>, ctx: TaskContext) -> Result<oneshot::Receiver<RunReply>, DispatchError> {
        let (reply, receiver) = oneshot::channel();
        self.send(SchedulerMessage::Submit { graph, ctx, reply })?;
        Ok(receiver)
    }

    fn send(&self, message: SchedulerMessage) -> Result<(), DispatchError> {
        self.scheduler.send(message).map_err(|_| scheduler_gone())
    }
}

fn scheduler_gone() -> DispatchError {
    DispatchError::BackendUnavailable {
        reason: "local cluster scheduler has stopped".into(),
    }
}
