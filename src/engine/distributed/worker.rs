// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc;

use crate::engine::distributed::scheduler::{RunId, SchedulerMessage, WorkerId};
use crate::engine::distributed::ClusterClient;
use crate::engine::node::execute_node;
use crate::engine::TaskContext;
use crate::workflow::{ExecutableGraph, Value};

/// One task assignment.
pub(crate) struct Job {
    pub run: RunId,
    pub node: usize,
    pub graph: Arc<ExecutableGraph>,
    pub args: Vec<Value>,
    pub ctx: TaskContext,
}

/// Scheduler-side end of a worker thread. Dropping it lets the thread exit
/// once its current job is done.
pub(crate) struct WorkerHandle {
    jobs: mpsc::UnboundedSender<Job>,
}

impl WorkerHandle {
    /// Hand `job` to the worker. Gives the job back if the thread is gone.
    pub(crate) fn assign(&self, job: Job) -> Result<(), Job> {
        self.jobs.send(job).map_err(|e| e.0)
    }
}

pub(crate) fn spawn_worker(
    id: WorkerId,
    scheduler: mpsc::UnboundedSender<SchedulerMessage>,
) -> std::io::Result<WorkerHandle> {
    let (jobs, mut inbox) = mpsc::unbounded_channel::<Job>();
    thread::Builder::new()
        .name(format!("pharmflow-worker-{id}"))
        .spawn(move || {
            while let Some(job) = inbox.blocking_recv() {
                let Job { run, node, graph, args, ctx } = job;
                let ctx = ctx.with_client(ClusterClient::for_worker(scheduler.clone(), id));
                let outcome = execute_node(&graph, node, &ctx, args);
                let done = SchedulerMessage::Completed {
                    worker: id,
                    run,
                    node,
                    outcome,
                };
                if scheduler.send(done).is_err() {
                    break;
                }
            }
        })?;
    Ok(WorkerHandle { jobs })
}
