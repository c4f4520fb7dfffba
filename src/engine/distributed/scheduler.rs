// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::thread;
use tokio::sync::{mpsc, oneshot};

use crate::engine::distributed::worker::{spawn_worker, Job, WorkerHandle};
use crate::engine::TaskContext;
use crate::errors::DispatchError;
use crate::observability::messages::cluster::{ClusterStopped, WorkerRetired, WorkerSpawnFailed, WorkerSpawned};
use crate::observability::messages::StructuredLog;
use crate::workflow::{ExecutableGraph, Value};

pub(crate) type WorkerId = u64;
pub(crate) type RunId = u64;
pub(crate) type RunReply = Result<Value, DispatchError>;

pub(crate) enum SchedulerMessage {
    Submit {
        graph: Arc<ExecutableGraph>,
        ctx: TaskContext,
        reply: oneshot::Sender<RunReply>,
    },
    Completed {
        worker: WorkerId,
        run: RunId,
        node: usize,
        outcome: Result<Value, DispatchError>,
    },
    /// The worker is about to wait on a nested run.
    WorkerBlocked { worker: WorkerId },
    /// The nested run finished; the worker continues once `permit` fires.
    WorkerResumed {
        worker: WorkerId,
        permit: oneshot::Sender<()>,
    },
    Shutdown,
}

struct RunState {
    graph: Arc<ExecutableGraph>,
    ctx: TaskContext,
    remaining: Vec<usize>,
    outputs: Vec<Option<Value>>,
    reply: oneshot::Sender<RunReply>,
}

/// Scheduler service state. Lives on the scheduler thread only.
pub(crate) struct Scheduler {
    inbox: mpsc::UnboundedReceiver<SchedulerMessage>,
    outbox: mpsc::UnboundedSender<SchedulerMessage>,
    target: usize,
    workers: HashMap<WorkerId, WorkerHandle>,
    idle: VecDeque<WorkerId>,
    blocked: HashSet<WorkerId>,
    resuming: VecDeque<(WorkerId, oneshot::Sender<()>)>,
    runs: HashMap<RunId, RunState>,
    ready: VecDeque<(RunId, usize)>,
    next_worker: WorkerId,
    next_run: RunId,
}

impl Scheduler {
    /// Spawn `target` workers and the scheduler thread. Returns the
    /// scheduler's inbox.
    pub(crate) fn start(target: usize) -> Result<mpsc::UnboundedSender<SchedulerMessage>, DispatchError> {
        let (outbox, inbox) = mpsc::unbounded_channel();
        let mut scheduler = Scheduler {
            inbox,
            outbox: outbox.clone(),
            target,
            workers: HashMap::new(),
            idle: VecDeque::new(),
            blocked: HashSet::new(),
            resuming: VecDeque::new(),
            runs: HashMap::new(),
            ready: VecDeque::new(),
            next_worker: 0,
            next_run: 0,
        };

        for _ in 0..target {
            scheduler.spawn_worker("startup").map_err(|e| unavailable(format!("cannot start worker: {e}")))?;
        }

        thread::Builder::new()
            .name("pharmflow-scheduler".into())
            .spawn(move || scheduler.run())
            .map_err(|e| unavailable(format!("cannot start scheduler: {e}")))?;
        Ok(outbox)
    }

    fn run(mut self) {
        while let Some(message) = self.inbox.blocking_recv() {
            match message {
                SchedulerMessage::Submit { graph, ctx, reply } => self.submit(graph, ctx, reply),
                SchedulerMessage::Completed {
                    worker,
                    run,
                    node,
                    outcome,
                } => {
                    self.idle.push_back(worker);
                    self.complete(run, node, outcome);
                }
                SchedulerMessage::WorkerBlocked { worker } => {
                    self.blocked.insert(worker);
                    if self.live() < self.target {
                        if let Err(error) = self.spawn_worker("replacing blocked worker") {
                            WorkerSpawnFailed { error: &error }.log();
                        }
                    }
                }
                SchedulerMessage::WorkerResumed { worker, permit } => {
                    self.resuming.push_back((worker, permit));
                }
                SchedulerMessage::Shutdown => break,
            }
            self.grant_resumes();
            self.dispatch();
        }
        ClusterStopped {
            abandoned_runs: self.runs.len(),
        }
        .log();
    }

    /// Workers not waiting on a nested run.
    fn live(&self) -> usize {
        self.workers.len().saturating_sub(self.blocked.len())
    }

    fn spawn_worker(&mut self, reason: &str) -> std::io::Result<()> {
        let id = self.next_worker;
        self.next_worker += 1;
        let handle = spawn_worker(id, self.outbox.clone())?;
        self.workers.insert(id, handle);
        self.idle.push_back(id);
        WorkerSpawned { worker: id, reason }.log();
        Ok(())
    }

    fn retire(&mut self, worker: WorkerId) {
        self.workers.remove(&worker);
        self.idle.retain(|&w| w != worker);
        WorkerRetired {
            worker,
            live_workers: self.live(),
        }
        .log();
    }

    /// Let resumed workers continue, retiring idle workers to keep the live
    /// count at the target. A resume waits while every slot is busy.
    fn grant_resumes(&mut self) {
        while !self.resuming.is_empty() {
            if self.live() >= self.target {
                match self.idle.pop_back() {
                    Some(spare) => self.retire(spare),
                    None => break,
                }
            }
            if let Some((worker, permit)) = self.resuming.pop_front() {
                self.blocked.remove(&worker);
                let _ = permit.send(());
            }
        }
    }

    fn submit(&mut self, graph: Arc<ExecutableGraph>, ctx: TaskContext, reply: oneshot::Sender<RunReply>) {
        let run = self.next_run;
        self.next_run += 1;
        self.ready.extend(graph.sources().map(|node| (run, node)));
        self.runs.insert(
            run,
            RunState {
                remaining: graph.dependency_counts(),
                outputs: vec![None; graph.len()],
                graph,
                ctx,
                reply,
            },
        );
    }

    fn complete(&mut self, run: RunId, node: usize, outcome: Result<Value, DispatchError>) {
        let value = match outcome {
            Ok(value) => value,
            Err(error) => return self.fail(run, error),
        };
        // Missing means the run already failed; late results are dropped.
        let Some(state) = self.runs.get_mut(&run) else { return };

        if node == state.graph.sink() {
            if let Some(state) = self.runs.remove(&run) {
                let _ = state.reply.send(Ok(value));
            }
            return;
        }

        let graph = state.graph.clone();
        for &succ in graph.node(node).successors() {
            state.remaining[succ] -= 1;
            if state.remaining[succ] == 0 {
                self.ready.push_back((run, succ));
            }
        }
        state.outputs[node] = Some(value);
    }

    fn fail(&mut self, run: RunId, error: DispatchError) {
        if let Some(state) = self.runs.remove(&run) {
            let _ = state.reply.send(Err(error));
        }
    }

    fn dispatch(&mut self) {
        while !self.ready.is_empty() {
            let Some(worker) = self.idle.pop_front() else { break };
            let Some((run, node)) = self.ready.pop_front() else {
                self.idle.push_front(worker);
                break;
            };
            let Some(state) = self.runs.get(&run) else {
                self.idle.push_front(worker);
                continue;
            };

            let job = match state.graph.collect_args(node, &state.outputs) {
                Ok(args) => Job {
                    run,
                    node,
                    graph: state.graph.clone(),
                    args,
                    ctx: state.ctx.clone(),
                },
                Err(error) => {
                    self.idle.push_front(worker);
                    self.fail(run, error);
                    continue;
                }
            };

            let assigned = match self.workers.get(&worker) {
                Some(handle) => handle.assign(job).is_ok(),
                None => false,
            };
            if !assigned {
                self.workers.remove(&worker);
                self.fail(run, unavailable(format!("worker {worker} exited")));
            }
        }
    }
}

fn unavailable(reason: String) -> DispatchError {
    DispatchError::BackendUnavailable { reason }
}
