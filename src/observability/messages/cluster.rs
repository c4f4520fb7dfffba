// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the local cluster scheduler.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Scheduler thread is up with its initial workers.
///
/// # Log Level
/// `info!`
pub struct ClusterStarted {
    pub workers: usize,
}

impl Display for ClusterStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Local cluster started with {} workers", self.workers)
    }
}

impl StructuredLog for ClusterStarted {
    fn log(&self) {
        tracing::info!(workers = self.workers, "{}", self);
    }
}

/// A worker thread was added, either at startup or to stand in for a
/// worker waiting on a nested submission.
///
/// # Log Level
/// `debug!`
pub struct WorkerSpawned<'a> {
    pub worker: u64,
    pub reason: &'a str,
}

impl Display for WorkerSpawned<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker {} spawned ({})", self.worker, self.reason)
    }
}

impl StructuredLog for WorkerSpawned<'_> {
    fn log(&self) {
        tracing::debug!(worker = self.worker, reason = self.reason, "{}", self);
    }
}

/// # Log Level
/// `debug!`
pub struct WorkerRetired {
    pub worker: u64,
    pub live_workers: usize,
}

impl Display for WorkerRetired {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker {} retired, {} remain", self.worker, self.live_workers)
    }
}

impl StructuredLog for WorkerRetired {
    fn log(&self) {
        tracing::debug!(worker = self.worker, live_workers = self.live_workers, "{}", self);
    }
}

/// # Log Level
/// `error!` - The cluster keeps running with the workers it has
pub struct WorkerSpawnFailed<'a> {
    pub error: &'a std::io::Error,
}

impl Display for WorkerSpawnFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to spawn worker thread: {}", self.error)
    }
}

impl StructuredLog for WorkerSpawnFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }
}

/// # Log Level
/// `debug!`
pub struct NestedSubmission<'a> {
    pub workflow: &'a str,
    pub worker: Option<u64>,
}

impl Display for NestedSubmission<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.worker {
            Some(worker) => write!(f, "Worker {} submitted nested workflow '{}'", worker, self.workflow),
            None => write!(f, "Nested workflow '{}' submitted", self.workflow),
        }
    }
}

impl StructuredLog for NestedSubmission<'_> {
    fn log(&self) {
        tracing::debug!(workflow = self.workflow, worker = ?self.worker, "{}", self);
    }
}

/// # Log Level
/// `info!`
pub struct ClusterStopped {
    pub abandoned_runs: usize,
}

impl Display for ClusterStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Local cluster stopped, {} runs abandoned", self.abandoned_runs)
    }
}

impl StructuredLog for ClusterStopped {
    fn log(&self) {
        tracing::info!(abandoned_runs = self.abandoned_runs, "{}", self);
    }
}
