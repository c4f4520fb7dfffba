// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::engine::distributed::scheduler::{Scheduler, SchedulerMessage};
use crate::engine::distributed::ClusterClient;
use crate::errors::DispatchError;
use crate::observability::messages::cluster::ClusterStarted;
use crate::observability::messages::StructuredLog;

/// Handle on a running local cluster. Clones share the cluster; it stops
/// when [`LocalCluster::shutdown`] is called or the last handle is dropped.
#[derive(Clone)]
pub struct LocalCluster {
    inner: Arc<ClusterInner>,
}

struct ClusterInner {
    scheduler: mpsc::UnboundedSender<SchedulerMessage>,
    workers: usize,
}

impl LocalCluster {
    /// Start a scheduler with `workers` worker threads.
    pub fn start(workers: usize) -> Result<Self, DispatchError> {
        let workers = workers.max(1);
        let scheduler = Scheduler::start(workers)?;
        ClusterStarted { workers }.log();
        Ok(Self {
            inner: Arc::new(ClusterInner { scheduler, workers }),
        })
    }

    /// Configured number of live workers.
    pub fn workers(&self) -> usize {
        self.inner.workers
    }

    pub(crate) fn client(&self) -> ClusterClient {
        ClusterClient::new(self.inner.scheduler.clone())
    }

    /// Stop the scheduler. Runs still in flight fail with
    /// [`DispatchError::BackendUnavailable`]; worker threads exit after
    /// their current task.
    pub fn shutdown(&self) {
        let _ = self.inner.scheduler.send(SchedulerMessage::Shutdown);
    }
}

impl Drop for ClusterInner {
    fn drop(&mut self) {
        let _ = self.scheduler.send(SchedulerMessage::Shutdown);
    }
}

impl std::fmt::Debug for LocalCluster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCluster")
            .field("workers", &self.inner.workers)
            .finish()
    }
}
