// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Local cluster backend.
//!
//! A [`LocalCluster`] is a scheduler service running on its own thread plus
//! a pool of worker threads. Everything talks to the scheduler through one
//! message channel:
//!
//! ```text
//!   dispatcher ──Submit──▶ scheduler ──Job──▶ worker
//!                             ▲                 │
//!                             └──Completed──────┘
//! ```
//!
//! The scheduler owns all run state (dependency counters, finished outputs,
//! which worker holds which task), so there is no shared mutable state
//! between threads.
//!
//! A task body may submit a nested workflow through its context and wait
//! for it. The waiting worker reports itself blocked and the scheduler
//! starts a replacement, so nested tasks always have a worker even when
//! every original worker is waiting. When the blocked worker resumes it
//! first obtains a slot (an idle worker is retired to make room), keeping
//! the number of live workers at the configured count.

mod client;
mod cluster;
mod scheduler;
mod worker;

pub(crate) use client::ClusterClient;
pub use cluster::LocalCluster;

use async_trait::async_trait;
use std::sync::Arc;

use crate::engine::TaskContext;
use crate::errors::DispatchError;
use crate::traits::Dispatcher;
use crate::workflow::{ExecutableGraph, Value};

enum ClusterSource {
    /// Start a cluster for each run and stop it afterwards.
    PerRun { workers: usize },
    /// Submit to a cluster owned by the caller.
    Shared(LocalCluster),
}

pub struct DistributedDispatcher {
    cluster: ClusterSource,
}

impl DistributedDispatcher {
    pub fn new(workers: usize) -> Self {
        Self {
            cluster: ClusterSource::PerRun {
                workers: workers.max(1),
            },
        }
    }

    pub fn connect(cluster: LocalCluster) -> Self {
        Self {
            cluster: ClusterSource::Shared(cluster),
        }
    }
}

#[async_trait]
impl Dispatcher for DistributedDispatcher {
    fn name(&self) -> &'static str {
        "distributed"
    }

    async fn run(&self, graph: Arc<ExecutableGraph>, ctx: TaskContext) -> Result<Value, DispatchError> {
        match &self.cluster {
            ClusterSource::PerRun { workers } => {
                let cluster = LocalCluster::start(*workers)?;
                let result = cluster.client().submit(graph, ctx).await;
                cluster.shutdown();
                result
            }
            ClusterSource::Shared(cluster) => cluster.client().submit(graph, ctx).await,
        }
    }
}
