// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process dispatcher on the tokio blocking pool.
//!
//! Scheduling is plain dependency counting: every node starts with the
//! number of predecessors it waits for, sources are queued immediately, and
//! a node is queued when its counter reaches zero. At most
//! `max_concurrency` task bodies run at once.
//!
//! Task contexts produced here carry no cluster client, so a task calling
//! [`TaskContext::call_workflow`] fails with [`DispatchError::NoClient`].

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::engine::node::execute_node;
use crate::engine::TaskContext;
use crate::errors::DispatchError;
use crate::traits::Dispatcher;
use crate::workflow::{ExecutableGraph, Value};

pub struct ThreadedDispatcher {
    max_concurrency: usize,
}

impl ThreadedDispatcher {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }
}

#[async_trait]
impl Dispatcher for ThreadedDispatcher {
    fn name(&self) -> &'static str {
        "threaded"
    }

    async fn run(&self, graph: Arc<ExecutableGraph>, ctx: TaskContext) -> Result<Value, DispatchError> {
        let mut remaining = graph.dependency_counts();
        let mut outputs: Vec<Option<Value>> = vec![None; graph.len()];
        let mut ready: VecDeque<usize> = graph.sources().collect();
        let mut running: JoinSet<(usize, Result<Value, DispatchError>)> = JoinSet::new();

        loop {
            while running.len() < self.max_concurrency {
                let Some(node) = ready.pop_front() else { break };
                let args = graph.collect_args(node, &outputs)?;
                let graph = graph.clone();
                let ctx = ctx.clone();
                running.spawn_blocking(move || (node, execute_node(&graph, node, &ctx, args)));
            }

            // Returning drops the JoinSet: queued bodies never start, running
            // ones finish in the background.
            let Some(joined) = running.join_next().await else {
                return Err(DispatchError::Internal(
                    "no runnable tasks left before the output task finished".into(),
                ));
            };
            let (node, outcome) =
                joined.map_err(|e| DispatchError::Internal(format!("task join failed: {e}")))?;
            let value = outcome?;

            if node == graph.sink() {
                return Ok(value);
            }
            for &succ in graph.node(node).successors() {
                remaining[succ] -= 1;
                if remaining[succ] == 0 {
                    ready.push_back(succ);
                }
            }
            outputs[node] = Some(value);
        }
    }
}
