// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::TaskContext;
use crate::errors::DispatchError;
use crate::observability::messages::task::{TaskCompleted, TaskFailed, TaskStarted};
use crate::observability::messages::StructuredLog;
use crate::workflow::{ExecutableGraph, Value};
use std::time::Instant;

/// Run one node with task-level logging. Shared by every backend.
pub(crate) fn execute_node(
    graph: &ExecutableGraph,
    index: usize,
    ctx: &TaskContext,
    args: Vec<Value>,
) -> Result<Value, DispatchError> {
    let task = graph.node(index).name();
    TaskStarted {
        task,
        argument_count: args.len(),
    }
    .log();

    let start = Instant::now();
    let outcome = graph.invoke(index, ctx, args);
    match &outcome {
        Ok(_) => TaskCompleted {
            task,
            duration: start.elapsed(),
        }
        .log(),
        Err(error) => TaskFailed { task, error }.log(),
    }
    outcome
}
