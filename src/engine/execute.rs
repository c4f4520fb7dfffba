// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::database::default_tool_database;
use crate::engine::{default_dispatcher, TaskContext};
use crate::errors::DispatchError;
use crate::observability::messages::engine::{
    ExecutionCompleted, ExecutionFailed, ExecutionStarted, ResultsStoreFailed, ScratchCleanupFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Dispatcher, ToolDatabase};
use crate::workflow::{Value, Workflow};

/// Run `workflow` and return the output of its single output task.
///
/// 1. The workflow is frozen and validated; nothing runs if it is invalid.
/// 2. `dispatcher` defaults to the configured backend, `database` to a new
///    run directory named after the workflow.
/// 3. Tasks run with a fresh scratch directory, removed afterwards.
/// 4. A [`Value::Results`] output without a database reference gets one
///    and is written to the database's `results.json`.
///
/// There is no timeout: a task that never returns blocks the run.
pub async fn execute_workflow(
    workflow: Workflow,
    dispatcher: Option<Arc<dyn Dispatcher>>,
    database: Option<Arc<dyn ToolDatabase>>,
) -> Result<Value, DispatchError> {
    let graph = Arc::new(workflow.freeze()?);
    let name = graph.name().unwrap_or("workflow").to_string();

    let dispatcher = dispatcher.unwrap_or_else(default_dispatcher);
    let database: Arc<dyn ToolDatabase> = match database {
        Some(db) => db,
        None => Arc::new(default_tool_database(&name, None, false)?),
    };

    let scratch = tempfile::Builder::new()
        .prefix("pharmflow-")
        .tempdir()
        .map_err(DispatchError::ScratchDir)?;
    let ctx = TaskContext::new(database.clone(), scratch.path());

    let started = ExecutionStarted {
        workflow: &name,
        dispatcher: dispatcher.name(),
        task_count: graph.len(),
    };
    started.log();
    let span = started.span("execute_workflow");
    let start = Instant::now();

    let outcome = dispatcher.run(graph, ctx).instrument(span).await;

    let scratch_path = scratch.path().to_path_buf();
    if let Err(error) = scratch.close() {
        ScratchCleanupFailed {
            path: &scratch_path,
            error: &error,
        }
        .log();
    }

    match outcome {
        Ok(value) => {
            ExecutionCompleted {
                workflow: &name,
                dispatcher: dispatcher.name(),
                duration: start.elapsed(),
            }
            .log();
            Ok(attach_database(value, database.as_ref()))
        }
        Err(error) => {
            ExecutionFailed {
                workflow: &name,
                dispatcher: dispatcher.name(),
                error: &error,
            }
            .log();
            Err(error)
        }
    }
}

fn attach_database(value: Value, database: &dyn ToolDatabase) -> Value {
    match value {
        Value::Results(mut results) if results.tool_database().is_none() => {
            results.set_tool_database(database.to_ref());
            if let Err(error) = database.store_results(&results) {
                ResultsStoreFailed {
                    path: database.path(),
                    error: &error,
                }
                .log();
            }
            Value::Results(results)
        }
        other => other,
    }
}
