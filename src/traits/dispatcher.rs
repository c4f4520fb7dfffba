use async_trait::async_trait;
use std::sync::Arc;

use crate::engine::TaskContext;
use crate::errors::DispatchError;
use crate::workflow::{ExecutableGraph, Value};

/// Runs a frozen workflow to completion.
///
/// Dispatchers are stateless between runs. Each one decides where task
/// bodies execute; the scheduling contract is shared:
///
/// - a task starts only after all of its predecessors finished;
/// - it receives its bound arguments, then predecessor outputs in
///   declaration order;
/// - the first task failure fails the run and no new tasks are started;
/// - the sink's output is returned.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Backend name recorded in run metadata.
    fn name(&self) -> &'static str;

    async fn run(&self, graph: Arc<ExecutableGraph>, ctx: TaskContext) -> Result<Value, DispatchError>;
}
