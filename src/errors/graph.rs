// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::workflow::TaskId;
use thiserror::Error;

/// Structural problems found while building or freezing a workflow.
///
/// Every variant is raised before any task runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// Two tasks in one workflow share a name.
    #[error("Duplicate task name: '{name}'")]
    DuplicateTaskName { name: String },

    /// The same task instance was added to a workflow twice.
    #[error("Task '{task}' ({id}) is already part of the workflow")]
    TaskAlreadyPresent { task: String, id: TaskId },

    /// A predecessor id does not belong to the workflow.
    #[error("Task '{task}' depends on {missing} which is not part of the workflow")]
    UnknownPredecessor { task: String, missing: TaskId },

    /// A workflow with no tasks cannot be executed.
    #[error("Workflow '{workflow}' has no tasks")]
    EmptyWorkflow { workflow: String },

    /// Circular dependency between tasks.
    #[error("Cyclic dependency detected: {}", cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    /// A paired insert needs one predecessor per source task.
    #[error("Workflow '{workflow}' has {sources} source tasks but {predecessors} predecessors were given")]
    PairingMismatch {
        workflow: String,
        sources: usize,
        predecessors: usize,
    },

    /// Execution needs exactly one task with no successors.
    #[error("Workflow must have exactly one output task, found {}: [{}]", outputs.len(), outputs.join(", "))]
    OutputCount { outputs: Vec<String> },
}
