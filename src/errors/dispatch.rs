// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{DatabaseError, GraphError};
use thiserror::Error;

/// Errors surfaced by `execute_workflow` and the dispatchers.
///
/// A failing task aborts the whole run: the first failure observed is
/// returned and no further tasks are started.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The workflow was rejected before execution.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A task body returned an error.
    #[error("Task '{task}' failed: {source}")]
    TaskFailed {
        task: String,
        #[source]
        source: anyhow::Error,
    },

    /// A task body panicked.
    #[error("Task '{task}' panicked: {message}")]
    TaskPanicked { task: String, message: String },

    /// Nested workflow submission from a context that has no cluster behind it.
    #[error("No global client found and no address provided")]
    NoClient,

    /// The scheduler or its workers are gone or could not be started.
    #[error("Distributed backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    /// The default tool database could not be created.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Failed to prepare scratch directory: {0}")]
    ScratchDir(#[source] std::io::Error),

    /// Bookkeeping invariant broken inside a dispatcher.
    #[error("Internal dispatcher error: {0}")]
    Internal(String),
}

impl DispatchError {
    /// Name of the task this error originated from, when there is one.
    pub fn task_name(&self) -> Option<&str> {
        match self {
            DispatchError::TaskFailed { task, .. } | DispatchError::TaskPanicked { task, .. } => {
                Some(task)
            }
            _ => None,
        }
    }
}
