// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for workflow execution lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;
use tracing::Span;

/// Workflow execution started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use pharmflow::observability::messages::engine::ExecutionStarted;
///
/// let msg = ExecutionStarted {
///     workflow: "modelfit",
///     dispatcher: "threaded",
///     task_count: 3,
/// };
///
/// assert_eq!(
///     msg.to_string(),
///     "Executing workflow 'modelfit' on threaded dispatcher: 3 tasks"
/// );
/// ```
pub struct ExecutionStarted<'a> {
    pub workflow: &'a str,
    pub dispatcher: &'a str,
    pub task_count: usize,
}

impl Display for ExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Executing workflow '{}' on {} dispatcher: {} tasks",
            self.workflow, self.dispatcher, self.task_count
        )
    }
}

impl StructuredLog for ExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            dispatcher = self.dispatcher,
            task_count = self.task_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "execution",
            span_name = name,
            workflow = self.workflow,
            dispatcher = self.dispatcher,
            task_count = self.task_count,
        )
    }
}

/// Workflow execution completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ExecutionCompleted<'a> {
    pub workflow: &'a str,
    pub dispatcher: &'a str,
    pub duration: Duration,
}

impl Display for ExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Workflow '{}' completed on {} dispatcher in {:?}",
            self.workflow, self.dispatcher, self.duration
        )
    }
}

impl StructuredLog for ExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            workflow = self.workflow,
            dispatcher = self.dispatcher,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Workflow execution failed.
///
/// # Log Level
/// `error!` - The run produced no result
pub struct ExecutionFailed<'a> {
    pub workflow: &'a str,
    pub dispatcher: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Workflow '{}' failed on {} dispatcher: {}",
            self.workflow, self.dispatcher, self.error
        )
    }
}

impl StructuredLog for ExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(
            workflow = self.workflow,
            dispatcher = self.dispatcher,
            error = %self.error,
            "{}", self
        );
    }
}

/// Final results could not be written to the tool database.
///
/// # Log Level
/// `warn!` - The run still returns its value
pub struct ResultsStoreFailed<'a> {
    pub path: &'a Path,
    pub error: &'a dyn std::error::Error,
}

impl Display for ResultsStoreFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Could not store results in {}: {}", self.path.display(), self.error)
    }
}

impl StructuredLog for ResultsStoreFailed<'_> {
    fn log(&self) {
        tracing::warn!(path = %self.path.display(), error = %self.error, "{}", self);
    }
}

pub struct ScratchCleanupFailed<'a> {
    pub path: &'a Path,
    pub error: &'a std::io::Error,
}

impl Display for ScratchCleanupFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Could not remove scratch directory {}: {}", self.path.display(), self.error)
    }
}

impl StructuredLog for ScratchCleanupFailed<'_> {
    fn log(&self) {
        tracing::warn!(path = %self.path.display(), error = %self.error, "{}", self);
    }
}
