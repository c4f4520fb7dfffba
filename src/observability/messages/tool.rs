// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for tool runs.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::time::Duration;
use tracing::Span;

/// Tool run started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ToolRunStarted<'a> {
    pub tool: &'a str,
    pub database: &'a Path,
}

impl Display for ToolRunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Running tool '{}' in {}", self.tool, self.database.display())
    }
}

impl StructuredLog for ToolRunStarted<'_> {
    fn log(&self) {
        tracing::info!(tool = self.tool, database = %self.database.display(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "tool_run",
            span_name = name,
            tool = self.tool,
            database = %self.database.display(),
        )
    }
}

/// Tool run completed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ToolRunCompleted<'a> {
    pub tool: &'a str,
    pub duration: Duration,
}

impl Display for ToolRunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Tool '{}' finished in {:?}", self.tool, self.duration)
    }
}

impl StructuredLog for ToolRunCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            tool = self.tool,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Run metadata could not be persisted. The run continues.
///
/// # Log Level
/// `warn!`
pub struct MetadataWriteFailed<'a> {
    pub tool: &'a str,
    pub stage: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for MetadataWriteFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Could not write {} metadata for tool '{}': {}",
            self.stage, self.tool, self.error
        )
    }
}

impl StructuredLog for MetadataWriteFailed<'_> {
    fn log(&self) {
        tracing::warn!(tool = self.tool, stage = self.stage, error = %self.error, "{}", self);
    }
}

/// # Log Level
/// `debug!`
pub struct InputModelsStored<'a> {
    pub tool: &'a str,
    pub count: usize,
}

impl Display for InputModelsStored<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stored {} input models for tool '{}'", self.count, self.tool)
    }
}

impl StructuredLog for InputModelsStored<'_> {
    fn log(&self) {
        tracing::debug!(tool = self.tool, count = self.count, "{}", self);
    }
}

/// # Log Level
/// `info!`
pub struct EstimationStarted<'a> {
    pub tool: &'a str,
    pub model: &'a str,
    pub directory: &'a Path,
}

impl Display for EstimationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Fitting model '{}' with {} in {}",
            self.model,
            self.tool,
            self.directory.display()
        )
    }
}

impl StructuredLog for EstimationStarted<'_> {
    fn log(&self) {
        tracing::info!(
            tool = self.tool,
            model = self.model,
            directory = %self.directory.display(),
            "{}", self
        );
    }
}
