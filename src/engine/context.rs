// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::distributed::ClusterClient;
use crate::errors::DispatchError;
use crate::observability::messages::cluster::NestedSubmission;
use crate::observability::messages::engine::ScratchCleanupFailed;
use crate::observability::messages::StructuredLog;
use crate::traits::{ModelDatabase, ToolDatabase};
use crate::workflow::{Value, Workflow};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What a running task can reach.
///
/// The process working directory is never changed; tasks that need to
/// write files do so under [`TaskContext::scratch_dir`], which is private to
/// the run and removed when it ends.
#[derive(Clone)]
pub struct TaskContext {
    database: Arc<dyn ToolDatabase>,
    scratch_dir: PathBuf,
    client: Option<ClusterClient>,
}

impl TaskContext {
    pub fn new(database: Arc<dyn ToolDatabase>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            database,
            scratch_dir: scratch_dir.into(),
            client: None,
        }
    }

    pub(crate) fn with_client(mut self, client: ClusterClient) -> Self {
        self.client = Some(client);
        self
    }

    pub fn tool_database(&self) -> &Arc<dyn ToolDatabase> {
        &self.database
    }

    pub fn model_database(&self) -> Arc<dyn ModelDatabase> {
        self.database.model_database()
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Scratch subdirectory for one task, created on demand.
    pub fn task_dir(&self, name: &str) -> std::io::Result<PathBuf> {
        let safe: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        let dir = self.scratch_dir.join(safe);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Whether nested submission is available.
    pub fn has_client(&self) -> bool {
        self.client.is_some()
    }

    /// Run `workflow` to completion from inside a task and return its
    /// output.
    ///
    /// Only tasks running on a distributed cluster can do this. The calling
    /// worker is replaced while it waits, so the nested tasks always have
    /// somewhere to run.
    pub fn call_workflow(&self, workflow: Workflow) -> Result<Value, DispatchError> {
        let client = self.client.as_ref().ok_or(DispatchError::NoClient)?;
        let name = workflow.name().unwrap_or("nested").to_string();
        let graph = Arc::new(workflow.freeze()?);

        let scratch = tempfile::Builder::new()
            .prefix("nested-")
            .tempdir_in(&self.scratch_dir)
            .map_err(DispatchError::ScratchDir)?;
        let child = TaskContext::new(self.database.clone(), scratch.path());

        NestedSubmission {
            workflow: &name,
            worker: client.worker(),
        }
        .log();
        let result = client.submit_blocking(graph, child);

        let path = scratch.path().to_path_buf();
        if let Err(error) = scratch.close() {
            ScratchCleanupFailed { path: &path, error: &error }.log();
        }
        result
    }
}

impl std::fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskContext")
            .field("database", &self.database.path())
            .field("scratch_dir", &self.scratch_dir)
            .field("has_client", &self.client.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::LocalDirectoryToolDatabase;
    use crate::workflow::Task;

    fn context(dir: &tempfile::TempDir) -> TaskContext {
        let db = LocalDirectoryToolDatabase::create("test", dir.path().join("db"), false).unwrap();
        TaskContext::new(Arc::new(db), dir.path().join("scratch"))
    }

    #[test]
    fn task_dirs_live_under_scratch() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let task_dir = ctx.task_dir("run/1").unwrap();
        assert_eq!(task_dir, dir.path().join("scratch").join("run_1"));
        assert!(task_dir.is_dir());
    }

    #[test]
    fn nested_call_without_cluster_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(&dir);
        let wf = Workflow::from_tasks([Task::constant("a", 1)]).unwrap();

        let err = ctx.call_workflow(wf).unwrap_err();
        assert!(matches!(err, DispatchError::NoClient));
        assert_eq!(err.to_string(), "No global client found and no address provided");
    }
}
