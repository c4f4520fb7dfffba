// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_ESTIMATION_TOOL, FALLBACK_CONCURRENCY};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Engine configuration.
///
/// Every section is optional; an empty file is a valid configuration.
///
/// # Example
/// ```yaml
/// dispatcher: threaded
/// executor_options:
///   max_concurrency: 8
/// database:
///   parent_dir: /scratch/runs
/// modelfit:
///   default_tool: nlmixr
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub dispatcher: DispatcherKind,
    #[serde(default)]
    pub executor_options: ExecutorOptions,
    #[serde(default)]
    pub database: DatabaseOptions,
    #[serde(default)]
    pub modelfit: ModelfitOptions,
}

/// Backend used when a caller does not pass a dispatcher.
///
/// * `Threaded` - in-process thread pool, no nested submission
/// * `Distributed` - local cluster of worker threads behind a scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatcherKind {
    Threaded,
    #[default]
    Distributed,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ExecutorOptions {
    /// Task slots of the threaded dispatcher.
    pub max_concurrency: Option<usize>,
    /// Worker threads of a cluster started by the distributed dispatcher.
    pub workers: Option<usize>,
}

impl ExecutorOptions {
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency.unwrap_or_else(default_concurrency)
    }

    pub fn workers(&self) -> usize {
        self.workers.unwrap_or_else(default_concurrency)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DatabaseOptions {
    /// Where default `<tool>_dir<n>` run directories are created.
    pub parent_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ModelfitOptions {
    pub default_tool: Option<String>,
}

impl ModelfitOptions {
    pub fn default_tool(&self) -> &str {
        self.default_tool.as_deref().unwrap_or(DEFAULT_ESTIMATION_TOOL)
    }
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(FALLBACK_CONCURRENCY)
}

/// Load a config from a YAML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a config and reject values the engine cannot run with.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;

    let mut problems = Vec::new();
    if cfg.executor_options.max_concurrency == Some(0) {
        problems.push("executor_options.max_concurrency must be at least 1".to_string());
    }
    if cfg.executor_options.workers == Some(0) {
        problems.push("executor_options.workers must be at least 1".to_string());
    }
    if cfg.modelfit.default_tool.as_deref().is_some_and(|t| t.trim().is_empty()) {
        problems.push("modelfit.default_tool must not be empty".to_string());
    }

    if problems.is_empty() {
        Ok(cfg)
    } else {
        Err(ConfigError::Invalid { problems })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, yaml: &str) -> PathBuf {
        let path = dir.path().join("pharmflow.yaml");
        fs::write(&path, yaml).unwrap();
        path
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
dispatcher: threaded
executor_options:
  max_concurrency: 3
  workers: 2
database:
  parent_dir: /scratch/runs
modelfit:
  default_tool: nlmixr
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.dispatcher, DispatcherKind::Threaded);
        assert_eq!(cfg.executor_options.max_concurrency(), 3);
        assert_eq!(cfg.executor_options.workers(), 2);
        assert_eq!(cfg.database.parent_dir, Some(PathBuf::from("/scratch/runs")));
        assert_eq!(cfg.modelfit.default_tool(), "nlmixr");
    }

    #[test]
    fn empty_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_and_validate_config(write(&dir, "")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.dispatcher, DispatcherKind::Distributed);
        assert_eq!(cfg.modelfit.default_tool(), DEFAULT_ESTIMATION_TOOL);
    }

    #[test]
    fn unknown_dispatcher_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(write(&dir, "dispatcher: sge\n")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "executor_options:\n  max_concurrency: 0\n  workers: 0\n");
        match load_and_validate_config(path).unwrap_err() {
            ConfigError::Invalid { problems } => assert_eq!(problems.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_config("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
