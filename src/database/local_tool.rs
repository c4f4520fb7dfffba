// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config;
use crate::database::{read_json, write_json, LocalModelDirectoryDatabase, METADATA_FILE, MODELS_DIR, RESULTS_FILE};
use crate::errors::DatabaseError;
use crate::results::Results;
use crate::traits::{ModelDatabase, ToolDatabase};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Tool database backed by one run directory.
#[derive(Debug, Clone)]
pub struct LocalDirectoryToolDatabase {
    toolname: String,
    path: PathBuf,
    model_database: Arc<LocalModelDirectoryDatabase>,
}

impl LocalDirectoryToolDatabase {
    /// Create the database at `path`.
    ///
    /// Fails with [`DatabaseError::AlreadyExists`] when the directory is
    /// already there, unless `exist_ok` is set.
    pub fn create(toolname: impl Into<String>, path: impl Into<PathBuf>, exist_ok: bool) -> Result<Self, DatabaseError> {
        let path = path.into();
        if path.exists() && !exist_ok {
            return Err(DatabaseError::AlreadyExists { path });
        }
        fs::create_dir_all(&path).map_err(|e| DatabaseError::io(&path, e))?;
        Self::with_layout(toolname.into(), path)
    }

    /// Reopen a database written by an earlier run.
    pub fn open(toolname: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let path = path.into();
        if !path.is_dir() {
            return Err(DatabaseError::Missing { path });
        }
        Self::with_layout(toolname.into(), path)
    }

    fn with_layout(toolname: String, path: PathBuf) -> Result<Self, DatabaseError> {
        let model_database = LocalModelDirectoryDatabase::create(path.join(MODELS_DIR))?;
        Ok(Self {
            toolname,
            path,
            model_database: Arc::new(model_database),
        })
    }

    pub fn results_path(&self) -> PathBuf {
        self.path.join(RESULTS_FILE)
    }

    /// Location for an artifact named `name` inside the run directory.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl ToolDatabase for LocalDirectoryToolDatabase {
    fn class_name(&self) -> &'static str {
        "LocalDirectoryToolDatabase"
    }

    fn toolname(&self) -> &str {
        &self.toolname
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn model_database(&self) -> Arc<dyn ModelDatabase> {
        self.model_database.clone()
    }

    fn store_metadata(&self, metadata: &serde_json::Value) -> Result<(), DatabaseError> {
        write_json(&self.path.join(METADATA_FILE), metadata)
    }

    fn read_metadata(&self) -> Result<serde_json::Value, DatabaseError> {
        read_json(&self.path.join(METADATA_FILE))
    }

    fn store_results(&self, results: &Results) -> Result<(), DatabaseError> {
        write_json(&self.results_path(), results)
    }

    fn store_local_file(&self, source: &Path) -> Result<PathBuf, DatabaseError> {
        let file_name = source.file_name().ok_or_else(|| {
            DatabaseError::io(source, std::io::Error::new(ErrorKind::InvalidInput, "not a file path"))
        })?;
        let dest = self.path.join(file_name);
        fs::copy(source, &dest).map_err(|e| DatabaseError::io(source, e))?;
        Ok(dest)
    }
}

/// Create a tool database in the first free `<toolname>_dir<n>` directory.
///
/// With an explicit `path` the directory is used as given. Otherwise the
/// run directory is placed under `database.parent_dir` from the global
/// configuration, or the current directory.
pub fn default_tool_database(
    toolname: &str,
    path: Option<&Path>,
    exist_ok: bool,
) -> Result<LocalDirectoryToolDatabase, DatabaseError> {
    if let Some(path) = path {
        return LocalDirectoryToolDatabase::create(toolname, path, exist_ok);
    }

    let parent = match config::global().database.parent_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().map_err(|e| DatabaseError::io(".", e))?,
    };
    fs::create_dir_all(&parent).map_err(|e| DatabaseError::io(&parent, e))?;

    let mut n = 1;
    loop {
        let candidate = parent.join(format!("{toolname}_dir{n}"));
        match fs::create_dir(&candidate) {
            Ok(()) => return LocalDirectoryToolDatabase::create(toolname, candidate, true),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(DatabaseError::io(candidate, e)),
        }
    }
}
