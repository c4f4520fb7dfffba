// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Local directory databases.
//!
//! ```text
//! <tool>_dir1/              LocalDirectoryToolDatabase
//!   metadata.json
//!   results.json
//!   models/                 LocalModelDirectoryDatabase
//!     .locks/<model>.lock
//!     .datasets/<digest>.json
//!     <model>/model.json
//!     <model>/results.json
//! ```

mod local_model;
mod local_tool;
mod locks;

pub use local_model::LocalModelDirectoryDatabase;
pub use local_tool::{default_tool_database, LocalDirectoryToolDatabase};

use crate::errors::DatabaseError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const METADATA_FILE: &str = "metadata.json";
pub const RESULTS_FILE: &str = "results.json";
pub const MODEL_FILE: &str = "model.json";
pub const MODELS_DIR: &str = "models";

/// Serializable pointer to a tool database, stored inside results and
/// metadata so a later reader can reopen it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDatabaseRef {
    pub class: String,
    pub toolname: String,
    pub path: PathBuf,
}

impl ToolDatabaseRef {
    pub fn open(&self) -> Result<LocalDirectoryToolDatabase, DatabaseError> {
        LocalDirectoryToolDatabase::open(&self.toolname, &self.path)
    }
}

/// Replace `path` with `bytes` via a sibling temporary file and a rename.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), DatabaseError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| DatabaseError::io(dir, e))?;
    tmp.write_all(bytes).map_err(|e| DatabaseError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| DatabaseError::io(path, e.error))?;
    Ok(())
}

pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), DatabaseError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| DatabaseError::json(path, e))?;
    write_atomically(path, &bytes)
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DatabaseError> {
    let bytes = fs::read(path).map_err(|e| DatabaseError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| DatabaseError::json(path, e))
}
