// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-name locks on a model database.
//!
//! Threads of one process queue on an in-memory table. The holder then
//! takes an exclusive advisory lock on `<root>/.locks/<name>.lock`, which
//! serializes it against other processes using the same directory.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, LazyLock, Mutex, PoisonError};

use crate::errors::DatabaseError;

pub(crate) const LOCKS_DIR: &str = ".locks";

/// One lock table per database root, shared by every handle on that root
/// inside the process.
static TABLES: LazyLock<Mutex<HashMap<PathBuf, Arc<NameLocks>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Exclusive locks on model names.
#[derive(Debug)]
pub(crate) struct NameLocks {
    dir: PathBuf,
    held: Mutex<HashSet<String>>,
    released: Condvar,
}

impl NameLocks {
    fn new(root: &Path) -> Self {
        Self {
            dir: root.join(LOCKS_DIR),
            held: Mutex::default(),
            released: Condvar::new(),
        }
    }

    pub(crate) fn for_root(root: &Path) -> Arc<Self> {
        let key = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
        let mut tables = TABLES.lock().unwrap_or_else(PoisonError::into_inner);
        tables.entry(key).or_insert_with(|| Arc::new(Self::new(root))).clone()
    }

    /// Block until `name` is free, then hold it until the guard drops.
    pub(crate) fn acquire(self: &Arc<Self>, name: &str) -> Result<NameGuard, DatabaseError> {
        let mut held = self.held.lock().unwrap_or_else(PoisonError::into_inner);
        while held.contains(name) {
            held = self
                .released
                .wait(held)
                .unwrap_or_else(PoisonError::into_inner);
        }
        held.insert(name.to_string());
        drop(held);

        let mut guard = NameGuard {
            locks: Arc::clone(self),
            name: name.to_string(),
            file: None,
        };
        guard.file = Some(self.lock_file(name)?);
        Ok(guard)
    }

    fn lock_file(&self, name: &str) -> Result<File, DatabaseError> {
        fs::create_dir_all(&self.dir).map_err(|e| DatabaseError::io(&self.dir, e))?;
        let path = self.dir.join(format!("{name}.lock"));
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| DatabaseError::io(&path, e))?;
        file.lock().map_err(|e| DatabaseError::io(&path, e))?;
        Ok(file)
    }
}

pub(crate) struct NameGuard {
    locks: Arc<NameLocks>,
    name: String,
    file: Option<File>,
}

impl Drop for NameGuard {
    fn drop(&mut self) {
        // Closing the file releases the advisory lock.
        self.file.take();
        let mut held = self.locks.held.lock().unwrap_or_else(PoisonError::into_inner);
        held.remove(&self.name);
        self.locks.released.notify_all();
    }
}
