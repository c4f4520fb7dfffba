// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::database::locks::{NameGuard, NameLocks, LOCKS_DIR};
use crate::database::{read_json, write_json, MODEL_FILE, RESULTS_FILE};
use crate::errors::DatabaseError;
use crate::model::{Dataset, Model, ModelfitResults};
use crate::traits::{ModelDatabase, ModelTransaction};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const DATASETS_DIR: &str = ".datasets";

/// Model definition as written to `model.json`. The dataset is stored once
/// under its digest and referenced from here.
#[derive(Serialize, Deserialize)]
struct StoredModel {
    name: String,
    code: String,
    #[serde(default)]
    dataset: Option<String>,
}

/// Model database with one directory per model name.
#[derive(Debug, Clone)]
pub struct LocalModelDirectoryDatabase {
    root: PathBuf,
    locks: Arc<NameLocks>,
}

impl LocalModelDirectoryDatabase {
    /// Open `root`, creating the directory layout if needed.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let root = root.into();
        let datasets = root.join(DATASETS_DIR);
        fs::create_dir_all(&datasets).map_err(|e| DatabaseError::io(&datasets, e))?;
        let locks = root.join(LOCKS_DIR);
        fs::create_dir_all(&locks).map_err(|e| DatabaseError::io(&locks, e))?;
        Ok(Self::at(root))
    }

    /// Open an existing database without creating anything.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(DatabaseError::Missing { path: root });
        }
        Ok(Self::at(root))
    }

    fn at(root: PathBuf) -> Self {
        let locks = NameLocks::for_root(&root);
        Self { root, locks }
    }

    fn model_dir(&self, name: &str) -> Result<PathBuf, DatabaseError> {
        let valid = !name.is_empty()
            && !name.starts_with('.')
            && !name.contains(['/', '\\'])
            && Path::new(name).components().count() == 1;
        if !valid {
            return Err(DatabaseError::InvalidName {
                name: name.to_string(),
            });
        }
        Ok(self.root.join(name))
    }

    fn dataset_path(&self, digest: &str) -> PathBuf {
        self.root.join(DATASETS_DIR).join(format!("{digest}.json"))
    }

    fn read_results(&self, dir: &Path) -> Result<Option<ModelfitResults>, DatabaseError> {
        let path = dir.join(RESULTS_FILE);
        match read_json(&path) {
            Ok(results) => Ok(Some(results)),
            Err(e) if e.is_cache_miss() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl ModelDatabase for LocalModelDirectoryDatabase {
    fn path(&self) -> &Path {
        &self.root
    }

    fn retrieve_model(&self, name: &str) -> Result<Model, DatabaseError> {
        let dir = self.model_dir(name)?;
        let _guard = self.locks.acquire(name)?;

        let stored: StoredModel = match read_json(&dir.join(MODEL_FILE)) {
            Ok(stored) => stored,
            Err(e) if e.is_cache_miss() => {
                return Err(DatabaseError::ModelNotFound {
                    name: name.to_string(),
                })
            }
            Err(e) => return Err(e),
        };

        let mut model = Model::new(stored.name, stored.code);
        if let Some(digest) = stored.dataset {
            let dataset: Dataset = read_json(&self.dataset_path(&digest))?;
            model.set_dataset(Some(dataset));
        }
        model.set_modelfit_results(self.read_results(&dir)?);
        Ok(model)
    }

    fn retrieve_modelfit_results(&self, name: &str) -> Result<ModelfitResults, DatabaseError> {
        let dir = self.model_dir(name)?;
        let _guard = self.locks.acquire(name)?;
        self.read_results(&dir)?
            .ok_or_else(|| DatabaseError::ResultsNotFound {
                name: name.to_string(),
            })
    }

    fn list_models(&self) -> Result<Vec<String>, DatabaseError> {
        let entries = fs::read_dir(&self.root).map_err(|e| DatabaseError::io(&self.root, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| DatabaseError::io(&self.root, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') && entry.path().join(MODEL_FILE).is_file() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    fn transaction<'a>(&'a self, model: &'a Model) -> Result<Box<dyn ModelTransaction + 'a>, DatabaseError> {
        let dir = self.model_dir(model.name())?;
        let guard = self.locks.acquire(model.name())?;
        Ok(Box::new(LocalModelTransaction {
            db: self,
            model,
            dir,
            _guard: guard,
        }))
    }
}

struct LocalModelTransaction<'a> {
    db: &'a LocalModelDirectoryDatabase,
    model: &'a Model,
    dir: PathBuf,
    _guard: NameGuard,
}

impl ModelTransaction for LocalModelTransaction<'_> {
    fn store_model(&mut self) -> Result<(), DatabaseError> {
        fs::create_dir_all(&self.dir).map_err(|e| DatabaseError::io(&self.dir, e))?;

        let digest = match self.model.dataset() {
            Some(dataset) => {
                let digest = dataset.fingerprint().to_hex();
                let path = self.db.dataset_path(&digest);
                if !path.is_file() {
                    write_json(&path, dataset)?;
                }
                Some(digest)
            }
            None => None,
        };

        let stored = StoredModel {
            name: self.model.name().to_string(),
            code: self.model.code().to_string(),
            dataset: digest,
        };
        write_json(&self.dir.join(MODEL_FILE), &stored)
    }

    fn store_modelfit_results(&mut self) -> Result<(), DatabaseError> {
        fs::create_dir_all(&self.dir).map_err(|e| DatabaseError::io(&self.dir, e))?;
        let path = self.dir.join(RESULTS_FILE);
        match self.model.modelfit_results() {
            Some(results) => write_json(&path, results),
            None => match fs::remove_file(&path) {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(DatabaseError::io(&path, e)),
                _ => Ok(()),
            },
        }
    }
}
