use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::database::ToolDatabaseRef;
use crate::errors::DatabaseError;
use crate::model::{Model, ModelfitResults};
use crate::results::Results;

/// Persistent store of models and their fit results, keyed by model name.
///
/// Reads and writes for one name are serialized across threads; a reader
/// never observes a half-written record.
pub trait ModelDatabase: Send + Sync + Debug {
    fn path(&self) -> &Path;

    /// Stored model, with its fit results attached when present.
    fn retrieve_model(&self, name: &str) -> Result<Model, DatabaseError>;

    fn retrieve_modelfit_results(&self, name: &str) -> Result<ModelfitResults, DatabaseError>;

    /// Names of all stored models, sorted.
    fn list_models(&self) -> Result<Vec<String>, DatabaseError>;

    /// Scoped write access for one model. The per-name lock is held until
    /// the transaction is dropped.
    fn transaction<'a>(&'a self, model: &'a Model) -> Result<Box<dyn ModelTransaction + 'a>, DatabaseError>;
}

pub trait ModelTransaction {
    /// Persist the model definition and its dataset.
    fn store_model(&mut self) -> Result<(), DatabaseError>;

    /// Persist the model's fit results, or clear stale ones when it has none.
    fn store_modelfit_results(&mut self) -> Result<(), DatabaseError>;
}

/// Per-run artifact store: metadata, results, files and a model database.
pub trait ToolDatabase: Send + Sync + Debug {
    /// Implementation name recorded in metadata.
    fn class_name(&self) -> &'static str;

    fn toolname(&self) -> &str;

    fn path(&self) -> &Path;

    fn model_database(&self) -> Arc<dyn ModelDatabase>;

    fn store_metadata(&self, metadata: &serde_json::Value) -> Result<(), DatabaseError>;

    fn read_metadata(&self) -> Result<serde_json::Value, DatabaseError>;

    fn store_results(&self, results: &Results) -> Result<(), DatabaseError>;

    /// Copy a file into the database directory, returning the stored path.
    fn store_local_file(&self, source: &Path) -> Result<PathBuf, DatabaseError>;

    fn to_ref(&self) -> ToolDatabaseRef {
        ToolDatabaseRef {
            class: self.class_name().to_string(),
            toolname: self.toolname().to_string(),
            path: self.path().to_path_buf(),
        }
    }
}
