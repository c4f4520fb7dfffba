// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::Path;
use std::sync::Arc;

use crate::database::{LocalModelDirectoryDatabase, MODELS_DIR};
use crate::errors::ToolError;
use crate::model::Model;
use crate::results::Results;
use crate::traits::{ModelDatabase, ToolDatabase};

/// Where to find the models of a finished run.
#[derive(Debug, Clone, Copy)]
pub enum ModelSource<'a> {
    /// A tool run directory.
    Path(&'a Path),
    /// Results that reference the tool database they were stored in.
    Results(&'a Results),
    ToolDatabase(&'a dyn ToolDatabase),
    ModelDatabase(&'a dyn ModelDatabase),
}

/// Read models created by a tool run; `names == None` reads all of them.
pub fn retrieve_models(source: ModelSource<'_>, names: Option<&[&str]>) -> Result<Vec<Model>, ToolError> {
    let opened: Arc<dyn ModelDatabase>;
    let db: &dyn ModelDatabase = match source {
        ModelSource::Path(path) => {
            opened = Arc::new(LocalModelDirectoryDatabase::open(path.join(MODELS_DIR))?);
            opened.as_ref()
        }
        ModelSource::Results(results) => {
            let reference = results.tool_database().ok_or_else(|| ToolError::NoModelSource {
                reason: format!("results of '{}' do not reference a tool database", results.tool_name()),
            })?;
            opened = reference.open()?.model_database();
            opened.as_ref()
        }
        ModelSource::ToolDatabase(tool_db) => {
            opened = tool_db.model_database();
            opened.as_ref()
        }
        ModelSource::ModelDatabase(db) => db,
    };

    let names: Vec<String> = match names {
        Some(names) => names.iter().map(|n| n.to_string()).collect(),
        None => db.list_models()?,
    };
    names
        .iter()
        .map(|name| db.retrieve_model(name).map_err(ToolError::from))
        .collect()
}

/// The model a tool picked as its final model, named by the results'
/// `final_model_name` field.
pub fn retrieve_final_model(results: &Results) -> Result<Model, ToolError> {
    let name = results
        .field("final_model_name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::NoModelSource {
            reason: format!("results of '{}' name no final model", results.tool_name()),
        })?;
    let mut models = retrieve_models(ModelSource::Results(results), Some(&[name][..]))?;
    models.pop().ok_or_else(|| ToolError::NoModelSource {
        reason: format!("final model '{name}' was not retrieved"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::LocalDirectoryToolDatabase;
    use crate::model::ModelfitResults;

    fn populated(dir: &tempfile::TempDir) -> LocalDirectoryToolDatabase {
        let db = LocalDirectoryToolDatabase::create("scm", dir.path().join("scm_dir1"), false).unwrap();
        let models = db.model_database();
        for (name, ofv) in [("base", 720.0), ("step1", 701.5)] {
            let mut model = Model::new(name, format!("$PK {name}"));
            model.set_modelfit_results(Some(ModelfitResults::with_ofv(ofv)));
            let mut txn = models.transaction(&model).unwrap();
            txn.store_model().unwrap();
            txn.store_modelfit_results().unwrap();
        }
        db
    }

    #[test]
    fn all_models_from_a_run_directory() {
        let dir = tempfile::tempdir().unwrap();
        populated(&dir);

        let models = retrieve_models(ModelSource::Path(&dir.path().join("scm_dir1")), None).unwrap();
        let names: Vec<_> = models.iter().map(Model::name).collect();
        assert_eq!(names, ["base", "step1"]);
        assert_eq!(models[1].modelfit_results().unwrap().ofv, Some(701.5));
    }

    #[test]
    fn final_model_through_results() {
        let dir = tempfile::tempdir().unwrap();
        let db = populated(&dir);
        let mut results = Results::new("scm").with_field("final_model_name", "step1");
        results.set_tool_database(db.to_ref());

        assert_eq!(retrieve_final_model(&results).unwrap().name(), "step1");
    }

    #[test]
    fn results_without_a_database() {
        let results = Results::new("scm").with_field("final_model_name", "step1");
        let err = retrieve_final_model(&results).unwrap_err();
        assert!(matches!(err, ToolError::NoModelSource { .. }));
    }

    #[test]
    fn unknown_name_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let db = populated(&dir);
        let err = retrieve_models(ModelSource::ToolDatabase(&db), Some(&["step9"][..])).unwrap_err();
        assert!(matches!(err, ToolError::Database(ref e) if e.is_cache_miss()));
    }
}
