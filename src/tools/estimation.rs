// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Estimation tools: the programs that actually fit a model.
//!
//! Tools are looked up by name in a process-wide registry when a fit task
//! runs. Nothing is registered by default; an application registers the
//! estimation programs it has installed, typically as
//! [`CommandEstimationTool`]s.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use anyhow::Context;

use crate::config;
use crate::engine::TaskContext;
use crate::errors::ToolError;
use crate::model::{Dataset, Model, ModelfitResults};
use crate::observability::messages::tool::EstimationStarted;
use crate::observability::messages::StructuredLog;
use crate::traits::EstimationTool;

static REGISTRY: LazyLock<RwLock<HashMap<String, Arc<dyn EstimationTool>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Register `tool` under its name, replacing an earlier registration.
pub fn register_estimation_tool(tool: Arc<dyn EstimationTool>) {
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(tool.name().to_string(), tool);
}

/// Resolve an estimation tool; `None` means the configured default.
pub fn estimation_tool(name: Option<&str>) -> Result<Arc<dyn EstimationTool>, ToolError> {
    let cfg = config::global();
    let name = name.unwrap_or_else(|| cfg.modelfit.default_tool());
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
        .ok_or_else(|| ToolError::UnknownEstimationTool {
            name: name.to_string(),
        })
}

/// Fits a model by running an external program.
///
/// In the task's scratch directory the tool writes `<model>.mod` (the model
/// code) and, when the model has a dataset, `<model>.csv`. The program is
/// run there with the `.mod` file name as its last argument and must leave
/// its estimates in `<model>.json`, deserialised as [`ModelfitResults`].
#[derive(Debug, Clone)]
pub struct CommandEstimationTool {
    name: String,
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEstimationTool {
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn write_inputs(&self, model: &Model, dir: &Path) -> anyhow::Result<PathBuf> {
        let model_file = dir.join(format!("{}.mod", model.name()));
        fs::write(&model_file, model.code())
            .with_context(|| format!("writing {}", model_file.display()))?;
        if let Some(dataset) = model.dataset() {
            let data_file = dir.join(format!("{}.csv", model.name()));
            fs::write(&data_file, to_csv(dataset))
                .with_context(|| format!("writing {}", data_file.display()))?;
        }
        Ok(model_file)
    }
}

impl EstimationTool for CommandEstimationTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, mut model: Model, ctx: &TaskContext) -> anyhow::Result<Model> {
        let dir = ctx.task_dir(model.name())?;
        let model_file = self.write_inputs(&model, &dir)?;

        EstimationStarted {
            tool: &self.name,
            model: model.name(),
            directory: &dir,
        }
        .log();

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(model_file.file_name().unwrap_or_default())
            .current_dir(&dir)
            .output()
            .with_context(|| format!("{}: cannot run {}", self.name, self.program.display()))?;
        if !output.status.success() {
            anyhow::bail!(
                "{} failed on model '{}' ({}): {}",
                self.name,
                model.name(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let results_file = dir.join(format!("{}.json", model.name()));
        let text = fs::read_to_string(&results_file)
            .with_context(|| format!("{}: no results in {}", self.name, results_file.display()))?;
        let results: ModelfitResults = serde_json::from_str(&text)
            .with_context(|| format!("{}: malformed results in {}", self.name, results_file.display()))?;
        model.set_modelfit_results(Some(results));
        Ok(model)
    }
}

fn to_csv(dataset: &Dataset) -> String {
    let mut out = dataset.columns().join(",");
    out.push('\n');
    for row in dataset.rows() {
        let cells: Vec<String> = row.iter().map(f64::to_string).collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}
