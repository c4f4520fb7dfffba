// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The `modelfit` tool.
//!
//! Fits each given model with an estimation tool, reusing stored results
//! when the run's model database already holds an equivalent fit.
//!
//! ```text
//!   run0 ─┐
//!   run1 ─┼──▶ results   (one model, or a list of models)
//!   run2 ─┘
//! ```

use anyhow::anyhow;

use crate::engine::TaskContext;
use crate::errors::{DatabaseError, GraphError, ToolError};
use crate::model::{Model, ModelfitResults};
use crate::observability::messages::cache::{CacheHit, CacheMiss, FitStored};
use crate::observability::messages::StructuredLog;
use crate::tools::{estimation_tool, ToolOptions};
use crate::traits::{ModelDatabase, ParamSpec, Tool};
use crate::workflow::{Task, TaskId, Value, Workflow};

pub const MODELFIT: &str = "modelfit";

/// What a fit workflow fits.
#[derive(Debug, Clone, PartialEq)]
pub enum FitTargets {
    /// Fit these models.
    Models(Vec<Model>),
    /// `n` fit tasks that receive their model from a predecessor once the
    /// workflow is embedded in a larger one.
    Placeholders(usize),
}

impl FitTargets {
    fn len(&self) -> usize {
        match self {
            FitTargets::Models(models) => models.len(),
            FitTargets::Placeholders(n) => *n,
        }
    }
}

pub struct Modelfit {
    params: Vec<ParamSpec>,
}

impl Modelfit {
    pub fn new() -> Self {
        Self {
            params: vec![
                ParamSpec::optional("models", Value::Unit),
                ParamSpec::optional("n", Value::Unit),
                ParamSpec::optional("tool", Value::Unit),
            ],
        }
    }
}

impl Default for Modelfit {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for Modelfit {
    fn name(&self) -> &str {
        MODELFIT
    }

    fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    fn create_workflow(&self, options: &ToolOptions) -> Result<Workflow, ToolError> {
        let models = options.models("models")?;
        let tool = options.optional_text("tool")?;

        let targets = if !models.is_empty() {
            FitTargets::Models(models)
        } else {
            match options.optional_int("n")? {
                None => FitTargets::Placeholders(1),
                Some(n) if n > 0 => FitTargets::Placeholders(n as usize),
                Some(_) => {
                    return Err(ToolError::InvalidOption {
                        tool: MODELFIT.to_string(),
                        param: "n".to_string(),
                        reason: "must be positive".to_string(),
                    })
                }
            }
        };

        let mut wf = create_fit_workflow(targets, tool.as_deref())?;
        wf.set_name(MODELFIT);
        let fits = wf.output_tasks();
        wf.add_task(Task::pure("results", collect_fitted), &fits)?;
        Ok(wf)
    }
}

/// Workflow of independent memoized fit tasks, one per target, named `run`
/// when there is a single target and `run<i>` otherwise.
///
/// Other tools embed it and add their own reduction after it. Placeholder
/// fits must each receive one model; [`insert_fit_workflow`] does that
/// wiring.
pub fn create_fit_workflow(targets: FitTargets, tool: Option<&str>) -> Result<Workflow, GraphError> {
    let single = targets.len() == 1;
    let name = |i: usize| if single { "run".to_string() } else { format!("run{i}") };

    let mut wf = Workflow::new();
    match targets {
        FitTargets::Models(models) => {
            for (i, model) in models.into_iter().enumerate() {
                wf.add_task(fit_task(name(i), tool).with_arg(model), &[])?;
            }
        }
        FitTargets::Placeholders(n) => {
            for i in 0..n {
                wf.add_task(fit_task(name(i), tool), &[])?;
            }
        }
    }
    Ok(wf)
}

/// Append one placeholder fit per id in `predecessors`, each fed by its own
/// upstream task. Returns the fit task ids in the same order.
pub fn insert_fit_workflow(
    wf: &mut Workflow,
    predecessors: &[TaskId],
    tool: Option<&str>,
) -> Result<Vec<TaskId>, GraphError> {
    let fits = create_fit_workflow(FitTargets::Placeholders(predecessors.len()), tool)?;
    wf.insert_workflow_paired(fits, predecessors)
}

fn fit_task(name: String, tool: Option<&str>) -> Task {
    let tool = tool.map(str::to_string);
    Task::new(name, move |ctx, args| {
        let mut models = args.into_iter().filter_map(Value::into_model);
        let model = models.next().ok_or_else(|| anyhow!("no model to fit"))?;
        let extra = models.count();
        if extra > 0 {
            return Err(anyhow!("fit task got {} models, expected one", extra + 1));
        }
        Ok(Value::Model(retrieve_from_database_or_execute_model_with_tool(
            model,
            tool.as_deref(),
            ctx,
        )?))
    })
}

fn collect_fitted(models: Vec<Value>) -> anyhow::Result<Value> {
    match models.len() {
        0 => Err(anyhow!("no fitted models")),
        1 => Ok(models.into_iter().next().unwrap_or_default()),
        _ => Ok(Value::List(models)),
    }
}

enum CacheLookup {
    Reuse(ModelfitResults),
    Miss(&'static str),
}

/// Fit `model`, or reuse the results of an equivalent stored fit.
///
/// A stored model is reused only when it has fit results, the same
/// definition and the same dataset. Missing entries are cache misses; other
/// database errors fail the task. A fresh fit is stored in the run's model
/// database before it is returned.
pub fn retrieve_from_database_or_execute_model_with_tool(
    mut model: Model,
    tool: Option<&str>,
    ctx: &TaskContext,
) -> anyhow::Result<Model> {
    let db = ctx.model_database();

    match lookup(db.as_ref(), &model)? {
        CacheLookup::Reuse(results) => {
            CacheHit { model: model.name() }.log();
            model.set_modelfit_results(Some(results));
            return Ok(model);
        }
        CacheLookup::Miss(reason) => CacheMiss {
            model: model.name(),
            reason,
        }
        .log(),
    }

    let estimator = estimation_tool(tool)?;
    let fitted = estimator.execute(model, ctx)?;

    let mut txn = db.transaction(&fitted)?;
    txn.store_model()?;
    txn.store_modelfit_results()?;
    drop(txn);
    FitStored {
        model: fitted.name(),
        database: db.path(),
    }
    .log();

    Ok(fitted)
}

fn lookup(db: &dyn ModelDatabase, model: &Model) -> Result<CacheLookup, DatabaseError> {
    let stored = match db.retrieve_model(model.name()) {
        Ok(stored) => stored,
        Err(e) if e.is_cache_miss() => return Ok(CacheLookup::Miss("not in database")),
        Err(e) => return Err(e),
    };
    if !stored.is_equivalent_to(model) {
        return Ok(CacheLookup::Miss("stored model differs"));
    }
    Ok(match stored.modelfit_results() {
        Some(results) => CacheLookup::Reuse(results.clone()),
        None => CacheLookup::Miss("no stored results"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolCall;

    fn names(wf: &Workflow) -> Vec<&str> {
        wf.tasks().iter().map(Task::name).collect()
    }

    #[test]
    fn one_fit_task_per_model() {
        let models = vec![Model::new("a", "1"), Model::new("b", "2"), Model::new("c", "3")];
        let wf = create_fit_workflow(FitTargets::Models(models), None).unwrap();
        assert_eq!(names(&wf), ["run0", "run1", "run2"]);
        assert_eq!(wf.output_tasks().len(), 3);
        assert_eq!(wf.tasks()[1].bound_args(), [Value::Model(Model::new("b", "2"))]);
    }

    #[test]
    fn single_target_is_named_run() {
        let wf = create_fit_workflow(FitTargets::Placeholders(1), Some("nonmem")).unwrap();
        assert_eq!(names(&wf), ["run"]);
        assert!(wf.tasks()[0].bound_args().is_empty());
    }

    #[test]
    fn tool_workflow_ends_in_results_task() {
        let call = ToolCall::new().arg(vec![Model::new("a", "1"), Model::new("b", "2")]);
        let options = ToolOptions::resolve(&Modelfit::new(), &call).unwrap();
        let wf = Modelfit::new().create_workflow(&options).unwrap();

        assert_eq!(wf.name(), Some(MODELFIT));
        let outputs = wf.output_tasks();
        assert_eq!(outputs.len(), 1);
        let results = wf.task(outputs[0]).unwrap();
        assert_eq!(results.name(), "results");
        assert_eq!(wf.predecessors(results.id()).len(), 2);
    }

    #[test]
    fn placeholders_from_n() {
        let call = ToolCall::new().kwarg("n", 2);
        let options = ToolOptions::resolve(&Modelfit::new(), &call).unwrap();
        let wf = Modelfit::new().create_workflow(&options).unwrap();
        assert_eq!(names(&wf), ["run0", "run1", "results"]);

        let call = ToolCall::new().kwarg("n", 0);
        let options = ToolOptions::resolve(&Modelfit::new(), &call).unwrap();
        assert!(matches!(
            Modelfit::new().create_workflow(&options),
            Err(ToolError::InvalidOption { .. })
        ));
    }

    #[test]
    fn embedded_placeholders_take_one_predecessor_each() {
        let mut wf = Workflow::new();
        let a = wf.add_task(Task::constant("a", Model::new("a", "1")), &[]).unwrap();
        let b = wf.add_task(Task::constant("b", Model::new("b", "2")), &[]).unwrap();

        let fits = insert_fit_workflow(&mut wf, &[a, b], None).unwrap();

        assert_eq!(fits.len(), 2);
        assert_eq!(wf.predecessors(fits[0]), &[a]);
        assert_eq!(wf.predecessors(fits[1]), &[b]);
        assert_eq!(wf.task(fits[1]).unwrap().name(), "run1");
    }

    #[test]
    fn results_task_unwraps_a_single_model() {
        let one = collect_fitted(vec![Value::Model(Model::new("a", "1"))]).unwrap();
        assert_eq!(one.into_model().unwrap().name(), "a");

        let two = collect_fitted(vec![Value::Int(1), Value::Int(2)]).unwrap();
        assert_eq!(two.into_list().unwrap().len(), 2);
    }
}
