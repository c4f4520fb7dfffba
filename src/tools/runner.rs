// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use tracing::Instrument;

use crate::database::default_tool_database;
use crate::engine::{default_dispatcher, execute_workflow};
use crate::errors::{DatabaseError, ToolError};
use crate::model::Model;
use crate::observability::messages::tool::{InputModelsStored, MetadataWriteFailed, ToolRunCompleted, ToolRunStarted};
use crate::observability::messages::StructuredLog;
use crate::tools::modelfit::MODELFIT;
use crate::tools::registry::lookup_tool;
use crate::tools::{ToolCall, ToolMetadata, ToolOptions};
use crate::traits::{Tool, ToolDatabase};
use crate::workflow::Value;

/// Runs one tool from argument resolution to recorded metadata.
///
/// ```text
/// resolve options ─▶ build workflow ─▶ pick dispatcher + database
///   ─▶ write start metadata ─▶ store input models ─▶ execute
///   ─▶ write end metadata
/// ```
///
/// Metadata writes are best effort: a failure is logged and the run goes
/// on. A failed run leaves its start metadata behind.
pub struct ToolRunner {
    tool: Arc<dyn Tool>,
}

impl ToolRunner {
    pub fn new(tool: Arc<dyn Tool>) -> Self {
        Self { tool }
    }

    /// Runner for a tool in the process-wide registry.
    pub fn named(name: &str) -> Result<Self, ToolError> {
        Ok(Self::new(lookup_tool(name)?))
    }

    pub async fn run(&self, call: ToolCall) -> Result<Value, ToolError> {
        let start_time = Local::now();
        let tool_name = self.tool.name();
        let options = ToolOptions::resolve(self.tool.as_ref(), &call)?;
        let mut workflow = self.tool.create_workflow(&options)?;
        if workflow.name().is_none() {
            workflow.set_name(tool_name);
        }
        let db_name = workflow.name().unwrap_or(tool_name).to_string();

        let common = call.into_common();
        let recorded = common.metadata_entries();
        let dispatcher = common.dispatcher.unwrap_or_else(default_dispatcher);
        let database: Arc<dyn ToolDatabase> = match common.database {
            Some(db) => db,
            None => Arc::new(default_tool_database(&db_name, common.path.as_deref(), common.resume)?),
        };

        let mut metadata = ToolMetadata::start(
            tool_name,
            start_time,
            &options,
            dispatcher.name(),
            database.to_ref(),
            recorded,
        );
        store_metadata(database.as_ref(), &metadata, "start");

        if tool_name != MODELFIT {
            store_input_models(tool_name, &options, database.as_ref())?;
        }

        let started = ToolRunStarted {
            tool: tool_name,
            database: database.path(),
        };
        started.log();
        let span = started.span("run_tool");
        let start = Instant::now();

        let value = execute_workflow(workflow, Some(dispatcher), Some(database.clone()))
            .instrument(span)
            .await?;

        metadata.finish();
        store_metadata(database.as_ref(), &metadata, "end");
        ToolRunCompleted {
            tool: tool_name,
            duration: start.elapsed(),
        }
        .log();
        Ok(value)
    }
}

/// Run the registered tool `name`.
///
/// The value is whatever the tool's workflow produces: [`Value::Results`]
/// for analysis tools, fitted models for `modelfit`.
pub async fn run_tool(name: &str, call: ToolCall) -> Result<Value, ToolError> {
    ToolRunner::named(name)?.run(call).await
}

/// Fit `models` with `modelfit` and return them with their fit results.
///
/// `tool` names the estimation tool; `None` uses the configured default.
pub async fn fit(models: Vec<Model>, tool: Option<&str>, call: ToolCall) -> Result<Vec<Model>, ToolError> {
    let mut call = call.kwarg("models", models);
    if let Some(tool) = tool {
        call = call.kwarg("tool", tool);
    }

    match run_tool(MODELFIT, call).await? {
        Value::Model(model) => Ok(vec![model]),
        Value::List(items) => items
            .into_iter()
            .map(|item| {
                item.into_model().ok_or_else(|| ToolError::UnexpectedOutput {
                    tool: MODELFIT.to_string(),
                    reason: "list element is not a model".to_string(),
                })
            })
            .collect(),
        other => Err(ToolError::UnexpectedOutput {
            tool: MODELFIT.to_string(),
            reason: format!("expected models, got {other:?}"),
        }),
    }
}

fn store_metadata(database: &dyn ToolDatabase, metadata: &ToolMetadata, stage: &str) {
    let written = metadata
        .to_json()
        .map_err(|e| DatabaseError::json(database.path(), e))
        .and_then(|json| database.store_metadata(&json));
    if let Err(error) = written {
        MetadataWriteFailed {
            tool: &metadata.tool_name,
            stage,
            error: &error,
        }
        .log();
    }
}

/// Snapshot the models passed to a tool as `input_model` or
/// `input_model<i>` (1-based) in the run's model database.
fn store_input_models(tool: &str, options: &ToolOptions, database: &dyn ToolDatabase) -> Result<(), DatabaseError> {
    let models = options.input_models();
    if models.is_empty() {
        return Ok(());
    }

    let db = database.model_database();
    for (i, model) in models.iter().enumerate() {
        let name = if models.len() == 1 {
            "input_model".to_string()
        } else {
            format!("input_model{}", i + 1)
        };
        let mut snapshot = model.copy_as(name);
        snapshot.set_modelfit_results(model.modelfit_results().cloned());

        let mut txn = db.transaction(&snapshot)?;
        txn.store_model()?;
        txn.store_modelfit_results()?;
    }

    InputModelsStored {
        tool,
        count: models.len(),
    }
    .log();
    Ok(())
}
