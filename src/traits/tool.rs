use crate::engine::TaskContext;
use crate::errors::ToolError;
use crate::model::Model;
use crate::tools::ToolOptions;
use crate::workflow::{Value, Workflow};

/// One declared parameter of a tool's workflow factory.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: &'static str,
    /// `None` marks the parameter as required.
    pub default: Option<Value>,
}

impl ParamSpec {
    pub fn required(name: &'static str) -> Self {
        Self { name, default: None }
    }

    pub fn optional(name: &'static str, default: impl Into<Value>) -> Self {
        Self {
            name,
            default: Some(default.into()),
        }
    }
}

/// A registered tool: a named workflow factory with declared parameters.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    /// Parameters in positional order.
    fn params(&self) -> &[ParamSpec];

    fn create_workflow(&self, options: &ToolOptions) -> Result<Workflow, ToolError>;
}

/// External estimation program that fits a model.
///
/// `execute` runs synchronously inside a task body and returns the model
/// with fit results attached.
pub trait EstimationTool: Send + Sync {
    fn name(&self) -> &str;

    fn execute(&self, model: Model, ctx: &TaskContext) -> anyhow::Result<Model>;
}
