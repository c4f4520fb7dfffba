// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tool invocation options.
//!
//! A [`ToolCall`] is what the caller hands to [`run_tool`](crate::tools::run_tool):
//! positional and keyword arguments for the tool, plus the common options
//! that pick where and how the run happens. Resolving a call against the
//! tool's declared parameters gives the [`ToolOptions`] the workflow factory
//! sees.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use crate::errors::ToolError;
use crate::model::Model;
use crate::traits::{Dispatcher, Tool, ToolDatabase};
use crate::workflow::Value;

/// Options shared by every tool run.
#[derive(Clone, Default)]
pub struct CommonOptions {
    pub dispatcher: Option<Arc<dyn Dispatcher>>,
    pub database: Option<Arc<dyn ToolDatabase>>,
    /// Run directory for a new default database.
    pub path: Option<PathBuf>,
    /// Reuse an existing run directory at `path`.
    pub resume: bool,
    /// Free-form entries copied into the run metadata.
    pub extra: Map<String, JsonValue>,
}

impl std::fmt::Debug for CommonOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommonOptions")
            .field("dispatcher", &self.dispatcher.as_ref().map(|d| d.name()))
            .field("database", &self.database.as_ref().map(|db| db.path().to_path_buf()))
            .field("path", &self.path)
            .field("resume", &self.resume)
            .field("extra", &self.extra)
            .finish()
    }
}

impl CommonOptions {
    /// Entries recorded in the run metadata besides the dispatcher and the
    /// database: the extras plus `path` (when set) and `resume`.
    pub fn metadata_entries(&self) -> Map<String, JsonValue> {
        let mut entries = self.extra.clone();
        if let Some(path) = &self.path {
            entries.insert("path".to_string(), path.display().to_string().into());
        }
        entries.insert("resume".to_string(), self.resume.into());
        entries
    }
}

/// Arguments for one tool run.
///
/// ```rust
/// use pharmflow::model::Model;
/// use pharmflow::tools::ToolCall;
///
/// let call = ToolCall::new()
///     .arg(Model::new("run1", "$PROBLEM base"))
///     .kwarg("tool", "nonmem")
///     .resume(true);
/// assert_eq!(call.args().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ToolCall {
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
    common: CommonOptions,
}

impl ToolCall {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.push((name.into(), value.into()));
        self
    }

    pub fn dispatcher(mut self, dispatcher: Arc<dyn Dispatcher>) -> Self {
        self.common.dispatcher = Some(dispatcher);
        self
    }

    pub fn database(mut self, database: Arc<dyn ToolDatabase>) -> Self {
        self.common.database = Some(database);
        self
    }

    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.common.path = Some(path.into());
        self
    }

    pub fn resume(mut self, resume: bool) -> Self {
        self.common.resume = resume;
        self
    }

    /// Record an extra common option in the run metadata.
    pub fn common(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.common.extra.insert(key.into(), value.into());
        self
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn kwargs(&self) -> &[(String, Value)] {
        &self.kwargs
    }

    pub fn common_options(&self) -> &CommonOptions {
        &self.common
    }

    pub(crate) fn into_common(self) -> CommonOptions {
        self.common
    }
}

/// Tool arguments resolved against the tool's declared parameters, one
/// entry per parameter in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOptions {
    tool: String,
    values: Vec<(String, Value)>,
}

impl ToolOptions {
    /// Bind `call`'s arguments to `tool`'s parameters.
    ///
    /// Positional arguments bind by position and keyword arguments by name;
    /// parameters given neither take their default. A parameter without a
    /// default that is not given is an error.
    pub fn resolve(tool: &dyn Tool, call: &ToolCall) -> Result<Self, ToolError> {
        let name = tool.name();
        let params = tool.params();

        if call.args.len() > params.len() {
            return Err(ToolError::TooManyArguments {
                tool: name.to_string(),
                given: call.args.len(),
                declared: params.len(),
            });
        }

        for (i, (key, _)) in call.kwargs.iter().enumerate() {
            let Some(position) = params.iter().position(|p| p.name == key) else {
                return Err(ToolError::UnexpectedArgument {
                    tool: name.to_string(),
                    name: key.clone(),
                });
            };
            let repeated = call.kwargs[..i].iter().any(|(k, _)| k == key);
            if position < call.args.len() || repeated {
                return Err(ToolError::DuplicateArgument {
                    tool: name.to_string(),
                    name: key.clone(),
                });
            }
        }

        let values = params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                let value = call
                    .args
                    .get(i)
                    .or_else(|| call.kwargs.iter().find(|(k, _)| k == param.name).map(|(_, v)| v))
                    .or(param.default.as_ref())
                    .cloned()
                    .ok_or_else(|| ToolError::MissingParameter {
                        tool: name.to_string(),
                        param: param.name.to_string(),
                    })?;
                Ok((param.name.to_string(), value))
            })
            .collect::<Result<Vec<_>, ToolError>>()?;

        Ok(Self {
            tool: name.to_string(),
            values,
        })
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Like [`get`](Self::get), for parameters the tool declared.
    pub fn value(&self, name: &str) -> Result<&Value, ToolError> {
        self.get(name).ok_or_else(|| ToolError::MissingParameter {
            tool: self.tool.clone(),
            param: name.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Models given for `name`: none for unit, one for a model, or every
    /// element of a list of models.
    pub fn models(&self, name: &str) -> Result<Vec<Model>, ToolError> {
        match self.value(name)? {
            Value::Unit => Ok(Vec::new()),
            Value::Model(model) => Ok(vec![model.clone()]),
            Value::List(items) => items
                .iter()
                .map(|item| {
                    item.as_model().cloned().ok_or_else(|| self.invalid(name, "expected a list of models"))
                })
                .collect(),
            _ => Err(self.invalid(name, "expected a model or a list of models")),
        }
    }

    pub fn optional_int(&self, name: &str) -> Result<Option<i64>, ToolError> {
        match self.value(name)? {
            Value::Unit => Ok(None),
            Value::Int(i) => Ok(Some(*i)),
            _ => Err(self.invalid(name, "expected an integer")),
        }
    }

    pub fn optional_text(&self, name: &str) -> Result<Option<String>, ToolError> {
        match self.value(name)? {
            Value::Unit => Ok(None),
            Value::Text(s) => Ok(Some(s.clone())),
            _ => Err(self.invalid(name, "expected a string")),
        }
    }

    /// Every model passed to the tool, directly or inside a list, in
    /// parameter order.
    pub fn input_models(&self) -> Vec<&Model> {
        self.values.iter().flat_map(|(_, v)| v.models()).collect()
    }

    /// Options as recorded in run metadata.
    pub fn to_json(&self) -> Map<String, JsonValue> {
        self.values.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
    }

    fn invalid(&self, param: &str, reason: &str) -> ToolError {
        ToolError::InvalidOption {
            tool: self.tool.clone(),
            param: param.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ParamSpec;
    use crate::workflow::Workflow;

    struct Resmod {
        params: Vec<ParamSpec>,
    }

    impl Resmod {
        fn new() -> Self {
            Self {
                params: vec![
                    ParamSpec::required("model"),
                    ParamSpec::optional("groups", 4),
                    ParamSpec::optional("p_value", 0.05),
                ],
            }
        }
    }

    impl Tool for Resmod {
        fn name(&self) -> &str {
            "resmod"
        }

        fn params(&self) -> &[ParamSpec] {
            &self.params
        }

        fn create_workflow(&self, _options: &ToolOptions) -> Result<Workflow, ToolError> {
            Ok(Workflow::new())
        }
    }

    #[test]
    fn positional_keyword_and_default_values() {
        let call = ToolCall::new().arg(Model::new("run1", "$PK")).kwarg("p_value", 0.01);
        let options = ToolOptions::resolve(&Resmod::new(), &call).unwrap();

        let names: Vec<_> = options.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["model", "groups", "p_value"]);
        assert_eq!(options.get("groups"), Some(&Value::Int(4)));
        assert_eq!(options.get("p_value"), Some(&Value::Float(0.01)));

        let json = options.to_json();
        assert_eq!(json["model"], "<Model run1>");
        assert_eq!(json["groups"], 4);
    }

    #[test]
    fn required_parameter_must_be_given() {
        let call = ToolCall::new().kwarg("groups", 2);
        let err = ToolOptions::resolve(&Resmod::new(), &call).unwrap_err();
        assert_eq!(err.to_string(), "resmod: 'model' was not set");
    }

    #[test]
    fn required_parameter_by_keyword() {
        let call = ToolCall::new().kwarg("model", Model::new("run1", "$PK"));
        let options = ToolOptions::resolve(&Resmod::new(), &call).unwrap();
        assert_eq!(options.models("model").unwrap().len(), 1);
    }

    #[test]
    fn bad_calls_are_rejected() {
        let tool = Resmod::new();
        let too_many = ToolCall::new().arg(1).arg(2).arg(3).arg(4);
        assert!(matches!(
            ToolOptions::resolve(&tool, &too_many),
            Err(ToolError::TooManyArguments { given: 4, declared: 3, .. })
        ));

        let unknown = ToolCall::new().arg(1).kwarg("alpha", 1);
        assert!(matches!(
            ToolOptions::resolve(&tool, &unknown),
            Err(ToolError::UnexpectedArgument { .. })
        ));

        let twice = ToolCall::new().arg(1).kwarg("model", 2);
        assert!(matches!(
            ToolOptions::resolve(&tool, &twice),
            Err(ToolError::DuplicateArgument { .. })
        ));
    }

    #[test]
    fn metadata_entries_include_path_and_resume() {
        let call = ToolCall::new().path("/runs/resmod_dir1").resume(true).common("seed", 7);
        let entries = call.common_options().metadata_entries();
        assert_eq!(entries["path"], "/runs/resmod_dir1");
        assert_eq!(entries["resume"], true);
        assert_eq!(entries["seed"], 7);

        let entries = ToolCall::new().common_options().metadata_entries();
        assert!(!entries.contains_key("path"));
        assert_eq!(entries["resume"], false);
    }

    #[test]
    fn input_models_include_list_members() {
        let models = vec![Model::new("a", "1"), Model::new("b", "2")];
        let call = ToolCall::new().arg(models).kwarg("groups", Model::new("c", "3"));
        let options = ToolOptions::resolve(&Resmod::new(), &call).unwrap();

        let names: Vec<_> = options.input_models().iter().map(|m| m.name()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(options.optional_int("groups").is_err());
    }
}
