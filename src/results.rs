// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tool results envelope.
//!
//! Every tool returns a [`Results`]: a tagged, JSON-serializable record that
//! may point back at the tool database it was written to. Tools with a fixed
//! result shape implement [`ToolResults`] on their own struct and convert at
//! the edges.

use crate::database::ToolDatabaseRef;
use crate::errors::ResultsError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::fs;
use std::path::Path;

/// Key under which the producing tool's name is recorded.
pub const TOOL_TAG: &str = "__tool__";

/// A tool-specific results struct.
pub trait ToolResults: Serialize + DeserializeOwned {
    const TOOL_NAME: &'static str;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Results {
    #[serde(rename = "__tool__")]
    tool_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_database: Option<ToolDatabaseRef>,
    #[serde(flatten)]
    fields: Map<String, JsonValue>,
}

impl Results {
    pub fn new(tool_name: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_database: None,
            fields: Map::new(),
        }
    }

    pub fn from_typed<T: ToolResults>(typed: &T) -> Result<Self, ResultsError> {
        match serde_json::to_value(typed)? {
            JsonValue::Object(fields) => Ok(Self {
                tool_name: T::TOOL_NAME.to_string(),
                tool_database: None,
                fields,
            }),
            _ => Err(ResultsError::NotAnObject),
        }
    }

    pub fn to_typed<T: ToolResults>(&self) -> Result<T, ResultsError> {
        if self.tool_name != T::TOOL_NAME {
            return Err(ResultsError::ToolMismatch {
                expected: T::TOOL_NAME.to_string(),
                found: self.tool_name.clone(),
            });
        }
        Ok(serde_json::from_value(JsonValue::Object(self.fields.clone()))?)
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn field(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, JsonValue> {
        &self.fields
    }

    pub fn tool_database(&self) -> Option<&ToolDatabaseRef> {
        self.tool_database.as_ref()
    }

    pub fn set_tool_database(&mut self, reference: ToolDatabaseRef) {
        self.tool_database = Some(reference);
    }

    pub fn to_json(&self) -> Result<String, ResultsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ResultsError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Read a results file written by a tool run.
///
/// `path` may be the file itself or a tool database directory holding
/// `results.json`.
pub fn read_results(path: impl AsRef<Path>) -> Result<Results, ResultsError> {
    let path = path.as_ref();
    let file = if path.is_dir() {
        path.join(crate::database::RESULTS_FILE)
    } else {
        path.to_path_buf()
    };
    let text = fs::read_to_string(&file).map_err(|source| ResultsError::Io {
        path: file.clone(),
        source,
    })?;
    Results::from_json(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct ScmResults {
        steps: Vec<String>,
        final_model_name: String,
    }

    impl ToolResults for ScmResults {
        const TOOL_NAME: &'static str = "scm";
    }

    #[test]
    fn envelope_tags_the_tool() {
        let typed = ScmResults {
            steps: vec!["forward".into()],
            final_model_name: "run3".into(),
        };
        let res = Results::from_typed(&typed).unwrap();
        let json: JsonValue = serde_json::from_str(&res.to_json().unwrap()).unwrap();

        assert_eq!(json[TOOL_TAG], "scm");
        assert_eq!(json["final_model_name"], "run3");
        assert!(json.get("tool_database").is_none());
        assert_eq!(res.to_typed::<ScmResults>().unwrap(), typed);
    }

    #[test]
    fn typed_conversion_checks_the_tag() {
        let res = Results::new("modelfit").with_field("steps", JsonValue::Array(vec![]));
        let err = res.to_typed::<ScmResults>().unwrap_err();
        assert!(matches!(err, ResultsError::ToolMismatch { .. }));
    }

    #[test]
    fn database_reference_survives_a_file_round() {
        let dir = tempfile::tempdir().unwrap();
        let mut res = Results::new("resmod").with_field("best", 3);
        res.set_tool_database(ToolDatabaseRef {
            class: "LocalDirectoryToolDatabase".into(),
            toolname: "resmod".into(),
            path: PathBuf::from("/tmp/resmod_dir1"),
        });
        fs::write(dir.path().join("results.json"), res.to_json().unwrap()).unwrap();

        let read = read_results(dir.path()).unwrap();
        assert_eq!(read, res);
        assert_eq!(read.tool_database().unwrap().toolname, "resmod");
    }
}
