// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::database::ToolDatabaseRef;
use crate::tools::ToolOptions;

/// Audit record written to the tool database at the start and end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Key name kept so existing run directories stay readable.
    #[serde(rename = "pharmpy_version")]
    pub version: String,
    pub tool_name: String,
    pub stats: RunStats,
    pub tool_options: Map<String, JsonValue>,
    pub common_options: CommonOptionsRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub start_time: DateTime<Local>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonOptionsRecord {
    pub dispatcher: String,
    pub database: ToolDatabaseRef,
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl ToolMetadata {
    /// Record for a run that started at `start_time`.
    pub fn start(
        tool_name: &str,
        start_time: DateTime<Local>,
        options: &ToolOptions,
        dispatcher: &str,
        database: ToolDatabaseRef,
        extra: Map<String, JsonValue>,
    ) -> Self {
        // Explicit entries win over extras with the same key.
        let extra = extra
            .into_iter()
            .filter(|(k, _)| k != "dispatcher" && k != "database")
            .collect();
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            tool_name: tool_name.to_string(),
            stats: RunStats {
                start_time,
                end_time: None,
            },
            tool_options: options.to_json(),
            common_options: CommonOptionsRecord {
                dispatcher: dispatcher.to_string(),
                database,
                extra,
            },
        }
    }

    pub fn finish(&mut self) {
        self.stats.end_time = Some(Local::now());
    }

    pub fn to_json(&self) -> Result<JsonValue, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{Modelfit, ToolCall};
    use std::path::PathBuf;

    fn database_ref() -> ToolDatabaseRef {
        ToolDatabaseRef {
            class: "LocalDirectoryToolDatabase".into(),
            toolname: "modelfit".into(),
            path: PathBuf::from("/runs/modelfit_dir1"),
        }
    }

    #[test]
    fn record_layout() {
        let options = ToolOptions::resolve(&Modelfit::new(), &ToolCall::new()).unwrap();
        let mut extra = Map::new();
        extra.insert("path".into(), "/runs".into());
        extra.insert("dispatcher".into(), "ignored".into());

        let started = Local::now();
        let mut metadata = ToolMetadata::start("modelfit", started, &options, "threaded", database_ref(), extra);
        let json = metadata.to_json().unwrap();
        assert_eq!(json["pharmpy_version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(json["tool_name"], "modelfit");
        assert!(json["stats"].get("end_time").is_none());
        assert_eq!(metadata.stats.start_time, started);
        assert_eq!(json["tool_options"]["models"], JsonValue::Null);
        assert_eq!(json["common_options"]["dispatcher"], "threaded");
        assert_eq!(json["common_options"]["database"]["class"], "LocalDirectoryToolDatabase");
        assert_eq!(json["common_options"]["path"], "/runs");

        metadata.finish();
        let read: ToolMetadata = serde_json::from_value(metadata.to_json().unwrap()).unwrap();
        let end = read.stats.end_time.unwrap();
        assert!(end >= read.stats.start_time);
        assert_eq!(read, metadata);
    }
}
