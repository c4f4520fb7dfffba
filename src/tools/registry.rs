// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::errors::ToolError;
use crate::tools::Modelfit;
use crate::traits::Tool;

static GLOBAL: LazyLock<RwLock<ToolRegistry>> = LazyLock::new(|| RwLock::new(ToolRegistry::with_builtins()));

/// Tools by name.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the tools shipped with the crate.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Modelfit::new()));
        registry
    }

    /// Add `tool`, replacing any tool already registered under its name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.tools.get(name).cloned().ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry").field("tools", &self.names()).finish()
    }
}

/// Make `tool` available to [`run_tool`](crate::tools::run_tool).
pub fn register_tool(tool: Arc<dyn Tool>) {
    GLOBAL.write().unwrap_or_else(PoisonError::into_inner).register(tool);
}

/// Look a tool up in the process-wide registry.
pub fn lookup_tool(name: &str) -> Result<Arc<dyn Tool>, ToolError> {
    GLOBAL.read().unwrap_or_else(PoisonError::into_inner).get(name)
}
