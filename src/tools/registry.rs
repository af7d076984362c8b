//! Tool registry keyed by tool name.

use crate::error::{Result, ToolError};
use crate::protocol::{CallToolParams, CallToolResult, Tool};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn definition(&self) -> Tool;
    async fn execute(&self, arguments: Value) -> Result<CallToolResult>;
}

/// A tool together with the definition it advertised at registration.
struct Entry {
    definition: Tool,
    handler: Arc<dyn ToolHandler>,
}

#[derive(Default)]
pub struct ToolRegistry {
    entries: DashMap<String, Entry>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `tool` under its definition's name, replacing any previous tool
    /// with that name.
    pub fn register<T: ToolHandler + 'static>(&self, tool: T) {
        let definition = tool.definition();
        debug!("Registering tool: {}", definition.name);
        self.entries.insert(
            definition.name.clone(),
            Entry {
                definition,
                handler: Arc::new(tool),
            },
        );
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Tool definitions sorted by name.
    pub fn list(&self) -> Vec<Tool> {
        let mut tools: Vec<Tool> = self
            .entries
            .iter()
            .map(|entry| entry.definition.clone())
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn names(&self) -> Vec<String> {
        self.list().into_iter().map(|t| t.name).collect()
    }

    pub async fn execute(&self, params: CallToolParams) -> Result<CallToolResult> {
        // clone the handler out so no map guard is held across the await
        let handler = self
            .entries
            .get(&params.name)
            .map(|entry| Arc::clone(&entry.handler))
            .ok_or_else(|| ToolError::NotFound(params.name.clone()))?;

        let started = Instant::now();
        let result = handler.execute(params.arguments).await;
        debug!("Tool {} finished in {:?}", params.name, started.elapsed());
        result
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Arguments default to an empty object when the client omits them.
pub fn parse_arguments<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|e| ToolError::InvalidArguments(e.to_string()).into())
}
