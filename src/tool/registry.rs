// ABOUTME: The tool Registry - named tools filled in at startup and looked up
// ABOUTME: when an agent is prepared. Clones share one table.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::Tool;
use crate::error::ToolError;
use crate::llm::ToolDefinition;

type ToolTable = HashMap<String, Arc<dyn Tool>>;

/// Tools known to this process, keyed by `Tool::name`.
#[derive(Clone, Default)]
pub struct Registry {
    tools: Arc<RwLock<ToolTable>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool. A later tool with the same name wins.
    pub async fn register<T: Tool + 'static>(&self, tool: T) {
        self.register_arc(Arc::new(tool)).await;
    }

    pub async fn register_arc(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.write().await.insert(name.clone(), tool).is_some() {
            tracing::debug!(tool = %name, "replaced registered tool");
        }
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().await.get(name).cloned()
    }

    pub async fn contains(&self, name: &str) -> bool {
        self.tools.read().await.contains_key(name)
    }

    /// Registered names in alphabetical order.
    pub async fn list(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tools.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn count(&self) -> usize {
        self.tools.read().await.len()
    }

    /// Look up an agent's tool list. The result keeps the agent's order;
    /// the first unregistered name is reported as `ToolError::NotFound`.
    pub async fn resolve<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<Arc<dyn Tool>>, ToolError> {
        let table = self.tools.read().await;
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            match table.get(name) {
                Some(tool) => resolved.push(Arc::clone(tool)),
                None => return Err(ToolError::NotFound(name.to_string())),
            }
        }
        Ok(resolved)
    }
}

/// Advertise resolved tools to the model.
pub fn to_definitions(tools: &[Arc<dyn Tool>]) -> Vec<ToolDefinition> {
    tools
        .iter()
        .map(|tool| ToolDefinition {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input_schema: tool.schema(),
        })
        .collect()
}
