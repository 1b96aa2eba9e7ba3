// ABOUTME: The Tool trait - a named lookup an agent may call mid-task, described
// ABOUTME: to the model by a JSON schema and run asynchronously.

use async_trait::async_trait;

use super::ToolResult;
use crate::error::ToolError;

/// Something an agent can call while working on a task.
///
/// A failed lookup (unknown symbol, empty search) should come back as
/// `ToolResult::error` so the model can read it and adjust. `Err` is for
/// malformed arguments and faults the model cannot act on; the agent loop
/// still turns it into error text.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model calls the tool by. Unique within a `Registry`.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the argument object.
    fn schema(&self) -> serde_json::Value;

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error>;
}

/// Schema for a tool taking a single required string argument `field`.
pub fn single_string_schema(field: &str, description: &str) -> serde_json::Value {
    let mut properties = serde_json::Map::new();
    properties.insert(
        field.to_string(),
        serde_json::json!({ "type": "string", "description": description }),
    );
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": [field],
    })
}

/// Decode a tool's argument object into `T`.
pub fn parse_params<T: serde::de::DeserializeOwned>(
    params: serde_json::Value,
) -> Result<T, ToolError> {
    serde_json::from_value(params).map_err(|e| ToolError::InvalidParams(e.to_string()))
}
