// ABOUTME: ToolResult - the text a tool hands back to the model, flagged when the
// ABOUTME: lookup failed, with optional metadata kept out of the conversation.

use std::collections::HashMap;

use serde::Serialize;

use crate::llm::ContentBlock;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolResult {
    /// Text the model will read.
    pub content: String,

    /// Set when `content` describes a failure rather than data.
    pub is_error: bool,

    /// Details for logs and callers; never sent to the model.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ToolResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: message.into(),
            is_error: true,
            ..Self::default()
        }
    }

    /// Structured tools (company info, statements) answer with compact JSON.
    pub fn json(value: &impl Serialize) -> Result<Self, serde_json::Error> {
        serde_json::to_string(value).map(Self::text)
    }

    /// Attach a metadata entry. Values that fail to serialize are dropped.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), value);
        }
        self
    }

    /// The tool_result block answering call `call_id`.
    pub fn into_block(self, call_id: &str) -> ContentBlock {
        if self.is_error {
            ContentBlock::tool_error(call_id, self.content)
        } else {
            ContentBlock::tool_result(call_id, self.content)
        }
    }
}
