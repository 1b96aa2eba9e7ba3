// ABOUTME: OpenAI-compatible chat-completions client.
// ABOUTME: Serves OpenAI, Groq, OpenRouter and Ollama through a configurable base URL.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::LlmClient;
use super::{ContentBlock, Message, Request, Response, Role, StopReason, ToolDefinition, Usage};
use crate::error::LlmError;

/// Base URL for the OpenAI API.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Request body of `POST /chat/completions`.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ChatTool>,
}

/// Chat-completions message.
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ToolCallWire>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl ChatMessage {
    fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: None,
        }
    }
}

/// A tool call as the endpoint encodes it; arguments arrive as a JSON string.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ToolCallWire {
    id: String,
    #[serde(rename = "type")]
    call_type: String,
    function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FunctionCall {
    name: String,
    arguments: String,
}

/// Tool offered to the model.
#[derive(Debug, Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: FunctionSpec,
}

#[derive(Debug, Serialize)]
struct FunctionSpec {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

/// Chat-completions response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    model: String,
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCallWire>>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Body of a non-2xx reply, when the provider follows the OpenAI shape.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for any OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    api_key: Option<String>,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAIClient {
    /// Create a client for the OpenAI API.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: OPENAI_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Create a client for an endpoint that needs no key (e.g. local Ollama).
    pub fn without_key(base_url: impl Into<String>) -> Self {
        Self {
            api_key: None,
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Point the client at another OpenAI-compatible base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl From<&ToolDefinition> for ChatTool {
    fn from(tool: &ToolDefinition) -> Self {
        ChatTool {
            tool_type: "function".to_string(),
            function: FunctionSpec {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        }
    }
}

/// Each tool result turns into its own `tool` message keyed by call id, so one
/// user turn answering several calls expands to several messages.
fn convert_messages(messages: &[Message]) -> Vec<ChatMessage> {
    let mut result = Vec::new();

    for msg in messages {
        let mut text = String::new();
        let mut tool_calls = Vec::new();

        for block in &msg.content {
            match block {
                ContentBlock::Text { text: t } => text.push_str(t),
                ContentBlock::ToolUse { id, name, input } => tool_calls.push(ToolCallWire {
                    id: id.clone(),
                    call_type: "function".to_string(),
                    function: FunctionCall {
                        name: name.clone(),
                        arguments: input.to_string(),
                    },
                }),
                ContentBlock::ToolResult {
                    tool_use_id,
                    content,
                    ..
                } => result.push(ChatMessage {
                    role: "tool".to_string(),
                    content: Some(content.clone()),
                    tool_calls: None,
                    tool_call_id: Some(tool_use_id.clone()),
                }),
            }
        }

        if text.is_empty() && tool_calls.is_empty() {
            continue;
        }

        let role = match msg.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        result.push(ChatMessage {
            role: role.to_string(),
            content: (!text.is_empty()).then_some(text),
            tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
            tool_call_id: None,
        });
    }

    result
}

impl From<&Request> for ChatRequest {
    fn from(req: &Request) -> Self {
        let mut messages = Vec::new();
        if let Some(system) = &req.system {
            messages.push(ChatMessage::text("system", system.clone()));
        }
        messages.extend(convert_messages(&req.messages));

        ChatRequest {
            model: req.model.clone(),
            messages,
            max_tokens: req.max_tokens,
            temperature: req.temperature,
            tools: req.tools.iter().map(ChatTool::from).collect(),
        }
    }
}

fn parse_stop_reason(s: Option<&str>) -> StopReason {
    match s {
        Some("tool_calls") => StopReason::ToolUse,
        Some("length") => StopReason::MaxTokens,
        _ => StopReason::EndTurn,
    }
}

impl From<ChatResponse> for Response {
    fn from(resp: ChatResponse) -> Self {
        let mut content = Vec::new();
        let mut finish_reason = None;

        if let Some(choice) = resp.choices.into_iter().next() {
            finish_reason = choice.finish_reason;

            if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
                content.push(ContentBlock::Text { text });
            }

            for call in choice.message.tool_calls.unwrap_or_default() {
                let input = serde_json::from_str(&call.function.arguments).unwrap_or_default();
                content.push(ContentBlock::ToolUse {
                    id: call.id,
                    name: call.function.name,
                    input,
                });
            }
        }

        let usage = resp
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Response {
            id: resp.id,
            content,
            stop_reason: parse_stop_reason(finish_reason.as_deref()),
            model: resp.model,
            usage,
        }
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        let body = ChatRequest::from(req);

        let mut builder = self.http.post(self.completions_url()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        Ok(Response::from(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_puts_system_first() {
        let req = Request::new("gpt-4o-mini")
            .prompt("Hello")
            .system("You are Financial Expert.")
            .max_tokens(100);

        let body = ChatRequest::from(&req);
        assert_eq!(body.model, "gpt-4o-mini");
        assert_eq!(body.messages.len(), 2);
        assert_eq!(body.messages[0].role, "system");
        assert_eq!(body.messages[1].role, "user");
        assert_eq!(body.messages[1].content.as_deref(), Some("Hello"));
    }

    #[test]
    fn test_tool_round_trip_messages() {
        let req = Request::new("gpt-4o-mini").messages(vec![
            Message::user("Price of TATASTEEL.NS?"),
            Message {
                role: Role::Assistant,
                content: vec![ContentBlock::ToolUse {
                    id: "call_1".into(),
                    name: "get_current_stock_price".into(),
                    input: serde_json::json!({"symbol": "TATASTEEL.NS"}),
                }],
            },
            Message::tool_results(vec![ContentBlock::tool_result("call_1", "151.20")]),
        ]);

        let body = ChatRequest::from(&req);
        assert_eq!(body.messages.len(), 3);

        let assistant = &body.messages[1];
        assert_eq!(assistant.role, "assistant");
        assert!(assistant.content.is_none());
        let calls = assistant.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].function.name, "get_current_stock_price");
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&calls[0].function.arguments).unwrap()
                ["symbol"],
            "TATASTEEL.NS"
        );

        let tool = &body.messages[2];
        assert_eq!(tool.role, "tool");
        assert_eq!(tool.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool.content.as_deref(), Some("151.20"));
    }

    #[test]
    fn test_tool_definition_conversion() {
        let tool = ToolDefinition {
            name: "web_search".to_string(),
            description: "Search the web".to_string(),
            input_schema: serde_json::json!({"type": "object"}),
        };

        let converted = ChatTool::from(&tool);
        assert_eq!(converted.tool_type, "function");
        assert_eq!(converted.function.name, "web_search");
    }

    #[test]
    fn test_response_with_tool_calls() {
        let json = r#"{
            "id": "chatcmpl-1",
            "model": "llama3-70b-8192",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "web_search", "arguments": "{\"query\":\"AI\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(json).unwrap();
        let response = Response::from(parsed);

        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert!(response.has_tool_use());
        assert_eq!(response.usage.input_tokens, 12);
        match &response.content[0] {
            ContentBlock::ToolUse { name, input, .. } => {
                assert_eq!(name, "web_search");
                assert_eq!(input["query"], "AI");
            }
            other => panic!("Expected ToolUse, got {:?}", other),
        }
    }

    #[test]
    fn test_response_without_choices_is_empty() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"id":"x","model":"m","choices":[]}"#).unwrap();
        let response = Response::from(parsed);
        assert!(response.content.is_empty());
        assert_eq!(response.text(), "");
    }

    #[test]
    fn test_completions_url_trims_slash() {
        let client = OpenAIClient::without_key("http://localhost:11434/v1/");
        assert_eq!(
            client.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
    }
}
