// ABOUTME: Tests for LlmInvoker - prompts, the think-act loop, the tool cache
// ABOUTME: and iteration limits, driven by a scripted LLM client.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use super::*;
use crate::error::LlmError;
use crate::llm::{ContentBlock, LlmClient, Request, Response, Role, StopReason, Usage};
use crate::tool::{Registry, Tool, ToolResult, single_string_schema};

/// Replays canned responses and records every request.
#[derive(Default)]
struct ScriptedClient {
    responses: Mutex<VecDeque<Response>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedClient {
    fn new(responses: Vec<Response>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn create_message(&self, req: &Request) -> Result<Response, LlmError> {
        self.requests.lock().await.push(req.clone());
        self.responses
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| LlmError::Configuration("script exhausted".into()))
    }
}

fn tool_call(id: &str, name: &str, input: serde_json::Value) -> Response {
    Response {
        id: "resp".into(),
        content: vec![ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }],
        stop_reason: StopReason::ToolUse,
        model: "test".into(),
        usage: Usage {
            input_tokens: 10,
            output_tokens: 5,
        },
    }
}

/// Price tool that counts how often it really runs.
struct CountingPriceTool {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Tool for CountingPriceTool {
    fn name(&self) -> &str {
        "get_current_stock_price"
    }

    fn description(&self) -> &str {
        "Current price"
    }

    fn schema(&self) -> serde_json::Value {
        single_string_schema("symbol", "Stock symbol")
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match params["symbol"].as_str() {
            Some(_) => Ok(ToolResult::text("1523.40")),
            None => anyhow::bail!("symbol is required"),
        }
    }
}

async fn registry_with_counter() -> (Registry, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = Registry::new();
    registry
        .register(CountingPriceTool {
            calls: Arc::clone(&calls),
        })
        .await;
    (registry, calls)
}

fn analyst() -> AgentProfile {
    AgentProfile::new(
        "fin_expert",
        "Financial Expert",
        "Make investment recommendation",
        "You are an expert financial advisor",
    )
    .tools(["get_current_stock_price"])
}

#[test]
fn test_system_prompt() {
    let prompt = system_prompt(&analyst());
    assert_eq!(
        prompt,
        "You are Financial Expert. You are an expert financial advisor\n\
         Your personal goal is: Make investment recommendation"
    );
}

#[test]
fn test_task_prompt() {
    assert_eq!(task_prompt("Respond to hi", ""), "Respond to hi");

    let prompt = task_prompt("Respond to hi", "A greeting");
    assert!(prompt.starts_with("Respond to hi\n\n"));
    assert!(prompt.contains("expected criteria for your final answer: A greeting"));
}

#[tokio::test]
async fn test_plain_answer() {
    let client = ScriptedClient::new(vec![Response::from_text("Hello there")]);
    let invoker = LlmInvoker::with_client(Registry::new(), client.clone());
    let agent = AgentProfile::new("bot", "Responder", "Reply", "").model("groq/llama3-70b-8192");

    let answer = invoker.invoke(&agent, "Respond to hi", "").await.unwrap();
    assert_eq!(answer, "Hello there");

    let requests = client.requests.lock().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].model, "llama3-70b-8192");
    assert_eq!(
        requests[0].system.as_deref(),
        Some("You are Responder.\nYour personal goal is: Reply")
    );
    assert!(requests[0].tools.is_empty());
}

#[tokio::test]
async fn test_default_model_used() {
    let client = ScriptedClient::new(vec![Response::from_text("ok")]);
    let invoker =
        LlmInvoker::with_client(Registry::new(), client.clone()).default_model("gpt-4o");
    let agent = AgentProfile::new("bot", "r", "g", "b");

    invoker.invoke(&agent, "p", "").await.unwrap();
    assert_eq!(client.requests.lock().await[0].model, "gpt-4o");
}

#[tokio::test]
async fn test_tool_round_trip() {
    let (registry, calls) = registry_with_counter().await;
    let client = ScriptedClient::new(vec![
        tool_call("call_1", "get_current_stock_price", json!({"symbol": "TATASTEEL.NS"})),
        Response::from_text("Buy at 1523.40"),
    ]);
    let invoker = LlmInvoker::with_client(registry, client.clone());

    let outcome = invoker
        .run(&analyst(), "Analyse TATASTEEL.NS", "")
        .await
        .unwrap();

    assert_eq!(outcome.content, "Buy at 1523.40");
    assert_eq!(outcome.tool_use_count, 1);
    assert_eq!(outcome.iterations, 2);
    assert_eq!(outcome.usage.input_tokens, 10);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let requests = client.requests.lock().await;
    assert_eq!(requests[0].tools.len(), 1);
    let last = requests[1].messages.last().unwrap();
    assert_eq!(last.role, Role::User);
    assert_eq!(
        last.content[0],
        ContentBlock::tool_result("call_1", "1523.40")
    );
}

#[tokio::test]
async fn test_tool_failure_fed_back() {
    let (registry, _) = registry_with_counter().await;
    let client = ScriptedClient::new(vec![
        tool_call("call_1", "get_current_stock_price", json!({})),
        Response::from_text("Could not price it"),
    ]);
    let invoker = LlmInvoker::with_client(registry, client.clone());

    let answer = invoker.invoke(&analyst(), "Analyse", "").await.unwrap();
    assert_eq!(answer, "Could not price it");

    let requests = client.requests.lock().await;
    match &requests[1].messages.last().unwrap().content[0] {
        ContentBlock::ToolResult {
            content, is_error, ..
        } => {
            assert!(is_error);
            assert!(content.contains("symbol is required"));
        }
        other => panic!("expected tool result, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unlisted_tool_rejected() {
    let (registry, calls) = registry_with_counter().await;
    let client = ScriptedClient::new(vec![
        tool_call("call_1", "get_current_stock_price", json!({"symbol": "X"})),
        Response::from_text("done"),
    ]);
    let invoker = LlmInvoker::with_client(registry, client.clone());
    let agent = AgentProfile::new("writer", "Writer", "Write", "");

    invoker.invoke(&agent, "Write", "").await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let requests = client.requests.lock().await;
    match &requests[1].messages.last().unwrap().content[0] {
        ContentBlock::ToolResult { is_error, .. } => assert!(is_error),
        other => panic!("expected tool result, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cache_reuses_identical_calls() {
    let (registry, calls) = registry_with_counter().await;
    let client = ScriptedClient::new(vec![
        tool_call("call_1", "get_current_stock_price", json!({"symbol": "TATASTEEL.NS"})),
        tool_call("call_2", "get_current_stock_price", json!({"symbol": "TATASTEEL.NS"})),
        Response::from_text("done"),
    ]);
    let invoker = LlmInvoker::with_client(registry, client);

    let outcome = invoker.run(&analyst(), "Analyse", "").await.unwrap();
    assert_eq!(outcome.tool_use_count, 2);
    assert_eq!(outcome.cache_hits, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(invoker.cache().len().await, 1);
}

#[tokio::test]
async fn test_cache_capacity_bounds_shared_cache() {
    let (registry, calls) = registry_with_counter().await;
    let client = ScriptedClient::new(vec![
        tool_call("call_1", "get_current_stock_price", json!({"symbol": "TATASTEEL.NS"})),
        tool_call("call_2", "get_current_stock_price", json!({"symbol": "HDFCBANK.NS"})),
        tool_call("call_3", "get_current_stock_price", json!({"symbol": "TATASTEEL.NS"})),
        Response::from_text("done"),
    ]);
    let invoker = LlmInvoker::with_client(registry, client).cache_capacity(1);

    let outcome = invoker.run(&analyst(), "Analyse", "").await.unwrap();
    assert_eq!(outcome.cache_hits, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(invoker.cache().len().await, 1);
}

#[tokio::test]
async fn test_cache_disabled() {
    let (registry, calls) = registry_with_counter().await;
    let client = ScriptedClient::new(vec![
        tool_call("call_1", "get_current_stock_price", json!({"symbol": "TATASTEEL.NS"})),
        tool_call("call_2", "get_current_stock_price", json!({"symbol": "TATASTEEL.NS"})),
        Response::from_text("done"),
    ]);
    let invoker = LlmInvoker::with_client(registry, client);

    let outcome = invoker
        .run(&analyst().cache(false), "Analyse", "")
        .await
        .unwrap();
    assert_eq!(outcome.cache_hits, 0);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(invoker.cache().is_empty().await);
}

#[tokio::test]
async fn test_last_iteration_withholds_tools() {
    let (registry, _) = registry_with_counter().await;
    let client = ScriptedClient::new(vec![
        tool_call("call_1", "get_current_stock_price", json!({"symbol": "X"})),
        Response::from_text("final"),
    ]);
    let invoker = LlmInvoker::with_client(registry, client.clone());

    let outcome = invoker
        .run(&analyst().max_iterations(2), "Analyse", "")
        .await
        .unwrap();
    assert_eq!(outcome.content, "final");

    let requests = client.requests.lock().await;
    assert_eq!(requests[0].tools.len(), 1);
    assert!(requests[1].tools.is_empty());
}

#[tokio::test]
async fn test_iteration_limit() {
    let (registry, _) = registry_with_counter().await;
    let client = ScriptedClient::new(vec![tool_call(
        "call_1",
        "get_current_stock_price",
        json!({"symbol": "X"}),
    )]);
    let invoker = LlmInvoker::with_client(registry, client);

    let err = invoker
        .invoke(&analyst().max_iterations(1), "Analyse", "")
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LlmError>(),
        Some(LlmError::IterationLimit(1))
    ));
}

#[tokio::test]
async fn test_validate() {
    let (registry, _) = registry_with_counter().await;
    let invoker = LlmInvoker::with_client(registry, ScriptedClient::new(vec![]));

    assert!(invoker.validate(&analyst()).await.is_ok());

    let missing_tool = analyst().tools(["duckduckgo_search"]);
    assert!(invoker.validate(&missing_tool).await.is_err());

    let bad_model = analyst().model("acme/model-x");
    let err = invoker.validate(&bad_model).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LlmError>(),
        Some(LlmError::UnknownProvider(p)) if p == "acme"
    ));
}

#[tokio::test]
async fn test_validate_without_credentials() {
    let invoker = LlmInvoker::from_config(Registry::new(), &crate::config::CrewConfig::default());
    let agent = AgentProfile::new("bot", "r", "g", "b").model("groq/llama3-70b-8192");
    let err = invoker.validate(&agent).await.unwrap_err();
    assert!(err.to_string().contains("GROQ_API_KEY"));
}
