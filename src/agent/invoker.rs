// ABOUTME: AgentInvoker - the seam between the pipeline executor and whatever
// ABOUTME: produces an agent's answer; LlmInvoker runs a think-act loop over tools.

use std::sync::Arc;

use async_trait::async_trait;

use super::cache::ToolCache;
use super::profile::AgentProfile;
use crate::config::{CrewConfig, DEFAULT_MODEL};
use crate::error::LlmError;
use crate::llm::{
    ContentBlock, LlmClient, Message, ModelId, ProviderClients, Request, ToolCall, Usage,
};
use crate::tool::{Registry, Tool, to_definitions};

const MAX_TOKENS: u32 = 4096;

/// Produces an agent's answer to a prompt.
///
/// Implementations must be usable from concurrent runs.
#[async_trait]
pub trait AgentInvoker: Send + Sync {
    /// Check that `agent` can be invoked (model resolvable, tools present).
    /// Called for every referenced agent before any node runs.
    async fn validate(&self, agent: &AgentProfile) -> Result<(), anyhow::Error> {
        let _ = agent;
        Ok(())
    }

    /// Run `agent` on `prompt` and return its final answer.
    async fn invoke(
        &self,
        agent: &AgentProfile,
        prompt: &str,
        expected_output: &str,
    ) -> Result<String, anyhow::Error>;
}

/// Resolves a model identifier to the client that serves it.
pub type ClientFactory =
    Arc<dyn Fn(&ModelId) -> Result<Arc<dyn LlmClient>, LlmError> + Send + Sync>;

/// Outcome of one agent invocation.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    /// Final text from the agent.
    pub content: String,

    /// Tool calls the model requested.
    pub tool_use_count: usize,

    /// Calls answered from the cache.
    pub cache_hits: usize,

    /// Total token usage across all LLM calls.
    pub usage: Usage,

    /// Iterations of the think-act loop.
    pub iterations: usize,
}

/// Invoker that drives a language model through a think-act loop.
///
/// Each iteration sends the conversation to the model; tool calls are
/// executed and fed back until the model answers without calling a tool.
/// On the last permitted iteration the tools are withheld so the model has
/// to answer.
pub struct LlmInvoker {
    tools: Registry,
    clients: ClientFactory,
    default_model: String,
    cache: ToolCache,
}

impl LlmInvoker {
    /// Create an invoker that resolves clients with `clients`.
    pub fn new(tools: Registry, clients: ClientFactory) -> Self {
        Self {
            tools,
            clients,
            default_model: DEFAULT_MODEL.to_string(),
            cache: ToolCache::new(),
        }
    }

    /// Create an invoker that sends every model to one client.
    pub fn with_client(tools: Registry, client: Arc<dyn LlmClient>) -> Self {
        Self::new(
            tools,
            Arc::new(move |_: &ModelId| -> Result<Arc<dyn LlmClient>, LlmError> {
                Ok(Arc::clone(&client))
            }),
        )
    }

    /// Create an invoker backed by the provider clients `config` describes.
    pub fn from_config(tools: Registry, config: &CrewConfig) -> Self {
        let providers = ProviderClients::from_config(config);
        Self::new(tools, Arc::new(move |id: &ModelId| providers.client_for(id)))
            .default_model(config.default_model.clone())
    }

    /// Model used by agents that do not name one.
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Bound the shared tool cache to `capacity` results.
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = ToolCache::with_capacity(capacity);
        self
    }

    /// The shared tool result cache.
    pub fn cache(&self) -> &ToolCache {
        &self.cache
    }

    fn model_id(&self, agent: &AgentProfile) -> Result<ModelId, LlmError> {
        agent
            .model
            .as_deref()
            .unwrap_or(&self.default_model)
            .parse()
    }

    /// Run `agent` on a prompt and report the full outcome.
    pub async fn run(
        &self,
        agent: &AgentProfile,
        prompt: &str,
        expected_output: &str,
    ) -> Result<AgentOutcome, anyhow::Error> {
        let model = self.model_id(agent)?;
        let client = (self.clients)(&model)?;
        let tools = self.tools.resolve(&agent.tools).await?;
        let definitions = to_definitions(&tools);
        let system = system_prompt(agent);

        let mut messages = vec![Message::user(task_prompt(prompt, expected_output))];
        let mut usage = Usage::default();
        let mut tool_use_count = 0;
        let mut cache_hits = 0;
        let mut iterations = 0;

        loop {
            iterations += 1;
            let last_chance = agent.max_iterations.is_some_and(|max| iterations >= max);

            let mut request = Request::new(&model.model)
                .system(&system)
                .messages(messages.clone())
                .max_tokens(MAX_TOKENS);
            if !last_chance {
                request = request.tools(definitions.clone());
            }

            tracing::debug!(agent = %agent.id, %model, iterations, "requesting completion");
            let response = client.create_message(&request).await?;
            usage.add(response.usage);

            if !response.has_tool_use() {
                tracing::debug!(
                    agent = %agent.id,
                    iterations,
                    tool_use_count,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "agent finished"
                );
                return Ok(AgentOutcome {
                    content: response.text(),
                    tool_use_count,
                    cache_hits,
                    usage,
                    iterations,
                });
            }

            if last_chance {
                return Err(LlmError::IterationLimit(iterations).into());
            }

            messages.push(Message::assistant_turn(response.content.clone()));

            let mut results = Vec::new();
            for call in response.tool_calls() {
                tool_use_count += 1;
                let (result, hit) = self.call_tool(agent, &tools, call).await;
                cache_hits += usize::from(hit);
                results.push(result);
            }
            messages.push(Message::tool_results(results));
        }
    }

    async fn call_tool(
        &self,
        agent: &AgentProfile,
        tools: &[Arc<dyn Tool>],
        call: ToolCall<'_>,
    ) -> (ContentBlock, bool) {
        let ToolCall { id, name, input } = call;
        let Some(tool) = tools.iter().find(|t| t.name() == name) else {
            tracing::warn!(agent = %agent.id, tool = %name, "model requested an unavailable tool");
            return (
                ContentBlock::tool_error(id, format!("Tool '{}' not found or not allowed", name)),
                false,
            );
        };

        if agent.cache
            && let Some(cached) = self.cache.get(name, input).await
        {
            tracing::debug!(agent = %agent.id, tool = %name, "tool cache hit");
            return (cached.into_block(id), true);
        }

        tracing::debug!(agent = %agent.id, tool = %name, "executing tool");
        let block = match tool.execute(input.clone()).await {
            Ok(result) => {
                if agent.cache {
                    self.cache.insert(name, input, &result).await;
                }
                result.into_block(id)
            }
            Err(e) => {
                tracing::warn!(agent = %agent.id, tool = %name, error = %e, "tool failed");
                ContentBlock::tool_error(id, e.to_string())
            }
        };
        (block, false)
    }
}

#[async_trait]
impl AgentInvoker for LlmInvoker {
    async fn validate(&self, agent: &AgentProfile) -> Result<(), anyhow::Error> {
        let model = self.model_id(agent)?;
        (self.clients)(&model)?;
        self.tools.resolve(&agent.tools).await?;
        Ok(())
    }

    async fn invoke(
        &self,
        agent: &AgentProfile,
        prompt: &str,
        expected_output: &str,
    ) -> Result<String, anyhow::Error> {
        Ok(self.run(agent, prompt, expected_output).await?.content)
    }
}

/// System prompt built from an agent's persona.
pub fn system_prompt(agent: &AgentProfile) -> String {
    let mut out = format!("You are {}.", agent.role);
    if !agent.backstory.is_empty() {
        out.push(' ');
        out.push_str(&agent.backstory);
    }
    out.push_str("\nYour personal goal is: ");
    out.push_str(&agent.goal);
    out
}

/// User prompt for one task, with the expected output appended when present.
pub fn task_prompt(prompt: &str, expected_output: &str) -> String {
    if expected_output.is_empty() {
        return prompt.to_string();
    }
    format!(
        "{}\n\nThis is the expected criteria for your final answer: {}\n\
         You MUST return the actual complete content as the final answer, not a summary.",
        prompt, expected_output
    )
}
